use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use puv_core::location::{resolve_region, Region};
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegionParams {
    /// Viewport width divided by height.
    pub aspect_ratio: Option<f64>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/map/region", get(get_region))
}

async fn get_region(
    State(state): State<AppState>,
    Query(params): Query<RegionParams>,
) -> Json<Region> {
    let region = resolve_region(state.location.as_ref()).await;
    Json(match params.aspect_ratio {
        Some(ratio) => region.with_aspect_ratio(ratio),
        None => region,
    })
}
