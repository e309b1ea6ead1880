use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use puv_catalog::{Place, PlaceQuery};
use serde::Deserialize;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct PlaceParams {
    pub q: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/places", get(search_places))
}

async fn search_places(
    State(state): State<AppState>,
    Query(params): Query<PlaceParams>,
) -> Result<Json<Vec<Place>>, AppError> {
    let query = PlaceQuery::parse(params.q.as_deref(), state.catalog.settings())?;
    Ok(Json(state.catalog.query_places(&query)))
}
