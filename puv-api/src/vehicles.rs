use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use puv_catalog::{CatalogError, Coordinates, NearbyVehicle, Vehicle, VehicleQuery};
use serde::Deserialize;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct VehicleListParams {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub vehicle_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    pub lat: f64,
    pub lng: f64,
    pub radius_m: Option<f64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/vehicles", get(list_vehicles))
        .route("/v1/vehicles/nearby", get(nearby_vehicles))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Query(params): Query<VehicleListParams>,
) -> Result<Json<Vec<Vehicle>>, AppError> {
    let query = VehicleQuery::parse(
        params.q.as_deref(),
        params.vehicle_type.as_deref(),
        state.catalog.settings(),
    )?;
    Ok(Json(state.catalog.query_vehicles(&query)))
}

async fn nearby_vehicles(
    State(state): State<AppState>,
    Query(params): Query<NearbyParams>,
) -> Result<Json<Vec<NearbyVehicle>>, AppError> {
    let center = Coordinates::new(params.lat, params.lng);
    if !center.is_valid() {
        return Err(CatalogError::InvalidInput(format!(
            "coordinates out of range: ({}, {})",
            params.lat, params.lng
        ))
        .into());
    }

    let radius_m = params
        .radius_m
        .unwrap_or(state.catalog.settings().nearby_radius_m);
    if !radius_m.is_finite() || radius_m <= 0.0 {
        return Err(CatalogError::InvalidInput(format!("radius must be positive: {}", radius_m)).into());
    }

    Ok(Json(state.catalog.nearby_vehicles(center, radius_m)))
}
