use axum::{
    extract::Path,
    routing::get,
    Json, Router,
};
use puv_catalog::membership::PlanSummary;
use puv_catalog::MembershipPlan;

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/memberships", get(list_plans))
        .route("/v1/memberships/{plan}", get(get_plan))
}

async fn list_plans() -> Json<Vec<PlanSummary>> {
    Json(MembershipPlan::ALL.iter().map(MembershipPlan::summary).collect())
}

async fn get_plan(Path(plan): Path<String>) -> Result<Json<PlanSummary>, AppError> {
    let plan: MembershipPlan = plan.parse().map_err(AppError::NotFound)?;
    Ok(Json(plan.summary()))
}
