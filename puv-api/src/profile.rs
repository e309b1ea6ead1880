use axum::{
    extract::State,
    routing::get,
    Extension, Json, Router,
};
use puv_core::session::User;
use puv_core::validation::ProfileForm;

use crate::{
    error::AppError,
    middleware::{customer_auth_middleware, CustomerClaims},
    state::AppState,
};

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/profile", get(get_profile).put(update_profile))
        .route_layer(axum::middleware::from_fn_with_state(state, customer_auth_middleware))
}

async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.auth_provider.user(claims.sub).await?))
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Json(form): Json<ProfileForm>,
) -> Result<Json<User>, AppError> {
    let user = state.auth_provider.update_profile(claims.sub, &form).await?;
    Ok(Json(user))
}
