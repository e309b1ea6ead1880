use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Extension, Json, Router,
};
use puv_core::session::User;
use puv_core::validation::{ForgotPasswordForm, SignInForm, SignUpForm};
use serde::Serialize;

use crate::{
    error::AppError,
    middleware::{customer_auth_middleware, issue_token, CustomerClaims},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_in: u64,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/v1/auth/signout", post(sign_out))
        .route_layer(axum::middleware::from_fn_with_state(state, customer_auth_middleware));

    Router::new()
        .route("/v1/auth/signin", post(sign_in))
        .route("/v1/auth/signup", post(sign_up))
        .route("/v1/auth/forgot-password", post(forgot_password))
        .merge(protected)
}

async fn sign_in(
    State(state): State<AppState>,
    Json(form): Json<SignInForm>,
) -> Result<Json<AuthResponse>, AppError> {
    let session = state.auth_provider.sign_in(&form).await?;

    let token = issue_token(&state.auth, &session)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(AuthResponse {
        token,
        expires_in: state.auth.expiration,
        user: session.user,
    }))
}

async fn sign_up(
    State(state): State<AppState>,
    Json(form): Json<SignUpForm>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state.auth_provider.sign_up(&form).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn forgot_password(
    State(state): State<AppState>,
    Json(form): Json<ForgotPasswordForm>,
) -> Result<Json<MessageResponse>, AppError> {
    state.auth_provider.request_password_reset(&form).await?;
    Ok(Json(MessageResponse {
        message: "Please check your email to reset your password and get back on the road.",
    }))
}

async fn sign_out(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
) -> Result<StatusCode, AppError> {
    state.auth_provider.sign_out(claims.sid).await?;
    tracing::info!("User {} signed out", claims.sub);
    Ok(StatusCode::NO_CONTENT)
}
