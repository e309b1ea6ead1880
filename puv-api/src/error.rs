use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use puv_catalog::CatalogError;
use puv_core::session::AuthError;
use puv_core::validation::ValidationErrors;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

fn internal(msg: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Internal Server Error: {}", msg);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
}

fn validation_response(errors: &ValidationErrors) -> Response {
    let body = Json(json!({
        "error": errors.to_string(),
        "fields": errors.errors,
    }));
    (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(errors) | AppError::Auth(AuthError::Validation(errors)) => {
                return validation_response(&errors);
            }
            AppError::Catalog(err) => match err {
                CatalogError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                CatalogError::SoldOut(_) => (StatusCode::CONFLICT, err.to_string()),
                CatalogError::InvalidInput(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                CatalogError::InvalidData(_) => internal(err),
            },
            AppError::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::SessionNotFound => {
                    (StatusCode::UNAUTHORIZED, err.to_string())
                }
                AuthError::EmailTaken => (StatusCode::CONFLICT, err.to_string()),
                AuthError::AccountNotFound | AuthError::UserNotFound(_) => {
                    (StatusCode::NOT_FOUND, err.to_string())
                }
                AuthError::Validation(_) | AuthError::Internal(_) => internal(err),
            },
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => internal(msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
