use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    http::{header, StatusCode},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use puv_core::session::AuthSession;
use puv_core::validation::UserType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::{AppState, AuthConfig};

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CustomerClaims {
    pub sub: Uuid,
    /// Provider session backing this token; revoked on sign-out.
    pub sid: Uuid,
    pub email: String,
    pub role: String,
    pub exp: usize,
}

pub fn role_for(user_type: UserType) -> &'static str {
    match user_type {
        UserType::Passenger => "PASSENGER",
        UserType::Driver => "DRIVER",
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token lifetime out of range: {0}s")]
    Expiration(u64),

    #[error("Token encoding failed: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
}

pub fn issue_token(config: &AuthConfig, session: &AuthSession) -> Result<String, TokenError> {
    let expires_at = i64::try_from(config.expiration)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        .ok_or(TokenError::Expiration(config.expiration))?;

    let claims = CustomerClaims {
        sub: session.user.id,
        sid: session.session_id,
        email: session.user.email.expose().clone(),
        role: role_for(session.user.user_type).to_owned(),
        exp: expires_at.timestamp() as usize,
    };

    Ok(encode(&Header::default(), &claims, &EncodingKey::from_secret(config.secret.as_bytes()))?)
}

// ============================================================================
// Customer Authentication Middleware
// ============================================================================

pub async fn customer_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Extract token from Authorization header
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Decode and validate JWT
    let token_data = decode::<CustomerClaims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;

    // 3. Check role
    if !matches!(token_data.claims.role.as_str(), "PASSENGER" | "DRIVER") {
        return Err(StatusCode::FORBIDDEN);
    }

    // 4. Reject tokens whose session was signed out
    if !state.auth_provider.is_session_active(token_data.claims.sid).await {
        tracing::debug!("Rejected token for closed session {}", token_data.claims.sid);
        return Err(StatusCode::UNAUTHORIZED);
    }

    // 5. Inject claims into request extensions
    req.extensions_mut().insert(token_data.claims);

    Ok(next.run(req).await)
}
