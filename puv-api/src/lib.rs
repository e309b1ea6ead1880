use axum::{
    http::Method,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod error;
pub mod map;
pub mod membership;
pub mod middleware;
pub mod places;
pub mod profile;
pub mod state;
pub mod trips;
pub mod vehicles;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    Router::new()
        .merge(vehicles::routes())
        .merge(trips::routes(state.clone()))
        .merge(auth::routes(state.clone()))
        .merge(profile::routes(state.clone()))
        .merge(membership::routes())
        .merge(map::routes())
        .merge(places::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
