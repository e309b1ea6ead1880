use std::sync::Arc;
use puv_catalog::TripCatalog;
use puv_core::location::LocationProvider;
use puv_core::session::AuthProvider;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<TripCatalog>,
    pub auth_provider: Arc<dyn AuthProvider>,
    pub location: Arc<dyn LocationProvider>,
    pub auth: AuthConfig,
}
