use puv_catalog::{CatalogSettings, Category, Coordinates};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub location: LocationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_bcrypt_cost() -> u32 { bcrypt::DEFAULT_COST }

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CatalogConfig {
    /// JSON seed file; the bundled data set is used when absent.
    pub data_path: Option<String>,
    pub max_query_length: Option<usize>,
    pub nearby_radius_m: Option<f64>,
    pub categories: Option<Vec<Category>>,
}

impl CatalogConfig {
    pub fn settings(&self) -> CatalogSettings {
        let defaults = CatalogSettings::default();
        CatalogSettings {
            categories: self.categories.clone().unwrap_or(defaults.categories),
            max_query_length: self.max_query_length.unwrap_or(defaults.max_query_length),
            nearby_radius_m: self.nearby_radius_m.unwrap_or(defaults.nearby_radius_m),
        }
    }
}

/// Device position used when the client does not send one.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationConfig {
    pub fn position(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
            _ => None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `PUV__SERVER__PORT=9000` sets `server.port`
            .add_source(config::Environment::with_prefix("PUV").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
