pub mod app_config;
pub mod auth_store;
pub mod catalog_source;

pub use auth_store::InMemoryAuthProvider;
pub use catalog_source::{FileCatalogSource, StaticCatalogSource};
