pub mod location;
pub mod repository;
pub mod session;
pub mod validation;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validation::ValidationErrors),
    #[error("Catalog error: {0}")]
    CatalogError(#[from] puv_catalog::CatalogError),
    #[error("Data source failed: {0}")]
    SourceError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
