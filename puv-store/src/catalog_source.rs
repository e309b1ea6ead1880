use async_trait::async_trait;
use puv_core::repository::{CatalogSeed, CatalogSource};
use std::path::PathBuf;

const BUNDLED_CATALOG: &str = include_str!("../data/catalog.json");

/// The data set shipped with the binary.
pub struct StaticCatalogSource;

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    fn name(&self) -> &str {
        "bundled"
    }

    async fn load(&self) -> Result<CatalogSeed, Box<dyn std::error::Error + Send + Sync>> {
        Ok(serde_json::from_str(BUNDLED_CATALOG)?)
    }
}

/// A JSON seed file on disk, read once at startup.
pub struct FileCatalogSource {
    path: PathBuf,
    name: String,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<CatalogSeed, Box<dyn std::error::Error + Send + Sync>> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}
