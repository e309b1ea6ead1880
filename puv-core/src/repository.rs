use async_trait::async_trait;
use puv_catalog::{CatalogSettings, Place, Trip, TripCatalog, Vehicle};
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Raw vehicle, trip and destination collections as delivered by a data source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub trips: Vec<Trip>,
    #[serde(default)]
    pub places: Vec<Place>,
}

/// Data source trait for the initial catalog contents
#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn name(&self) -> &str;

    async fn load(&self) -> Result<CatalogSeed, Box<dyn std::error::Error + Send + Sync>>;
}

/// Load a source once and build the session's catalog from it.
pub async fn build_catalog(
    source: &dyn CatalogSource,
    settings: CatalogSettings,
) -> CoreResult<TripCatalog> {
    let seed = source
        .load()
        .await
        .map_err(|e| CoreError::SourceError(format!("{}: {}", source.name(), e)))?;

    tracing::info!(
        "Loaded catalog seed from {} ({} vehicles, {} trips, {} places)",
        source.name(),
        seed.vehicles.len(),
        seed.trips.len(),
        seed.places.len()
    );

    Ok(TripCatalog::with_settings(seed.vehicles, seed.trips, settings)?.with_places(seed.places)?)
}
