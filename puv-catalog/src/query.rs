use serde::{Deserialize, Serialize};

use crate::catalog::CatalogError;
use crate::models::{Category, VehicleType, ALL_CATEGORY};

/// Owner-configurable knobs for a catalog instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,
    #[serde(default = "default_nearby_radius_m")]
    pub nearby_radius_m: f64,
}

fn default_categories() -> Vec<Category> {
    Category::defaults()
}

fn default_max_query_length() -> usize {
    64
}

fn default_nearby_radius_m() -> f64 {
    500.0
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            max_query_length: default_max_query_length(),
            nearby_radius_m: default_nearby_radius_m(),
        }
    }
}

impl CatalogSettings {
    pub fn knows_category(&self, id: &str) -> bool {
        id.eq_ignore_ascii_case(ALL_CATEGORY)
            || self.categories.iter().any(|c| c.id.eq_ignore_ascii_case(id))
    }
}

/// Validated arguments for `TripCatalog::filter_trips`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripQuery {
    pub category: Option<String>,
    pub search_text: Option<String>,
}

impl TripQuery {
    /// Boundary check for raw user input.
    pub fn parse(
        category: Option<&str>,
        search_text: Option<&str>,
        settings: &CatalogSettings,
    ) -> Result<Self, CatalogError> {
        let category = match category.map(str::trim).filter(|c| !c.is_empty()) {
            Some(id) if !settings.knows_category(id) => {
                return Err(CatalogError::InvalidInput(format!("unknown category: {}", id)));
            }
            Some(id) => Some(id.to_string()),
            None => None,
        };

        Ok(Self {
            category,
            search_text: check_search_text(search_text, settings)?,
        })
    }
}

/// Validated arguments for the vehicle list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleQuery {
    pub search_text: Option<String>,
    pub vehicle_type: Option<VehicleType>,
}

impl VehicleQuery {
    pub fn parse(
        search_text: Option<&str>,
        vehicle_type: Option<&str>,
        settings: &CatalogSettings,
    ) -> Result<Self, CatalogError> {
        let vehicle_type = match vehicle_type.map(str::trim).filter(|t| !t.is_empty()) {
            Some(raw) if raw.eq_ignore_ascii_case(ALL_CATEGORY) => None,
            Some(raw) => Some(raw.parse::<VehicleType>().map_err(CatalogError::InvalidInput)?),
            None => None,
        };

        Ok(Self {
            search_text: check_search_text(search_text, settings)?,
            vehicle_type,
        })
    }
}

/// Validated text for the destination search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceQuery {
    pub search_text: Option<String>,
}

impl PlaceQuery {
    pub fn parse(search_text: Option<&str>, settings: &CatalogSettings) -> Result<Self, CatalogError> {
        Ok(Self {
            search_text: check_search_text(search_text, settings)?,
        })
    }
}

fn check_search_text(
    search_text: Option<&str>,
    settings: &CatalogSettings,
) -> Result<Option<String>, CatalogError> {
    let Some(text) = search_text else {
        return Ok(None);
    };

    if text.chars().count() > settings.max_query_length {
        return Err(CatalogError::InvalidInput(format!(
            "search text exceeds {} characters",
            settings.max_query_length
        )));
    }
    if text.chars().any(char::is_control) {
        return Err(CatalogError::InvalidInput(
            "search text contains control characters".to_string(),
        ));
    }

    Ok(Some(text.to_string()))
}
