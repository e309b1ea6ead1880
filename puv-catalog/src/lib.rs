pub mod models;
pub mod fare;
pub mod inventory;
pub mod query;
pub mod catalog;
pub mod membership;

pub use models::{Category, Coordinates, Place, Trip, TripId, Vehicle, VehicleId, VehicleType, ALL_CATEGORY};
pub use fare::Fare;
pub use inventory::SeatInventory;
pub use query::{CatalogSettings, PlaceQuery, TripQuery, VehicleQuery};
pub use catalog::{
    BookingDecision, BookingRequest, BookingResult, BookingStatus, CatalogError, NearbyVehicle,
    TripCatalog,
};
pub use membership::MembershipPlan;
