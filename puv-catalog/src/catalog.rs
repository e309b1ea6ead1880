use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use geo::HaversineDistance;
use puv_shared::models::events::BookingConfirmedEvent;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::inventory::{InventoryError, SeatInventory};
use crate::models::{Category, Coordinates, Place, Trip, TripId, Vehicle, VehicleId, VehicleType, ALL_CATEGORY};
use crate::query::{CatalogSettings, PlaceQuery, TripQuery, VehicleQuery};

const EVENT_CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingDecision {
    #[default]
    Confirm,
    Cancel,
}

/// One user action on the booking prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub trip_id: TripId,
    #[serde(default)]
    pub decision: BookingDecision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingResult {
    pub trip_id: TripId,
    pub status: BookingStatus,
    /// Present only for confirmed bookings.
    pub confirmation_id: Option<Uuid>,
    /// Catalog-wide order of confirmed bookings, starting at 1.
    pub sequence: Option<u64>,
    pub timestamp: DateTime<Utc>,
    pub seats_remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyVehicle {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub distance_m: f64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Trip not found: {0}")]
    NotFound(TripId),

    #[error("No seats left on trip {0}")]
    SoldOut(TripId),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid catalog data: {0}")]
    InvalidData(String),
}

impl From<InventoryError> for CatalogError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::NotFound(id) => CatalogError::NotFound(id),
            InventoryError::SoldOut(id) => CatalogError::SoldOut(id),
        }
    }
}

/// In-memory authoritative set of vehicles and trips for one session.
///
/// Entities are fixed at construction. Seat counts live in a [`SeatInventory`]
/// so the catalog can be shared behind an `Arc` and booked from many tasks
/// without a catalog-wide lock.
pub struct TripCatalog {
    settings: CatalogSettings,
    vehicles: Vec<Vehicle>,
    vehicle_index: HashMap<VehicleId, usize>,
    trips: Vec<Trip>,
    trip_index: HashMap<TripId, usize>,
    places: Vec<Place>,
    inventory: SeatInventory,
    sequence: AtomicU64,
    events: broadcast::Sender<BookingConfirmedEvent>,
}

impl TripCatalog {
    pub fn new(vehicles: Vec<Vehicle>, trips: Vec<Trip>) -> Result<Self, CatalogError> {
        Self::with_settings(vehicles, trips, CatalogSettings::default())
    }

    pub fn with_settings(
        vehicles: Vec<Vehicle>,
        trips: Vec<Trip>,
        settings: CatalogSettings,
    ) -> Result<Self, CatalogError> {
        let mut vehicle_index = HashMap::with_capacity(vehicles.len());
        for (pos, vehicle) in vehicles.iter().enumerate() {
            vehicle.validate().map_err(CatalogError::InvalidData)?;
            if vehicle_index.insert(vehicle.id.clone(), pos).is_some() {
                return Err(CatalogError::InvalidData(format!("duplicate vehicle id {}", vehicle.id)));
            }
        }

        let mut trip_index = HashMap::with_capacity(trips.len());
        let mut inventory = SeatInventory::new();
        for (pos, trip) in trips.iter().enumerate() {
            trip.validate().map_err(CatalogError::InvalidData)?;
            if trip_index.insert(trip.id, pos).is_some() {
                return Err(CatalogError::InvalidData(format!("duplicate trip id {}", trip.id)));
            }
            if !vehicle_index.contains_key(&trip.vehicle_id) {
                tracing::warn!(
                    "Trip {} references unknown vehicle {}",
                    trip.id,
                    trip.vehicle_id
                );
            }
            inventory.initialize(trip.id, trip.seats_available);
        }

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        tracing::info!(
            "Catalog loaded with {} vehicles and {} trips",
            vehicles.len(),
            trips.len()
        );

        Ok(Self {
            settings,
            vehicles,
            vehicle_index,
            trips,
            trip_index,
            places: Vec::new(),
            inventory,
            sequence: AtomicU64::new(0),
            events,
        })
    }

    /// Attach the destination list searched by [`TripCatalog::search_places`].
    pub fn with_places(mut self, places: Vec<Place>) -> Result<Self, CatalogError> {
        let mut seen = HashMap::with_capacity(places.len());
        for place in &places {
            if place.name.trim().is_empty() {
                return Err(CatalogError::InvalidData(format!("place {} has no name", place.id)));
            }
            if seen.insert(place.id.as_str(), ()).is_some() {
                return Err(CatalogError::InvalidData(format!("duplicate place id {}", place.id)));
            }
        }

        self.places = places;
        Ok(self)
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    pub fn categories(&self) -> &[Category] {
        &self.settings.categories
    }

    /// Receive every confirmed booking from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<BookingConfirmedEvent> {
        self.events.subscribe()
    }

    pub fn list_vehicles(&self) -> Vec<Vehicle> {
        self.vehicles.clone()
    }

    /// Snapshot of one trip with its current seat count.
    pub fn trip(&self, trip_id: TripId) -> Option<Trip> {
        self.trip_index
            .get(&trip_id)
            .map(|pos| self.snapshot(&self.trips[*pos]))
    }

    /// Weak-reference lookup; the trip does not own its vehicle.
    pub fn vehicle_for(&self, trip: &Trip) -> Option<&Vehicle> {
        self.vehicle_index
            .get(&trip.vehicle_id)
            .map(|pos| &self.vehicles[*pos])
    }

    /// Stable filter over trips by category tag and name substring.
    ///
    /// An absent category or `"all"` keeps every type; an absent or blank
    /// search text keeps every name. Both comparisons ignore case.
    pub fn filter_trips(&self, category: Option<&str>, search_text: Option<&str>) -> Vec<Trip> {
        let category = category
            .filter(|c| !c.eq_ignore_ascii_case(ALL_CATEGORY))
            .map(str::to_lowercase);
        let needle = search_text
            .filter(|s| !s.trim().is_empty())
            .map(str::to_lowercase);

        self.trips
            .iter()
            .filter(|trip| {
                category
                    .as_ref()
                    .map_or(true, |c| trip.category.to_lowercase() == *c)
            })
            .filter(|trip| {
                needle
                    .as_ref()
                    .map_or(true, |n| trip.name.to_lowercase().contains(n.as_str()))
            })
            .map(|trip| self.snapshot(trip))
            .collect()
    }

    pub fn query_trips(&self, query: &TripQuery) -> Vec<Trip> {
        self.filter_trips(query.category.as_deref(), query.search_text.as_deref())
    }

    /// Case-insensitive substring match on route or vehicle type.
    pub fn filter_vehicles(&self, search_text: Option<&str>) -> Vec<Vehicle> {
        match search_text.filter(|s| !s.trim().is_empty()) {
            None => self.list_vehicles(),
            Some(text) => {
                let needle = text.to_lowercase();
                self.vehicles
                    .iter()
                    .filter(|v| v.matches_text(&needle))
                    .cloned()
                    .collect()
            }
        }
    }

    /// Destinations whose name contains `search_text`, ignoring case.
    ///
    /// Absent or blank text returns every place; order is the list order.
    pub fn search_places(&self, search_text: Option<&str>) -> Vec<Place> {
        let needle = search_text
            .filter(|s| !s.trim().is_empty())
            .map(str::to_lowercase);

        self.places
            .iter()
            .filter(|place| {
                needle
                    .as_ref()
                    .map_or(true, |n| place.name.to_lowercase().contains(n.as_str()))
            })
            .cloned()
            .collect()
    }

    pub fn query_places(&self, query: &PlaceQuery) -> Vec<Place> {
        self.search_places(query.search_text.as_deref())
    }

    pub fn vehicles_of_type(&self, vehicle_type: VehicleType) -> Vec<Vehicle> {
        self.vehicles
            .iter()
            .filter(|v| v.vehicle_type == vehicle_type)
            .cloned()
            .collect()
    }

    pub fn query_vehicles(&self, query: &VehicleQuery) -> Vec<Vehicle> {
        let matches = self.filter_vehicles(query.search_text.as_deref());
        match query.vehicle_type {
            Some(vehicle_type) => matches
                .into_iter()
                .filter(|v| v.vehicle_type == vehicle_type)
                .collect(),
            None => matches,
        }
    }

    /// Vehicles within `radius_m` of `center`, closest first.
    pub fn nearby_vehicles(&self, center: Coordinates, radius_m: f64) -> Vec<NearbyVehicle> {
        let origin = center.to_point();
        let mut nearby: Vec<NearbyVehicle> = self
            .vehicles
            .iter()
            .map(|vehicle| NearbyVehicle {
                distance_m: origin.haversine_distance(&vehicle.coordinates().to_point()),
                vehicle: vehicle.clone(),
            })
            .filter(|n| n.distance_m <= radius_m)
            .collect();

        nearby.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
        nearby
    }

    /// Reserve one seat on a trip.
    ///
    /// Concurrent calls on the same trip are serialized by its seat counter:
    /// at most `seats_available` of them succeed and the rest fail with
    /// [`CatalogError::SoldOut`].
    pub fn request_booking(&self, trip_id: TripId) -> Result<BookingResult, CatalogError> {
        if !self.trip_index.contains_key(&trip_id) {
            tracing::warn!("Booking rejected: trip {} not found", trip_id);
            return Err(CatalogError::NotFound(trip_id));
        }

        let seats_remaining = self.inventory.reserve_one(&trip_id).map_err(|e| {
            tracing::warn!("Booking rejected: {}", e);
            CatalogError::from(e)
        })?;

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let confirmation_id = Uuid::new_v4();
        let timestamp = Utc::now();

        let _ = self.events.send(BookingConfirmedEvent {
            confirmation_id,
            trip_id: trip_id.0,
            sequence,
            seats_remaining,
            timestamp: timestamp.timestamp(),
        });

        tracing::info!(
            "Booking {} confirmed on trip {} ({} seats left)",
            confirmation_id,
            trip_id,
            seats_remaining
        );

        Ok(BookingResult {
            trip_id,
            status: BookingStatus::Confirmed,
            confirmation_id: Some(confirmation_id),
            sequence: Some(sequence),
            timestamp,
            seats_remaining,
        })
    }

    /// Apply the user's decision from the booking prompt.
    pub fn submit(&self, request: &BookingRequest) -> Result<BookingResult, CatalogError> {
        match request.decision {
            BookingDecision::Confirm => self.request_booking(request.trip_id),
            BookingDecision::Cancel => {
                let seats_remaining = self
                    .inventory
                    .available(&request.trip_id)
                    .ok_or(CatalogError::NotFound(request.trip_id))?;

                Ok(BookingResult {
                    trip_id: request.trip_id,
                    status: BookingStatus::Cancelled,
                    confirmation_id: None,
                    sequence: None,
                    timestamp: Utc::now(),
                    seats_remaining,
                })
            }
        }
    }

    fn snapshot(&self, trip: &Trip) -> Trip {
        let mut view = trip.clone();
        view.seats_available = self.inventory.available(&trip.id).unwrap_or(0);
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fare::Fare;
    use chrono::NaiveTime;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn trip(id: u64, category: &str, name: &str, seats: u32) -> Trip {
        Trip {
            id: TripId(id),
            name: name.to_string(),
            category: category.to_string(),
            vehicle_id: VehicleId::new(format!("{}-{:03}", category.to_uppercase(), id)),
            fare: Fare::pesos(50),
            seats_available: seats,
            departure: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            arrival: NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
            route: String::new(),
            stops: vec!["A".to_string(), "B".to_string()],
        }
    }

    fn vehicle(id: &str, vehicle_type: VehicleType, route: &str, lat: f64, lng: f64) -> Vehicle {
        Vehicle {
            id: VehicleId::new(id),
            vehicle_type,
            route: route.to_string(),
            latitude: lat,
            longitude: lng,
            current_passengers: None,
            max_capacity: None,
            next_stop: None,
            estimated_arrival: None,
        }
    }

    fn sample_catalog() -> TripCatalog {
        TripCatalog::new(
            vec![
                vehicle("BUS-001", VehicleType::Bus, "Manila - QC", 14.6091, 121.0223),
                vehicle("JEP-001", VehicleType::Jeepney, "Makati - Pasay", 14.5547, 121.0244),
                vehicle("UV-004", VehicleType::Van, "Novaliches - Makati (Ayala)", 14.7005, 121.0614),
            ],
            vec![
                trip(1, "bus", "Route 1: Manila - Quezon City", 10),
                trip(2, "jeepney", "Route 2: Makati - Pasay", 5),
                trip(3, "bus", "Route 3: Cubao - Makati", 1),
                trip(4, "van", "Route 4: Fairview - Ortigas", 0),
            ],
        )
        .unwrap()
    }

    fn ids(trips: &[Trip]) -> Vec<u64> {
        trips.iter().map(|t| t.id.0).collect()
    }

    #[test]
    fn test_category_filter_keeps_only_matching_type() {
        let catalog = sample_catalog();
        let buses = catalog.filter_trips(Some("BUS"), None);
        assert_eq!(ids(&buses), vec![1, 3]);
        assert!(buses.iter().all(|t| t.category == "bus"));
    }

    #[test]
    fn test_text_filter_is_case_insensitive_and_idempotent() {
        let catalog = sample_catalog();
        let once = catalog.filter_trips(None, Some("MAKATI"));
        assert_eq!(ids(&once), vec![2, 3]);
        assert!(once.iter().all(|t| t.name.to_lowercase().contains("makati")));

        // Filtering the filtered set again changes nothing.
        let refiltered = TripCatalog::new(Vec::new(), once.clone()).unwrap();
        assert_eq!(refiltered.filter_trips(None, Some("MAKATI")), once);

        let narrowed = catalog.filter_trips(Some("bus"), Some("makati"));
        let refiltered = TripCatalog::new(Vec::new(), narrowed.clone()).unwrap();
        assert_eq!(refiltered.filter_trips(Some("bus"), Some("makati")), narrowed);
    }

    #[test]
    fn test_category_match_ignores_stored_case() {
        let catalog = TripCatalog::new(
            Vec::new(),
            vec![
                trip(1, "Bus", "Route 1: Manila - Quezon City", 10),
                trip(2, "JEEPNEY", "Route 2: Makati - Pasay", 5),
                trip(3, "bus", "Route 3: Cubao - Makati", 1),
            ],
        )
        .unwrap();

        assert_eq!(ids(&catalog.filter_trips(Some("bus"), None)), vec![1, 3]);
        assert_eq!(ids(&catalog.filter_trips(Some("Jeepney"), None)), vec![2]);
        assert_eq!(ids(&catalog.filter_trips(Some("BUS"), Some("cubao"))), vec![3]);
    }

    #[test]
    fn test_no_filters_returns_everything_in_order() {
        let catalog = sample_catalog();
        assert_eq!(ids(&catalog.filter_trips(None, None)), vec![1, 2, 3, 4]);
        assert_eq!(ids(&catalog.filter_trips(Some("all"), Some(""))), vec![1, 2, 3, 4]);
        assert_eq!(ids(&catalog.filter_trips(Some("ALL"), Some("   "))), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let catalog = sample_catalog();
        assert_eq!(ids(&catalog.filter_trips(Some("bus"), Some("makati"))), vec![3]);
        assert!(catalog.filter_trips(Some("van"), Some("makati")).is_empty());
    }

    #[test]
    fn test_vehicle_filter_matches_route_or_type() {
        let catalog = sample_catalog();
        assert_eq!(catalog.filter_vehicles(None).len(), 3);
        assert_eq!(catalog.filter_vehicles(Some("  ")).len(), 3);

        let makati: Vec<_> = catalog.filter_vehicles(Some("makati")).into_iter().map(|v| v.id.0).collect();
        assert_eq!(makati, vec!["JEP-001", "UV-004"]);

        let uv = catalog.filter_vehicles(Some("uv"));
        assert_eq!(uv.len(), 1);
        assert_eq!(uv[0].vehicle_type, VehicleType::Van);

        assert_eq!(catalog.vehicles_of_type(VehicleType::Bus).len(), 1);
        let query = VehicleQuery { search_text: Some("makati".into()), vehicle_type: Some(VehicleType::Jeepney) };
        assert_eq!(catalog.query_vehicles(&query).len(), 1);
    }

    #[test]
    fn test_nearby_vehicles_sorted_by_distance() {
        let catalog = sample_catalog();
        let ayala = Coordinates::new(14.5547, 121.0244);

        let nearby = catalog.nearby_vehicles(ayala, 10_000.0);
        assert_eq!(nearby.len(), 2);
        assert_eq!(nearby[0].vehicle.id.as_str(), "JEP-001");
        assert!(nearby[0].distance_m < 1.0);
        assert!(nearby[0].distance_m <= nearby[1].distance_m);

        assert_eq!(catalog.nearby_vehicles(ayala, 500.0).len(), 1);
    }

    #[test]
    fn test_booking_decrements_until_sold_out() {
        let catalog = sample_catalog();

        let first = catalog.request_booking(TripId(3)).unwrap();
        assert_eq!(first.status, BookingStatus::Confirmed);
        assert_eq!(first.seats_remaining, 0);
        assert_eq!(first.sequence, Some(1));
        assert!(first.confirmation_id.is_some());

        assert_eq!(catalog.request_booking(TripId(3)), Err(CatalogError::SoldOut(TripId(3))));
        assert_eq!(catalog.request_booking(TripId(3)), Err(CatalogError::SoldOut(TripId(3))));
        assert_eq!(catalog.request_booking(TripId(4)), Err(CatalogError::SoldOut(TripId(4))));
        assert_eq!(catalog.trip(TripId(3)).unwrap().seats_available, 0);
    }

    #[test]
    fn test_booking_unknown_trip_leaves_others_untouched() {
        let catalog = sample_catalog();
        let before = catalog.filter_trips(None, None);

        assert_eq!(catalog.request_booking(TripId(99)), Err(CatalogError::NotFound(TripId(99))));
        assert_eq!(catalog.filter_trips(None, None), before);
    }

    #[test]
    fn test_cancel_decision_does_not_touch_seats() {
        let catalog = sample_catalog();
        let result = catalog
            .submit(&BookingRequest { trip_id: TripId(2), decision: BookingDecision::Cancel })
            .unwrap();
        assert_eq!(result.status, BookingStatus::Cancelled);
        assert_eq!(result.seats_remaining, 5);
        assert_eq!(result.confirmation_id, None);
        assert_eq!(catalog.trip(TripId(2)).unwrap().seats_available, 5);

        assert_eq!(
            catalog.submit(&BookingRequest { trip_id: TripId(42), decision: BookingDecision::Cancel }),
            Err(CatalogError::NotFound(TripId(42)))
        );

        let confirmed = catalog.submit(&BookingRequest { trip_id: TripId(2), decision: BookingDecision::Confirm }).unwrap();
        assert_eq!(confirmed.seats_remaining, 4);
    }

    #[test]
    fn test_two_concurrent_bookings_for_last_seat() {
        let catalog = Arc::new(sample_catalog());
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let catalog = Arc::clone(&catalog);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    catalog.request_booking(TripId(3))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let confirmed = results.iter().filter(|r| r.is_ok()).count();
        let sold_out = results
            .iter()
            .filter(|r| matches!(r, Err(CatalogError::SoldOut(_))))
            .count();

        assert_eq!(confirmed, 1);
        assert_eq!(sold_out, 1);
        assert_eq!(catalog.trip(TripId(3)).unwrap().seats_available, 0);
    }

    #[test]
    fn test_sequence_numbers_are_unique_under_contention() {
        let catalog = Arc::new(sample_catalog());
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let catalog = Arc::clone(&catalog);
                let trip_id = if n % 2 == 0 { TripId(1) } else { TripId(2) };
                thread::spawn(move || {
                    (0..5)
                        .filter_map(|_| catalog.request_booking(trip_id).ok())
                        .filter_map(|r| r.sequence)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut sequences: Vec<u64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        sequences.sort_unstable();
        assert_eq!(sequences, (1..=15).collect::<Vec<_>>());
    }

    #[test]
    fn test_confirmed_bookings_are_published() {
        let catalog = sample_catalog();
        let mut rx = catalog.subscribe();

        let result = catalog.request_booking(TripId(1)).unwrap();
        let event = rx.try_recv().unwrap();
        assert_eq!(event.trip_id, 1);
        assert_eq!(Some(event.confirmation_id), result.confirmation_id);
        assert_eq!(event.seats_remaining, 9);

        let _ = catalog.request_booking(TripId(4));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_seeded_scenario() {
        let catalog = TripCatalog::new(Vec::new(), vec![trip(1, "bus", "Manila to Makati", 10)]).unwrap();

        assert_eq!(ids(&catalog.filter_trips(Some("bus"), Some("makati"))), vec![1]);
        assert!(catalog.filter_trips(Some("jeepney"), Some("")).is_empty());

        for _ in 0..10 {
            assert!(catalog.request_booking(TripId(1)).is_ok());
        }
        assert_eq!(catalog.request_booking(TripId(1)), Err(CatalogError::SoldOut(TripId(1))));
    }

    #[test]
    fn test_rejects_invalid_seed_data() {
        let dup = TripCatalog::new(Vec::new(), vec![trip(1, "bus", "A", 1), trip(1, "bus", "B", 1)]);
        assert!(matches!(dup, Err(CatalogError::InvalidData(_))));

        let mut empty_stops = trip(2, "bus", "C", 1);
        empty_stops.stops.clear();
        assert!(matches!(TripCatalog::new(Vec::new(), vec![empty_stops]), Err(CatalogError::InvalidData(_))));

        let bad_position = vehicle("X", VehicleType::Taxi, "Nowhere", 120.0, 0.0);
        assert!(matches!(TripCatalog::new(vec![bad_position], Vec::new()), Err(CatalogError::InvalidData(_))));
    }

    #[test]
    fn test_vehicle_lookup_is_weak() {
        let catalog = sample_catalog();
        let bus_trip = catalog.trip(TripId(1)).unwrap();
        // Sample trips point at "BUS-001", "JEEPNEY-002", ... and only the first exists.
        assert_eq!(catalog.vehicle_for(&bus_trip).map(|v| v.id.as_str()), Some("BUS-001"));
        let jeep_trip = catalog.trip(TripId(2)).unwrap();
        assert!(catalog.vehicle_for(&jeep_trip).is_none());
    }

    fn place_names(places: &[Place]) -> Vec<&str> {
        places.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_place_search_matches_name_ignoring_case() {
        let catalog = TripCatalog::new(Vec::new(), Vec::new())
            .unwrap()
            .with_places(vec![
                Place::new("1", "SM Megamall"),
                Place::new("4", "Mall of Asia"),
                Place::new("14", "NAIA Terminal 3"),
            ])
            .unwrap();

        assert_eq!(place_names(&catalog.search_places(Some("MALL"))), vec!["SM Megamall", "Mall of Asia"]);
        assert_eq!(place_names(&catalog.search_places(Some("naia"))), vec!["NAIA Terminal 3"]);
        assert!(catalog.search_places(Some("Cebu")).is_empty());

        assert_eq!(catalog.search_places(None).len(), 3);
        assert_eq!(catalog.search_places(Some("   ")), catalog.search_places(None));

        let query = PlaceQuery::parse(Some("asia"), catalog.settings()).unwrap();
        assert_eq!(place_names(&catalog.query_places(&query)), vec!["Mall of Asia"]);
    }

    #[test]
    fn test_rejects_invalid_places() {
        let dup = TripCatalog::new(Vec::new(), Vec::new())
            .unwrap()
            .with_places(vec![Place::new("1", "Trinoma"), Place::new("1", "Divisoria")]);
        assert!(matches!(dup, Err(CatalogError::InvalidData(_))));

        let unnamed = TripCatalog::new(Vec::new(), Vec::new())
            .unwrap()
            .with_places(vec![Place::new("2", " ")]);
        assert!(matches!(unnamed, Err(CatalogError::InvalidData(_))));

        assert!(TripCatalog::new(Vec::new(), Vec::new()).unwrap().search_places(None).is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_trips() -> impl Strategy<Value = Vec<(String, String)>> {
            let category = prop::sample::select(vec!["bus", "Bus", "jeepney", "JEEPNEY", "van"]);
            prop::collection::vec((category.prop_map(str::to_string), "[A-Za-z ]{0,12}"), 0..12)
        }

        fn arb_category() -> impl Strategy<Value = Option<String>> {
            prop::option::of(
                prop::sample::select(vec!["all", "bus", "BUS", "jeepney", "van", "taxi"])
                    .prop_map(str::to_string),
            )
        }

        fn build(specs: &[(String, String)]) -> TripCatalog {
            let trips = specs
                .iter()
                .enumerate()
                .map(|(i, (category, name))| trip(i as u64 + 1, category, name, 3))
                .collect();
            TripCatalog::new(Vec::new(), trips).unwrap()
        }

        proptest! {
            #[test]
            fn test_category_filter_holds_for_any_collection(
                specs in arb_trips(),
                category in arb_category(),
                search in prop::option::of("[A-Za-z ]{0,3}")
            ) {
                let catalog = build(&specs);
                let result = catalog.filter_trips(category.as_deref(), search.as_deref());

                if let Some(c) = category.as_deref().filter(|c| !c.eq_ignore_ascii_case(ALL_CATEGORY)) {
                    prop_assert!(result.iter().all(|t| t.category.eq_ignore_ascii_case(c)));
                }
                if let Some(s) = search.as_deref().filter(|s| !s.trim().is_empty()) {
                    let needle = s.to_lowercase();
                    prop_assert!(result.iter().all(|t| t.name.to_lowercase().contains(&needle)));
                }

                // Stable: a subsequence of the original order.
                let result_ids = ids(&result);
                prop_assert!(result_ids.windows(2).all(|w| w[0] < w[1]));
            }

            #[test]
            fn test_refiltering_is_idempotent(
                specs in arb_trips(),
                category in arb_category(),
                search in prop::option::of("[A-Za-z ]{0,3}")
            ) {
                let catalog = build(&specs);
                let once = catalog.filter_trips(category.as_deref(), search.as_deref());

                let refiltered = TripCatalog::new(Vec::new(), once.clone()).unwrap();
                prop_assert_eq!(refiltered.filter_trips(category.as_deref(), search.as_deref()), once);
            }
        }
    }
}
