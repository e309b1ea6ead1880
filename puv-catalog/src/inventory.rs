use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::models::TripId;

/// Seat counters per trip.
///
/// The set of trips is fixed at construction; each counter is an independent
/// atomic, so reservations on different trips never contend and a reservation
/// on one trip can never take its counter below zero.
#[derive(Debug, Default)]
pub struct SeatInventory {
    seats: HashMap<TripId, AtomicU32>,
}

impl SeatInventory {
    pub fn new() -> Self {
        Self {
            seats: HashMap::new(),
        }
    }

    /// Register a trip with its starting seat count. Re-registering overwrites.
    pub fn initialize(&mut self, trip_id: TripId, seats_available: u32) {
        self.seats.insert(trip_id, AtomicU32::new(seats_available));
    }

    pub fn available(&self, trip_id: &TripId) -> Option<u32> {
        self.seats.get(trip_id).map(|seats| seats.load(Ordering::Acquire))
    }

    /// Take one seat. Returns the seats left after the reservation.
    pub fn reserve_one(&self, trip_id: &TripId) -> Result<u32, InventoryError> {
        let counter = self
            .seats
            .get(trip_id)
            .ok_or(InventoryError::NotFound(*trip_id))?;

        counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |seats| seats.checked_sub(1))
            .map(|previous| previous - 1)
            .map_err(|_| InventoryError::SoldOut(*trip_id))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("No inventory for trip {0}")]
    NotFound(TripId),

    #[error("Trip {0} is sold out")]
    SoldOut(TripId),
}
