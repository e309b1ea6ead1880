use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::fare::Fare;

/// Category id that disables type filtering.
pub const ALL_CATEGORY: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripId(pub u64);

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TripId {
    fn from(value: u64) -> Self {
        TripId(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub String);

impl VehicleId {
    pub fn new(id: impl Into<String>) -> Self {
        VehicleId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Vehicle categories operating in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    #[serde(alias = "bus", alias = "BUS")]
    Bus,
    #[serde(alias = "jeepney", alias = "JEEPNEY")]
    Jeepney,
    #[serde(alias = "UV", alias = "van", alias = "uv")]
    Van,
    #[serde(alias = "taxi", alias = "TAXI")]
    Taxi,
    #[serde(alias = "tricycle", alias = "TRICYCLE")]
    Tricycle,
}

impl VehicleType {
    pub const ALL: [VehicleType; 5] = [
        VehicleType::Bus,
        VehicleType::Jeepney,
        VehicleType::Van,
        VehicleType::Taxi,
        VehicleType::Tricycle,
    ];

    /// Lowercase id, matching the trip category tags.
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Bus => "bus",
            VehicleType::Jeepney => "jeepney",
            VehicleType::Van => "van",
            VehicleType::Taxi => "taxi",
            VehicleType::Tricycle => "tricycle",
        }
    }

    /// Label shown on map markers.
    pub fn label(&self) -> &'static str {
        match self {
            VehicleType::Bus => "Bus",
            VehicleType::Jeepney => "Jeepney",
            VehicleType::Van => "UV",
            VehicleType::Taxi => "Taxi",
            VehicleType::Tricycle => "Tricycle",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VehicleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bus" => Ok(VehicleType::Bus),
            "jeepney" => Ok(VehicleType::Jeepney),
            "van" | "uv" => Ok(VehicleType::Van),
            "taxi" => Ok(VehicleType::Taxi),
            "tricycle" => Ok(VehicleType::Tricycle),
            other => Err(format!("unknown vehicle type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn to_point(self) -> geo::Point<f64> {
        geo::Point::new(self.longitude, self.latitude)
    }
}

/// A physical transport unit with its last-known position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    pub route: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_passengers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_stop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_arrival: Option<String>,
}

impl Vehicle {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.coordinates().is_valid() {
            return Err(format!(
                "vehicle {} has out-of-range position ({}, {})",
                self.id, self.latitude, self.longitude
            ));
        }
        if let (Some(current), Some(max)) = (self.current_passengers, self.max_capacity) {
            if current > max {
                return Err(format!(
                    "vehicle {} carries {} passengers over a capacity of {}",
                    self.id, current, max
                ));
            }
        }
        Ok(())
    }

    /// Case-insensitive match against the route and the type names.
    pub(crate) fn matches_text(&self, needle_lower: &str) -> bool {
        self.route.to_lowercase().contains(needle_lower)
            || self.vehicle_type.label().to_lowercase().contains(needle_lower)
            || self.vehicle_type.as_str().contains(needle_lower)
    }
}

/// A bookable scheduled journey offered by a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub name: String,
    /// Category tag, e.g. "bus" or "jeepney".
    #[serde(rename = "type")]
    pub category: String,
    pub vehicle_id: VehicleId,
    pub fare: Fare,
    pub seats_available: u32,
    #[serde(with = "time_of_day")]
    pub departure: NaiveTime,
    #[serde(with = "time_of_day")]
    pub arrival: NaiveTime,
    #[serde(default)]
    pub route: String,
    pub stops: Vec<String>,
}

impl Trip {
    pub fn validate(&self) -> Result<(), String> {
        if self.stops.is_empty() {
            return Err(format!("trip {} has no stops", self.id));
        }
        Ok(())
    }

    pub fn origin(&self) -> Option<&str> {
        self.stops.first().map(String::as_str)
    }

    pub fn destination(&self) -> Option<&str> {
        self.stops.last().map(String::as_str)
    }

    pub fn is_sold_out(&self) -> bool {
        self.seats_available == 0
    }
}

/// A filter chip on the trip list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub label: String,
    pub icon: String,
}

impl Category {
    pub fn new(id: &str, label: &str, icon: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            icon: icon.to_string(),
        }
    }

    pub fn defaults() -> Vec<Category> {
        vec![
            Category::new(ALL_CATEGORY, "All", "apps"),
            Category::new("bus", "Bus", "bus"),
            Category::new("jeepney", "Jeepney", "car"),
            Category::new("van", "Van", "car-sport"),
        ]
    }
}

/// A named destination offered by the "Where would you like to go?" search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
}

impl Place {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

/// Times of day are read as "6:00 AM" or "06:00" and written as "06:00".
pub mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(input: &str) -> Result<NaiveTime, String> {
        let trimmed = input.trim();
        let upper = trimmed.to_uppercase();
        let (clock, meridiem) = if let Some(rest) = upper.strip_suffix("AM") {
            (rest.trim(), Some(false))
        } else if let Some(rest) = upper.strip_suffix("PM") {
            (rest.trim(), Some(true))
        } else {
            (upper.as_str(), None)
        };

        let (hours, minutes) = clock
            .split_once(':')
            .ok_or_else(|| format!("invalid time of day: {}", input))?;
        let mut hours: u32 = hours
            .trim()
            .parse()
            .map_err(|_| format!("invalid hour in: {}", input))?;
        let minutes: u32 = minutes
            .trim()
            .parse()
            .map_err(|_| format!("invalid minute in: {}", input))?;

        if let Some(pm) = meridiem {
            if hours == 0 || hours > 12 {
                return Err(format!("invalid 12-hour time: {}", input));
            }
            hours %= 12;
            if pm {
                hours += 12;
            }
        }

        NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(|| format!("invalid time of day: {}", input))
    }

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}
