//! Provider wire types
//!
//! Read-only value objects owned by the provider; the engine only reads
//! them. Field names follow the provider's JSON shapes.

use serde::{Deserialize, Serialize};

/// A point on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Saved pickup place slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceId {
    Home,
    Work,
}

impl PlaceId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Work => "work",
        }
    }
}

/// Assigned driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub name: String,
}

/// Assigned vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub make: String,
    pub model: String,
    #[serde(default)]
    pub license_plate: Option<String>,
}

/// Trip destination with an optional arrival estimate (minutes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub eta: Option<u32>,
}

/// A ride request as the provider reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub request_id: String,
    pub status: String,
    /// Minutes until pickup, while a driver is en route.
    #[serde(default)]
    pub eta: Option<u32>,
    #[serde(default = "default_multiplier")]
    pub surge_multiplier: f64,
    #[serde(default)]
    pub driver: Option<Driver>,
    #[serde(default)]
    pub vehicle: Option<Vehicle>,
    #[serde(default)]
    pub destination: Option<Destination>,
}

impl TripRecord {
    /// Terminal statuses a rider or driver reaches by canceling.
    pub fn is_canceled(&self) -> bool {
        matches!(self.status.as_str(), "driver_canceled" | "rider_canceled")
    }
}

/// Price component of an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    #[serde(default = "default_multiplier")]
    pub surge_multiplier: f64,
}

/// Fare/pickup estimate for a prospective request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RideEstimate {
    /// Minutes until a vehicle could arrive.
    #[serde(default)]
    pub pickup_estimate: Option<u32>,
    pub price: PriceEstimate,
}

/// Receipt for a completed trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub request_id: String,
    pub total_charged: String,
}

/// A saved place as the provider stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub address: String,
}

/// Saved home/work pickup places available to the rider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedPlaces {
    #[serde(default)]
    pub home: Option<Place>,
    #[serde(default)]
    pub work: Option<Place>,
}

/// Rider profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub uuid: String,
}

/// Ride product details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub display_name: String,
}

/// Product row for the settings autocomplete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductOption {
    pub product_id: String,
    pub display_name: String,
}

fn default_multiplier() -> f64 {
    1.0
}
