//! Screen field renderers
//!
//! Pure functions from a resolved trip view onto UI commands. Anything
//! async (destination names) is resolved into the [`TripView`] before a
//! renderer runs, which keeps the binding table static.

use ride_provider::TripRecord;
use ui_protocol::{element, icon, Command, CommandBatch, ElementId, ScreenId, Ttl};

/// Shown on the trip screen when the trip has no destination.
pub const UNKNOWN_DESTINATION: &str = "Unknown destination";

/// Trip payload plus pre-resolved display data.
#[derive(Debug, Clone)]
pub struct TripView {
    pub trip: TripRecord,
    /// Destination display name, resolved only when the trip has one.
    pub destination_name: Option<String>,
}

impl TripView {
    pub fn new(trip: TripRecord) -> Self {
        Self {
            trip,
            destination_name: None,
        }
    }
}

/// "d.d" multiplier label, truncated the way the provider app shows it.
pub fn multiplier_label(surge: f64) -> String {
    let surge = surge.max(0.0);
    format!("{}.{}", surge.trunc() as u32, ((surge * 10.0).trunc() as u32) % 10)
}

pub(crate) fn update_searching(_view: &TripView, _batch: &mut CommandBatch) {}

pub(crate) fn update_arriving(view: &TripView, batch: &mut CommandBatch) {
    let trip = &view.trip;
    let eta = trip
        .eta
        .map(|minutes| minutes.to_string())
        .unwrap_or_else(|| "?".to_string());
    batch.push(Command::text(
        ScreenId::Arriving,
        ElementId(2),
        format!("{} {} MIN", icon::CLOCK, eta),
    ));
    batch.push(Command::text(
        ScreenId::Arriving,
        ElementId(3),
        format!("{} {} x", icon::MULTIPLIER, multiplier_label(trip.surge_multiplier)),
    ));
    if let Some(vehicle) = &trip.vehicle {
        batch.push(Command::text(
            ScreenId::Arriving,
            ElementId(4),
            format!("{} {}", vehicle.make, vehicle.model),
        ));
    }

    // Driver and plate swap slots when a plate exists: the plate takes
    // the wider field.
    let plate = trip
        .vehicle
        .as_ref()
        .and_then(|vehicle| vehicle.license_plate.clone());
    let driver_slot = if plate.is_some() { ElementId(6) } else { ElementId(5) };
    if let Some(driver) = &trip.driver {
        batch.push(Command::text(
            ScreenId::Arriving,
            driver_slot,
            format!("{} {}", icon::PROFILE, driver.name),
        ));
    }
    if let Some(plate) = plate {
        batch.push(Command::text(ScreenId::Arriving, ElementId(5), plate.to_uppercase()));
    }
}

pub(crate) fn update_ready(view: &TripView, batch: &mut CommandBatch) {
    let trip = &view.trip;
    if let Some(driver) = &trip.driver {
        batch.push(Command::text(
            ScreenId::Ready,
            ElementId(3),
            format!("{} {}", icon::PROFILE, driver.name),
        ));
    }
    if let Some(vehicle) = &trip.vehicle {
        batch.push(Command::text(
            ScreenId::Ready,
            ElementId(4),
            format!("{} {}", vehicle.make, vehicle.model),
        ));
        if let Some(plate) = &vehicle.license_plate {
            batch.push(Command::text(ScreenId::Ready, ElementId(5), plate.to_uppercase()));
        }
    }
}

pub(crate) fn update_trip(view: &TripView, batch: &mut CommandBatch) {
    let destination = view
        .destination_name
        .clone()
        .unwrap_or_else(|| UNKNOWN_DESTINATION.to_string());
    batch.push(Command::text(
        ScreenId::Trip,
        ElementId(3),
        format!("{} {}", icon::PIN, destination),
    ));
    if let Some(driver) = &view.trip.driver {
        batch.push(Command::text(
            ScreenId::Trip,
            ElementId(4),
            format!("{} {}", icon::PROFILE, driver.name),
        ));
    }
    let eta = match view.trip.destination.as_ref().and_then(|dest| dest.eta) {
        Some(minutes) => format!("{} {} MIN", icon::CLOCK, minutes),
        None => format!("{} -", icon::CLOCK),
    };
    batch.push(Command::text(ScreenId::Trip, ElementId(5), eta));
}

pub(crate) fn clear_searching(ttl: Ttl, batch: &mut CommandBatch) {
    batch.push(Command::clear(ScreenId::Searching, element::STATUS_PLACEHOLDER, ttl));
}

pub(crate) fn clear_arriving(ttl: Ttl, batch: &mut CommandBatch) {
    batch.push(Command::clear(ScreenId::Arriving, element::STATUS_PLACEHOLDER, ttl));
}

pub(crate) fn clear_ready(ttl: Ttl, batch: &mut CommandBatch) {
    batch.push(Command::clear(ScreenId::Ready, element::STATUS_PLACEHOLDER, ttl));
}

pub(crate) fn clear_trip(ttl: Ttl, batch: &mut CommandBatch) {
    batch.push(Command::clear(ScreenId::Trip, element::STATUS_PLACEHOLDER, ttl));
}
