//! Trip lifecycle status and screen bindings
//!
//! The status→screen/renderer mapping is a statically-constructed,
//! immutable table, total over the enum. Lookup never fails; statuses
//! without a dedicated binding fall back to the searching binding.

use crate::render::{self, TripView};
use ride_provider::TripRecord;
use ui_protocol::{CommandBatch, ScreenId, Ttl};

/// Trip lifecycle status as the device understands it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TripStatus {
    /// No trip, and the device expected none.
    None,
    Processing,
    Accepted,
    Arriving,
    InProgress,
    /// Inferred: the provider reports no trip but the device expected one.
    Ended,
}

impl TripStatus {
    /// Map a provider status string.
    ///
    /// Unknown strings are treated as an in-progress trip: showing the
    /// last known trip UI beats failing the poll.
    pub fn from_provider(status: &str) -> Self {
        match status {
            "processing" => Self::Processing,
            "accepted" => Self::Accepted,
            "arriving" => Self::Arriving,
            "in_progress" => Self::InProgress,
            _ => Self::InProgress,
        }
    }
}

/// Classify the provider's current-trip answer.
pub fn classify(trip: Option<&TripRecord>) -> TripStatus {
    match trip {
        None => TripStatus::None,
        Some(trip) => TripStatus::from_provider(&trip.status),
    }
}

/// Immutable binding of a trip status to its screen and renderers.
pub struct StatusBinding {
    pub status: TripStatus,
    pub screen: ScreenId,
    update: fn(&TripView, &mut CommandBatch),
    clear: fn(Ttl, &mut CommandBatch),
}

impl StatusBinding {
    /// Emit the fields specific to the trip payload.
    pub fn render_update(&self, view: &TripView, batch: &mut CommandBatch) {
        (self.update)(view, batch);
    }

    /// Re-arm the screen's transient placeholders.
    pub fn render_clear(&self, ttl: Ttl, batch: &mut CommandBatch) {
        (self.clear)(ttl, batch);
    }
}

/// One binding per active status, in lifecycle order.
static BINDINGS: [StatusBinding; 4] = [
    StatusBinding {
        status: TripStatus::Processing,
        screen: ScreenId::Searching,
        update: render::update_searching,
        clear: render::clear_searching,
    },
    StatusBinding {
        status: TripStatus::Accepted,
        screen: ScreenId::Arriving,
        update: render::update_arriving,
        clear: render::clear_arriving,
    },
    StatusBinding {
        status: TripStatus::Arriving,
        screen: ScreenId::Ready,
        update: render::update_ready,
        clear: render::clear_ready,
    },
    StatusBinding {
        status: TripStatus::InProgress,
        screen: ScreenId::Trip,
        update: render::update_trip,
        clear: render::clear_trip,
    },
];

/// Total lookup from status to binding.
pub fn binding_for(status: TripStatus) -> &'static StatusBinding {
    BINDINGS
        .iter()
        .find(|binding| binding.status == status)
        .unwrap_or(&BINDINGS[0])
}
