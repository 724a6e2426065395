//! Trip Engine
//!
//! The reconciliation core: classifies the ride's lifecycle status,
//! detects drift between the device's assumed status and the provider's,
//! and emits ordered batches of UI commands. Every public operation is
//! total: failures are recovered into rendered error screens, never
//! surfaced as raw errors to the device.

pub mod recovery;
pub mod render;
pub mod status;

mod reconcile;
mod ride;

#[cfg(test)]
pub(crate) mod testutil;

pub use ride::PickupSource;
pub use status::{binding_for, classify, StatusBinding, TripStatus};

use place_lookup::PlaceDirectory;
use ride_provider::{GeoPoint, RideProvider};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use storage::TripStore;
use tracing::warn;
use ui_protocol::Ttl;

/// Engine tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// TTL re-armed on trip-status placeholders (seconds).
    pub status_ttl_secs: u32,
    /// Grace period before fetching a receipt, so upstream billing can
    /// finalize (seconds).
    pub receipt_delay_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            status_ttl_secs: 30,
            receipt_delay_secs: 15,
        }
    }
}

impl EngineConfig {
    pub(crate) fn status_ttl(&self) -> Ttl {
        Ttl::Seconds(self.status_ttl_secs)
    }

    pub(crate) fn receipt_delay(&self) -> Duration {
        Duration::from_secs(self.receipt_delay_secs)
    }
}

/// Per-invocation device input relevant to the engine.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    /// Device location, when the companion could resolve one.
    pub location: Option<GeoPoint>,
    /// Ride product id from the user's settings.
    pub product_id: Option<String>,
}

/// Stateless per-invocation mediator between the device and the ride
/// provider. Constructed fresh for each invocation; the only state that
/// outlives it is the last-trip-id fact behind [`TripStore`].
pub struct TripEngine<P, D, S> {
    provider: P,
    places: D,
    store: S,
    config: EngineConfig,
}

impl<P, D, S> TripEngine<P, D, S>
where
    P: RideProvider + Clone + 'static,
    D: PlaceDirectory,
    S: TripStore + Clone + 'static,
{
    pub fn new(provider: P, places: D, store: S, config: EngineConfig) -> Self {
        Self {
            provider,
            places,
            store,
            config,
        }
    }

    /// Persist an observed trip id without joining the response path.
    ///
    /// Runs detached; a failed profile fetch or store write is logged
    /// and never fails the invocation that observed the id.
    pub(crate) fn persist_trip_id(&self, trip_id: &str) {
        let provider = self.provider.clone();
        let store = self.store.clone();
        let trip_id = trip_id.to_string();
        tokio::spawn(async move {
            let user_id = match provider.profile().await {
                Ok(profile) => profile.uuid,
                Err(err) => {
                    warn!("skipping last-trip persist, profile fetch failed: {}", err);
                    return;
                }
            };
            if let Err(err) = store.set_last_trip_id(&user_id, &trip_id).await {
                warn!("failed to persist last trip id for {}: {}", user_id, err);
            }
        });
    }
}
