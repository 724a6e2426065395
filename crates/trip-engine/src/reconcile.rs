//! Reconciliation Loop
//!
//! Given the status the device assumes and the provider's fresh answer,
//! decides between a same-status refresh, a drift jump-cut, and
//! trip-ended resolution. Content commands are always emitted before
//! the screen change that makes them visible.

use crate::render::TripView;
use crate::{recovery, status, TripEngine, TripStatus};
use place_lookup::PlaceDirectory;
use ride_provider::{ProviderError, RideProvider, TripRecord};
use storage::TripStore;
use tracing::{info, warn};
use ui_protocol::{icon, Command, CommandBatch, ElementId, ScreenId};

/// Receipt line when the trip had no destination on record.
pub const NO_DESTINATION: &str = "No destination set";

impl<P, D, S> TripEngine<P, D, S>
where
    P: RideProvider + Clone + 'static,
    D: PlaceDirectory,
    S: TripStore + Clone + 'static,
{
    /// Poll handler: reconcile the device's expected status against the
    /// provider and emit the commands that close the gap.
    pub async fn poll_status(&self, expected: TripStatus) -> CommandBatch {
        match self.try_poll_status(expected).await {
            Ok(batch) => batch,
            Err(err) => recovery::provider_failure(&err),
        }
    }

    async fn try_poll_status(&self, expected: TripStatus) -> Result<CommandBatch, ProviderError> {
        let trip = self.provider.current_trip().await?;
        let actual = status::classify(trip.as_ref());

        let trip = match trip {
            None => return self.resolve_ended().await,
            Some(trip) => trip,
        };
        self.persist_trip_id(&trip.request_id);

        let view = self.resolve_view(trip, actual).await;
        let binding = status::binding_for(actual);

        let mut batch = CommandBatch::new();
        binding.render_update(&view, &mut batch);
        binding.render_clear(self.config.status_ttl(), &mut batch);

        if actual != expected {
            // The provider moved on between two polls; the jump-cut must
            // visibly notify since the device missed the normal
            // progression.
            info!(
                "trip status drift: device expected {:?}, provider reports {:?}",
                expected, actual
            );
            batch.push(Command::change_screen_alert(binding.screen));
        }
        Ok(batch)
    }

    /// Resolve the display data renderers need before they run. Only the
    /// trip screen shows a destination name, so only that status pays
    /// for the lookup.
    async fn resolve_view(&self, trip: TripRecord, actual: TripStatus) -> TripView {
        let destination_name = match (actual, trip.destination) {
            (TripStatus::InProgress, Some(dest)) => Some(
                self.places
                    .resolve_place_name(dest.latitude, dest.longitude)
                    .await,
            ),
            _ => None,
        };
        TripView {
            trip,
            destination_name,
        }
    }

    /// No active trip while the device expected one: resolve the receipt
    /// or cancellation of the trip that just ended.
    async fn resolve_ended(&self) -> Result<CommandBatch, ProviderError> {
        let profile = self.provider.profile().await?;
        let last_trip = match self.store.last_trip_id(&profile.uuid).await {
            Ok(id) => id,
            Err(err) => {
                warn!("last-trip lookup failed, treating as unknown: {}", err);
                None
            }
        };

        let trip_id = match last_trip {
            Some(id) => id,
            None => {
                warn!(
                    "trip ended but no last trip id on record for {}",
                    profile.uuid
                );
                return Ok(neutral_batch());
            }
        };

        // Receipt and details are fetched concurrently. The receipt is
        // deferred so upstream billing can finalize, and the task is
        // dropped unawaited when the trip turns out canceled.
        let receipt_task = {
            let provider = self.provider.clone();
            let delay = self.config.receipt_delay();
            let trip_id = trip_id.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                provider.trip_receipt(&trip_id).await
            })
        };

        let trip = match self.provider.trip_details(&trip_id).await {
            Ok(trip) => trip,
            Err(err) => {
                receipt_task.abort();
                return Err(err);
            }
        };

        if trip.is_canceled() {
            receipt_task.abort();
            return Ok(recovery::trip_canceled());
        }

        let receipt = match receipt_task.await {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(err)) => {
                warn!("receipt fetch failed for {}: {}", trip_id, err);
                return Ok(recovery::receipt_unavailable());
            }
            Err(err) => {
                warn!("receipt task died for {}: {}", trip_id, err);
                return Ok(recovery::receipt_unavailable());
            }
        };

        let destination = match trip.destination {
            Some(dest) => {
                self.places
                    .resolve_place_name(dest.latitude, dest.longitude)
                    .await
            }
            None => NO_DESTINATION.to_string(),
        };

        let mut batch = CommandBatch::new();
        batch.push(Command::text(
            ScreenId::Receipt,
            ElementId(2),
            format!("{} {}", icon::PIN, destination),
        ));
        batch.push(Command::text(
            ScreenId::Receipt,
            ElementId(3),
            format!("{} {}", icon::PRICE, receipt.total_charged),
        ));
        batch.push(Command::change_screen_alert(ScreenId::Receipt));
        Ok(batch)
    }
}

/// Safe batch for the inconsistent "ended with no known trip" state:
/// restart from location choice, without an alert since nothing
/// user-visible happened.
fn neutral_batch() -> CommandBatch {
    CommandBatch::from(vec![Command::change_screen(ScreenId::ChooseLocation)])
}
