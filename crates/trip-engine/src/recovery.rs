//! Error Classification & Recovery
//!
//! Maps classified provider failures and missing-location conditions
//! onto alert batches the device can render. Every batch has the same
//! shape: alert title and message on the error screen, the recovery
//! affordances as a selectable list, then the alerting screen change
//! last.

use ride_provider::ProviderError;
use ui_protocol::{element, Command, CommandBatch, ListItem, ScreenId, Ttl, UiAction};

pub const MSG_NO_LOCATION: &str = "Cannot retrieve location";
pub const MSG_NO_DRIVERS: &str = "No cars available";
pub const MSG_SURGE: &str = "Confirmation in the provider app is required";
pub const MSG_INVALID_PRODUCT: &str = "Please reconfigure or reinstall the app";
pub const MSG_PROVIDER_ERROR: &str = "Ride service internal error";
pub const MSG_INTERNAL_ERROR: &str = "Internal server error";
pub const MSG_TRIP_CANCELED: &str = "Trip canceled";
pub const MSG_RECEIPT_ERROR: &str = "Error retrieving the receipt";

const TITLE_ALERT: &str = "Alert";
const TITLE_ERROR: &str = "Error";
const TITLE_SURGE: &str = "Surge pricing";

const TO_CHOOSE_LOCATION: UiAction = UiAction::ChangeScreen {
    screen: ScreenId::ChooseLocation,
};
const TO_COVER: UiAction = UiAction::ChangeScreen {
    screen: ScreenId::Cover,
};

/// Alert batch: title and message on the error screen, affordances,
/// then the alerting screen change.
pub fn alert(title: &str, message: &str, actions: &[(&str, UiAction)]) -> CommandBatch {
    let mut batch = CommandBatch::new();
    batch.push(Command::text(ScreenId::Error, element::ALERT_TITLE, title));
    batch.push(Command::text(ScreenId::Error, element::ALERT_MESSAGE, message));
    if !actions.is_empty() {
        let items = actions
            .iter()
            .enumerate()
            .map(|(id, (label, action))| ListItem::with_action(id as u8, *label, *action))
            .collect();
        batch.push(Command::SetList {
            items,
            ttl: Some(Ttl::ExpireOnScreenEnter),
        });
    }
    batch.push(Command::change_screen_alert(ScreenId::Error));
    batch
}

/// Device location required but absent.
pub fn missing_location() -> CommandBatch {
    alert(
        TITLE_ALERT,
        MSG_NO_LOCATION,
        &[("Choose location", TO_CHOOSE_LOCATION)],
    )
}

/// Surge confirmation gate: raised for the 409 surge error and for a
/// successful estimate whose multiplier is above 1.
pub fn surge_confirmation() -> CommandBatch {
    alert(
        TITLE_SURGE,
        MSG_SURGE,
        &[
            ("Retry", UiAction::Refresh),
            ("Choose location", TO_CHOOSE_LOCATION),
        ],
    )
}

pub fn no_drivers() -> CommandBatch {
    alert(
        TITLE_ALERT,
        MSG_NO_DRIVERS,
        &[("Choose location", TO_CHOOSE_LOCATION)],
    )
}

/// The configured product id is stale; only reconfiguring helps.
pub fn invalid_product() -> CommandBatch {
    alert(TITLE_ERROR, MSG_INVALID_PRODUCT, &[("Back", TO_COVER)])
}

/// Provider-side failure the wearer cannot act on.
pub fn provider_internal_error() -> CommandBatch {
    alert(TITLE_ERROR, MSG_PROVIDER_ERROR, &[("Dismiss", TO_COVER)])
}

/// Last-resort batch for failures outside the provider taxonomy.
pub fn internal_error() -> CommandBatch {
    alert(TITLE_ERROR, MSG_INTERNAL_ERROR, &[("Dismiss", TO_COVER)])
}

pub fn trip_canceled() -> CommandBatch {
    alert(
        TITLE_ALERT,
        MSG_TRIP_CANCELED,
        &[("Choose location", TO_CHOOSE_LOCATION)],
    )
}

pub fn receipt_unavailable() -> CommandBatch {
    alert(
        TITLE_ERROR,
        MSG_RECEIPT_ERROR,
        &[("Choose location", TO_CHOOSE_LOCATION)],
    )
}

/// First-match mapping from a classified provider failure.
pub fn provider_failure(error: &ProviderError) -> CommandBatch {
    match error {
        ProviderError::RateLimited => provider_internal_error(),
        ProviderError::NoDriversAvailable => no_drivers(),
        ProviderError::SurgeActive => surge_confirmation(),
        ProviderError::InvalidProduct => invalid_product(),
        ProviderError::Unavailable(_) => provider_internal_error(),
    }
}
