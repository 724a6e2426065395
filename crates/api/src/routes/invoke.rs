//! Device Invocation Dispatch
//!
//! One endpoint for every named remote method the device calls. The
//! invocation tuple carries the method name, loose arguments, the
//! rider's auth token, user settings, and the device location.

use crate::{reject, AppState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ride_provider::GeoPoint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use trip_engine::{InvocationContext, PickupSource, TripStatus};
use ui_protocol::Command;
use uuid::Uuid;

/// User-settings key holding the selected ride product id.
const PRODUCT_SETTING: &str = "Product";

/// Invocation tuple from the device transport.
#[derive(Debug, Deserialize)]
pub struct InvokeRequest {
    pub method: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub user_settings: HashMap<String, String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

/// Ordered command batch returned to the device.
#[derive(Debug, Serialize)]
pub struct InvokeResponse {
    pub commands: Vec<Command>,
}

pub async fn invoke(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InvokeRequest>,
) -> Response {
    let token = match request.auth_token.as_deref().filter(|t| !t.is_empty()) {
        Some(token) => token.to_string(),
        None => return reject(StatusCode::UNAUTHORIZED, "invalid auth tokens"),
    };

    let invocation_id = Uuid::new_v4();
    debug!("device invocation {}: {}", invocation_id, request.method);

    let engine = state.engine_for(&token);
    let ctx = InvocationContext {
        location: request.location,
        product_id: request.user_settings.get(PRODUCT_SETTING).cloned(),
    };

    let batch = match request.method.as_str() {
        "loadChooseLocation" => engine.load_choose_location().await,
        "estimate" => {
            engine
                .estimate(pickup_source(&request.arguments), &ctx)
                .await
        }
        "requestRide" => {
            engine
                .request_ride(pickup_source(&request.arguments), &ctx)
                .await
        }
        "cancelRideRequest" => engine.cancel_ride().await,
        "getSearchingUpdates" => engine.poll_status(TripStatus::Processing).await,
        "getArrivingUpdates" => engine.poll_status(TripStatus::Accepted).await,
        "getReadyUpdates" => engine.poll_status(TripStatus::Arriving).await,
        "getTripUpdates" => engine.poll_status(TripStatus::InProgress).await,
        other => {
            return reject(
                StatusCode::BAD_REQUEST,
                &format!("invalid method name: {}", other),
            )
        }
    };

    (
        StatusCode::OK,
        Json(InvokeResponse {
            commands: batch.into_commands(),
        }),
    )
        .into_response()
}

/// The choose-location list reports the selected row id.
fn pickup_source(arguments: &serde_json::Value) -> PickupSource {
    arguments
        .get("id")
        .and_then(|value| value.as_u64())
        .map(|id| PickupSource::from_wire(id as u8))
        .unwrap_or(PickupSource::Locate)
}
