//! Settings Rendering
//!
//! Renders the product autocomplete the companion app shows while the
//! wearer configures the stream. Without a device location there are no
//! products to offer; the option list is simply empty.

use crate::{reject, AppState};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ride_provider::{GeoPoint, ProductOption};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Query parameters for the config endpoint.
#[derive(Debug, Deserialize)]
pub struct ConfigQuery {
    pub auth_token: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Rendered settings: one autocomplete of ride products.
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub product: ProductSetting,
}

#[derive(Debug, Serialize)]
pub struct ProductSetting {
    pub hint: String,
    pub options: Vec<ProductOption>,
}

pub async fn get_config(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ConfigQuery>,
) -> Response {
    let token = match params.auth_token.as_deref().filter(|t| !t.is_empty()) {
        Some(token) => token.to_string(),
        None => return reject(StatusCode::UNAUTHORIZED, "invalid auth tokens"),
    };

    let location = match (params.latitude, params.longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint {
            latitude,
            longitude,
        }),
        _ => None,
    };

    let engine = state.engine_for(&token);
    match engine.product_options(location).await {
        Ok(options) => Json(ConfigResponse {
            product: ProductSetting {
                hint: "Select the ride product you'd like to use.".to_string(),
                options,
            },
        })
        .into_response(),
        Err(err) => {
            warn!("config rendering failed: {}", err);
            reject(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}
