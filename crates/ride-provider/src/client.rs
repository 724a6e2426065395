//! Ride Provider REST Client
//!
//! One client instance per device invocation: it carries that rider's
//! bearer token. The reqwest connection pool is shared by cloning the
//! inner `reqwest::Client`.

use crate::error::ProviderError;
use crate::types::{
    GeoPoint, Place, PlaceId, Product, ProductOption, Profile, Receipt, RideEstimate, SavedPlaces,
    TripRecord,
};
use crate::RideProvider;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Ride provider client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Production API root.
    pub base_url: String,
    /// Sandbox API root, used until production is explicitly confirmed.
    pub sandbox_url: String,
    /// Route calls to the sandbox.
    pub sandbox: bool,
    /// Per-request timeout (seconds).
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.uber.com".to_string(),
            sandbox_url: "https://sandbox-api.uber.com".to_string(),
            sandbox: true,
            timeout_secs: 10,
        }
    }
}

impl ProviderConfig {
    fn root(&self) -> &str {
        if self.sandbox {
            &self.sandbox_url
        } else {
            &self.base_url
        }
    }
}

/// Typed client for the ride provider REST API.
#[derive(Clone)]
pub struct RideClient {
    http: reqwest::Client,
    root: String,
    token: String,
}

impl RideClient {
    /// Build a client with its own connection pool.
    pub fn new(
        config: &ProviderConfig,
        access_token: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(http, config, access_token))
    }

    /// Reuse an existing connection pool (one per process).
    pub fn with_client(
        http: reqwest::Client,
        config: &ProviderConfig,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            root: config.root().trim_end_matches('/').to_string(),
            token: access_token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.root, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        debug!("GET {}", path);
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        decode(response).await
    }

    async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        absent_code: &str,
    ) -> Result<Option<T>, ProviderError> {
        debug!("GET {}", path);
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        decode_optional(response, absent_code).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ProviderError> {
        debug!("POST {}", path);
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }
}

#[async_trait]
impl RideProvider for RideClient {
    async fn current_trip(&self) -> Result<Option<TripRecord>, ProviderError> {
        self.get_optional("/v1/requests/current", "no_current_trip")
            .await
    }

    async fn trip_details(&self, trip_id: &str) -> Result<TripRecord, ProviderError> {
        self.get_json(&format!("/v1/requests/{}", trip_id)).await
    }

    async fn trip_receipt(&self, trip_id: &str) -> Result<Receipt, ProviderError> {
        self.get_json(&format!("/v1/requests/{}/receipt", trip_id))
            .await
    }

    async fn estimate_by_location(
        &self,
        product_id: &str,
        pickup: GeoPoint,
    ) -> Result<RideEstimate, ProviderError> {
        self.post_json(
            "/v1/requests/estimate",
            json!({
                "product_id": product_id,
                "start_latitude": pickup.latitude,
                "start_longitude": pickup.longitude,
            }),
        )
        .await
    }

    async fn estimate_by_place(
        &self,
        product_id: &str,
        place: PlaceId,
    ) -> Result<RideEstimate, ProviderError> {
        self.post_json(
            "/v1/requests/estimate",
            json!({
                "product_id": product_id,
                "start_place_id": place.as_str(),
            }),
        )
        .await
    }

    async fn request_at_location(
        &self,
        product_id: &str,
        pickup: GeoPoint,
    ) -> Result<TripRecord, ProviderError> {
        self.post_json(
            "/v1/requests",
            json!({
                "product_id": product_id,
                "start_latitude": pickup.latitude,
                "start_longitude": pickup.longitude,
            }),
        )
        .await
    }

    async fn request_at_place(
        &self,
        product_id: &str,
        place: PlaceId,
    ) -> Result<TripRecord, ProviderError> {
        self.post_json(
            "/v1/requests",
            json!({
                "product_id": product_id,
                "start_place_id": place.as_str(),
            }),
        )
        .await
    }

    async fn cancel_trip(&self, trip_id: &str) -> Result<(), ProviderError> {
        let path = format!("/v1/requests/{}", trip_id);
        debug!("DELETE {}", path);
        let response = self
            .http
            .delete(self.url(&path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        expect_no_content(response).await
    }

    async fn product_details(&self, product_id: &str) -> Result<Product, ProviderError> {
        self.get_json(&format!("/v1/products/{}", product_id)).await
    }

    async fn place(&self, place: PlaceId) -> Result<Option<Place>, ProviderError> {
        self.get_optional(&format!("/v1/places/{}", place.as_str()), "unknown_place_id")
            .await
    }

    async fn available_places(&self) -> Result<SavedPlaces, ProviderError> {
        let (home, work) = tokio::try_join!(self.place(PlaceId::Home), self.place(PlaceId::Work))?;
        Ok(SavedPlaces { home, work })
    }

    async fn profile(&self) -> Result<Profile, ProviderError> {
        self.get_json("/v1/me").await
    }

    async fn products_for_location(
        &self,
        location: GeoPoint,
    ) -> Result<Vec<ProductOption>, ProviderError> {
        debug!("GET /v1/products");
        let response = self
            .http
            .get(self.url("/v1/products"))
            .bearer_auth(&self.token)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
            ])
            .send()
            .await?;
        let listing: ProductListing = decode(response).await?;
        Ok(listing.products)
    }
}

#[derive(Debug, Deserialize)]
struct ProductListing {
    #[serde(default)]
    products: Vec<ProductOption>,
}

/// Error payload shape the provider returns on non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    code: Option<String>,
}

impl ApiErrorBody {
    fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
            || self.errors.iter().any(|e| e.code.as_deref() == Some(code))
    }
}

fn classify(status: StatusCode, body: &ApiErrorBody) -> ProviderError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited,
        StatusCode::CONFLICT if body.has_code("surge") => ProviderError::SurgeActive,
        StatusCode::CONFLICT => ProviderError::NoDriversAvailable,
        StatusCode::NOT_FOUND if body.has_code("not_found") => ProviderError::InvalidProduct,
        _ => ProviderError::Unavailable(format!("unexpected status {}", status)),
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("malformed response: {}", e)));
    }

    let body = response.json::<ApiErrorBody>().await.unwrap_or_default();
    Err(classify(status, &body))
}

async fn decode_optional<T: DeserializeOwned>(
    response: reqwest::Response,
    absent_code: &str,
) -> Result<Option<T>, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| ProviderError::Unavailable(format!("malformed response: {}", e)));
    }

    let body = response.json::<ApiErrorBody>().await.unwrap_or_default();
    if status == StatusCode::NOT_FOUND && body.has_code(absent_code) {
        return Ok(None);
    }
    Err(classify(status, &body))
}

async fn expect_no_content(response: reqwest::Response) -> Result<(), ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.json::<ApiErrorBody>().await.unwrap_or_default();
    Err(classify(status, &body))
}
