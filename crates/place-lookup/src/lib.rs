//! Place Name Lookup
//!
//! Reverse lookup of a human-readable place name for a coordinate via a
//! maps provider. Lookup is best-effort: transport failures and empty
//! results degrade to a fixed fallback string and never fail the caller.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Fallback name when the lookup finds nothing.
pub const UNKNOWN_PLACE: &str = "Unknown place.";

/// Port the trip engine uses for place names.
#[async_trait]
pub trait PlaceDirectory: Send + Sync {
    /// Best display name for the coordinate; infallible by contract.
    async fn resolve_place_name(&self, latitude: f64, longitude: f64) -> String;
}

/// Maps API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceLookupConfig {
    pub base_url: String,
    pub api_key: String,
    /// Search radius around the coordinate (meters).
    pub radius_m: u32,
    pub timeout_secs: u64,
}

impl Default for PlaceLookupConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com/maps/api".to_string(),
            api_key: String::new(),
            radius_m: 10,
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Error)]
enum LookupError {
    #[error("maps request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("maps responded with status {0}")]
    Status(u16),
}

/// Maps-provider client: nearby route search, then place details.
#[derive(Clone)]
pub struct PlacesClient {
    http: reqwest::Client,
    config: PlaceLookupConfig,
}

impl PlacesClient {
    pub fn new(config: PlaceLookupConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Reuse an existing connection pool.
    pub fn with_client(http: reqwest::Client, config: PlaceLookupConfig) -> Self {
        Self { http, config }
    }

    async fn lookup(&self, latitude: f64, longitude: f64) -> Result<Option<String>, LookupError> {
        let nearby: NearbySearch = self
            .get(
                "place/nearbysearch/json",
                &[
                    ("key", self.config.api_key.clone()),
                    ("location", format!("{},{}", latitude, longitude)),
                    ("radius", self.config.radius_m.to_string()),
                    ("types", "route".to_string()),
                ],
            )
            .await?;

        let place_id = match first_place_id(nearby) {
            Some(id) => id,
            None => return Ok(None),
        };

        let details: PlaceDetails = self
            .get(
                "place/details/json",
                &[
                    ("key", self.config.api_key.clone()),
                    ("placeid", place_id),
                ],
            )
            .await?;
        Ok(details.result.map(|r| r.name))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, LookupError> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        let response = self
            .http
            .get(url)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl PlaceDirectory for PlacesClient {
    async fn resolve_place_name(&self, latitude: f64, longitude: f64) -> String {
        match self.lookup(latitude, longitude).await {
            Ok(Some(name)) => name,
            Ok(None) => UNKNOWN_PLACE.to_string(),
            Err(err) => {
                warn!("place lookup degraded to fallback: {}", err);
                UNKNOWN_PLACE.to_string()
            }
        }
    }
}

fn first_place_id(search: NearbySearch) -> Option<String> {
    search.results.into_iter().next().map(|r| r.place_id)
}

#[derive(Debug, Deserialize)]
struct NearbySearch {
    #[serde(default)]
    results: Vec<NearbyResult>,
}

#[derive(Debug, Deserialize)]
struct NearbyResult {
    place_id: String,
}

#[derive(Debug, Deserialize)]
struct PlaceDetails {
    #[serde(default)]
    result: Option<DetailsResult>,
}

#[derive(Debug, Deserialize)]
struct DetailsResult {
    name: String,
}
