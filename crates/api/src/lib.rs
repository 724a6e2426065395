//! Ride Companion API Server
//!
//! Device-facing transport for the trip engine: a single invocation
//! endpoint dispatching on method name, a settings/config endpoint
//! rendering the product options, and a health probe. The transport
//! owns JSON shapes and the auth precondition; every decision lives in
//! the engine.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use place_lookup::{PlaceLookupConfig, PlacesClient};
use ride_provider::{ProviderConfig, RideClient};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use storage::LastTripRepository;
use tower_governor::GovernorLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use trip_engine::{EngineConfig, TripEngine};

pub mod rate_limit;
mod routes;

pub use rate_limit::RateLimitConfig;

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub provider: ProviderConfig,
    pub places: PlaceLookupConfig,
    pub engine: EngineConfig,
    pub rate_limit: RateLimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3090".to_string(),
            provider: ProviderConfig::default(),
            places: PlaceLookupConfig::default(),
            engine: EngineConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Application state shared across handlers.
///
/// Everything here is per-process and read-only; per-invocation state
/// (the rider's token) lives in the engine built for each request.
pub struct AppState {
    pub provider_config: ProviderConfig,
    pub engine_config: EngineConfig,
    pub places: PlacesClient,
    pub store: LastTripRepository,
    pub http: reqwest::Client,
    pub version: String,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        let http = reqwest::Client::new();
        Self {
            provider_config: config.provider.clone(),
            engine_config: config.engine.clone(),
            places: PlacesClient::with_client(http.clone(), config.places.clone()),
            store: LastTripRepository::new(),
            http,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Engine for one invocation, carrying that rider's bearer token.
    pub fn engine_for(&self, token: &str) -> TripEngine<RideClient, PlacesClient, LastTripRepository> {
        TripEngine::new(
            RideClient::with_client(self.http.clone(), &self.provider_config, token),
            self.places.clone(),
            self.store.clone(),
            self.engine_config.clone(),
        )
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub metrics: SystemMetrics,
}

/// System metrics
#[derive(Debug, Serialize)]
pub struct SystemMetrics {
    pub users_with_trips: usize,
}

/// Fixed reject body for precondition failures.
#[derive(Debug, Serialize)]
pub struct RejectBody {
    pub code: u16,
    pub message: String,
}

pub(crate) fn reject(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(RejectBody {
            code: status.as_u16(),
            message: message.to_string(),
        }),
    )
        .into_response()
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/device/invoke", post(routes::invoke::invoke))
        .route("/device/config", get(routes::settings::get_config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        metrics: SystemMetrics {
            users_with_trips: state.store.user_count(),
        },
    })
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Run the server
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(&config));
    let app = create_router(state).layer(GovernorLayer {
        config: config.rate_limit.governor(),
    });

    info!("Starting API server on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
