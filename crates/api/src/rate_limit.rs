//! Rate Limiting for Device Invocations
//!
//! GCRA-based per-IP limiting via tower_governor. Companion devices
//! poll on a fixed cadence, so sustained traffic above one request per
//! second per device is a misbehaving client, not a usage spike.

use governor::middleware::StateInformationMiddleware;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;

/// Governor config keyed by peer IP, with X-RateLimit-* headers.
pub type DeviceGovernorConfig =
    tower_governor::governor::GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Seconds between replenished requests.
    pub per_second: u64,
    /// Requests a device may burst before throttling.
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: 1,
            burst_size: 8,
        }
    }
}

impl RateLimitConfig {
    /// Build the governor layer config.
    ///
    /// Requires the service to be built with
    /// `into_make_service_with_connect_info::<SocketAddr>()` so the
    /// peer IP is extractable.
    pub fn governor(&self) -> Arc<DeviceGovernorConfig> {
        Arc::new(
            GovernorConfigBuilder::default()
                .per_second(self.per_second)
                .burst_size(self.burst_size)
                .use_headers()
                .finish()
                .expect("rate limit config must have nonzero period and burst"),
        )
    }
}
