//! Ride Companion Service - Main Entry Point

use api::{init_logging, run_server, ServerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== Ride Companion Service v{} ===", env!("CARGO_PKG_VERSION"));

    let mut config = ServerConfig::default();
    if let Ok(addr) = std::env::var("BIND_ADDR") {
        config.bind_addr = addr;
    }
    if let Ok(key) = std::env::var("MAPS_API_KEY") {
        config.places.api_key = key;
    }
    // The sandbox provider is the default; production must be confirmed
    // explicitly.
    if std::env::var("CONFIRM_PROD").as_deref() == Ok("YES") {
        config.provider.sandbox = false;
        info!("Production provider API confirmed");
    }

    run_server(config).await
}
