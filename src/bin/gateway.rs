// ============================================================================
// API Gateway
// ============================================================================
//
// Single entry point for client requests. Forwards by path prefix to the
// identity and academic services; token checks happen upstream.
//
// ============================================================================

use anyhow::{Context, Result};
use aula_server::config::{logging::init_tracing, GatewayServiceConfig};
use aula_server::gateway::{self, GatewayState, RouteTable, ServiceClient};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = GatewayServiceConfig::from_env().context("Failed to load gateway configuration")?;

    // Initialize tracing
    init_tracing(&config.logging);

    info!("=== API Gateway Starting ===");
    info!("Port: {}", config.server.port);
    for entry in &config.gateway.routes {
        info!(
            prefix = entry.path_prefix(),
            upstream = entry.upstream_base_url(),
            "Route registered"
        );
    }
    info!(
        response_timeout_secs = config.gateway.upstream_timeout_secs,
        connect_timeout_secs = config.gateway.connect_timeout_secs,
        idle_timeout_secs = config.gateway.idle_timeout_secs,
        "Upstream timeouts"
    );

    // Initialize forwarding client
    let client = ServiceClient::new(&config.gateway).context("Failed to create upstream client")?;

    let state = GatewayState::new(
        RouteTable::new(config.gateway.routes.clone()),
        Arc::new(client),
    );
    let app = gateway::router(state);

    // Start server
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("API Gateway listening on {}", addr);

    aula_server::serve_with_shutdown(listener, app).await
}
