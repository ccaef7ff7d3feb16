// ============================================================================
// Academic Service
// ============================================================================
//
// Protected course catalog. Verifies session tokens with the shared secret
// and never issues them.
//
// ============================================================================

use anyhow::{Context, Result};
use aula_server::academic_service::{self, AcademicServiceContext};
use aula_server::auth::TokenService;
use aula_server::config::{logging::init_tracing, AcademicServiceConfig};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config =
        AcademicServiceConfig::from_env().context("Failed to load academic service configuration")?;

    // Initialize tracing
    init_tracing(&config.logging);

    info!("=== Academic Service Starting ===");
    info!("Port: {}", config.server.port);

    let verifier = Arc::new(
        TokenService::new(&config.token).context("Failed to initialize token service")?,
    );
    let app = academic_service::router(Arc::new(AcademicServiceContext::new(verifier)));

    // Start server
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Academic Service listening on {}", addr);

    aula_server::serve_with_shutdown(listener, app).await
}
