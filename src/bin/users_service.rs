// ============================================================================
// Users Service
// ============================================================================
//
// Identity service: verifies credentials and issues session tokens.
// Credential records are loaded once at startup from CREDENTIALS_FILE.
//
// ============================================================================

use anyhow::{Context, Result};
use aula_server::auth::TokenService;
use aula_server::auth_service::{self, AuthServiceContext};
use aula_server::config::{logging::init_tracing, UsersServiceConfig};
use aula_server::credentials::InMemoryCredentialStore;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = UsersServiceConfig::from_env().context("Failed to load users service configuration")?;

    // Initialize tracing
    init_tracing(&config.logging);

    info!("=== Users Service Starting ===");
    info!("Port: {}", config.server.port);

    // Load credentials
    let store = match &config.credentials.file {
        Some(path) => {
            let store = InMemoryCredentialStore::from_json_file(path)
                .with_context(|| format!("Failed to load credentials from {}", path.display()))?;
            info!(path = %path.display(), users = store.len(), "Credentials loaded");
            store
        }
        None => {
            warn!("CREDENTIALS_FILE is not set. Every login will be rejected.");
            InMemoryCredentialStore::new()
        }
    };

    let tokens = Arc::new(
        TokenService::new(&config.token).context("Failed to initialize token service")?,
    );
    info!(ttl_secs = tokens.ttl().num_seconds(), "Token service ready");

    let context = Arc::new(
        AuthServiceContext::new(tokens, Arc::new(store), config.credentials.bcrypt_cost)
            .context("Failed to create service context")?,
    );
    let app = auth_service::router(context);

    // Start server
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Users Service listening on {}", addr);

    aula_server::serve_with_shutdown(listener, app).await
}
