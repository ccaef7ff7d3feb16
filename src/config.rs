// ============================================================================
// Configuration
// ============================================================================
//
// Every service builds its configuration once at startup from the
// environment (after loading an optional .env file) and hands immutable
// pieces to the components that need them.
//
// ============================================================================

mod credentials;
mod gateway;
pub mod logging;
mod server;
mod token;

pub use credentials::CredentialsConfig;
pub use gateway::{parse_routes, GatewayConfig};
pub use logging::LoggingConfig;
pub use server::ServerConfig;
pub use token::TokenConfig;

use anyhow::Result;

// Default port values (one per service so they can share a host in development)
pub const DEFAULT_GATEWAY_PORT: u16 = 3000;
pub const DEFAULT_USERS_SERVICE_PORT: u16 = 3001;
pub const DEFAULT_ACADEMIC_SERVICE_PORT: u16 = 3002;

// Default upstream URLs used when GATEWAY_ROUTES is not set
pub(crate) const DEFAULT_USERS_SERVICE_URL: &str = "http://localhost:3001";
pub(crate) const DEFAULT_ACADEMIC_SERVICE_URL: &str = "http://localhost:3002";

// Token lifetime
pub(crate) const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

// Upstream timeouts (in seconds)
pub(crate) const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;
pub(crate) const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 5;
pub(crate) const DEFAULT_UPSTREAM_IDLE_TIMEOUT_SECS: u64 = 30;

/// Configuration for the API gateway binary
#[derive(Clone, Debug)]
pub struct GatewayServiceConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub gateway: GatewayConfig,
}

impl GatewayServiceConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env(DEFAULT_GATEWAY_PORT)?,
            logging: LoggingConfig::from_env(),
            gateway: GatewayConfig::from_env()?,
        })
    }
}

/// Configuration for the identity (users) service binary
#[derive(Clone, Debug)]
pub struct UsersServiceConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub token: TokenConfig,
    pub credentials: CredentialsConfig,
}

impl UsersServiceConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env(DEFAULT_USERS_SERVICE_PORT)?,
            logging: LoggingConfig::from_env(),
            token: TokenConfig::from_env()?,
            credentials: CredentialsConfig::from_env(),
        })
    }
}

/// Configuration for the academic (resource) service binary
#[derive(Clone, Debug)]
pub struct AcademicServiceConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub token: TokenConfig,
}

impl AcademicServiceConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env(DEFAULT_ACADEMIC_SERVICE_PORT)?,
            logging: LoggingConfig::from_env(),
            token: TokenConfig::from_env()?,
        })
    }
}
