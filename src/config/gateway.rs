// ============================================================================
// Gateway Configuration
// ============================================================================
//
// Routing table format (GATEWAY_ROUTES), order preserved:
//   /auth=http://users-service:3001,/courses=http://academic-service:3002
//
// Without GATEWAY_ROUTES the table is built from USERS_SERVICE_URL (/auth)
// and ACADEMIC_SERVICE_URL (/courses).
//
// ============================================================================

use anyhow::{Context, Result};

use super::{
    DEFAULT_ACADEMIC_SERVICE_URL, DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS,
    DEFAULT_UPSTREAM_IDLE_TIMEOUT_SECS, DEFAULT_UPSTREAM_TIMEOUT_SECS, DEFAULT_USERS_SERVICE_URL,
};
use crate::gateway::RouteEntry;

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Ordered routing table; first matching prefix wins
    pub routes: Vec<RouteEntry>,
    /// Time allowed for an upstream to return response headers (default: 30)
    pub upstream_timeout_secs: u64,
    /// Time allowed to establish an upstream connection (default: 5)
    pub connect_timeout_secs: u64,
    /// Longest gap between two upstream response body chunks (default: 30)
    pub idle_timeout_secs: u64,
}

impl GatewayConfig {
    pub(crate) fn from_env() -> Result<Self> {
        let routes = match std::env::var("GATEWAY_ROUTES") {
            Ok(raw) => parse_routes(&raw).context("Invalid GATEWAY_ROUTES")?,
            Err(_) => vec![
                RouteEntry::new(
                    "/auth",
                    std::env::var("USERS_SERVICE_URL")
                        .unwrap_or_else(|_| DEFAULT_USERS_SERVICE_URL.to_string()),
                )?,
                RouteEntry::new(
                    "/courses",
                    std::env::var("ACADEMIC_SERVICE_URL")
                        .unwrap_or_else(|_| DEFAULT_ACADEMIC_SERVICE_URL.to_string()),
                )?,
            ],
        };

        Ok(Self {
            routes,
            upstream_timeout_secs: std::env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            connect_timeout_secs: std::env::var("UPSTREAM_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS),
            idle_timeout_secs: std::env::var("UPSTREAM_IDLE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_UPSTREAM_IDLE_TIMEOUT_SECS),
        })
    }
}

/// Parse a comma-separated `prefix=url` list into an ordered routing table
pub fn parse_routes(raw: &str) -> Result<Vec<RouteEntry>> {
    let mut routes = Vec::new();

    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (prefix, url) = pair
            .split_once('=')
            .with_context(|| format!("Route {:?} must have the form prefix=url", pair))?;
        routes.push(RouteEntry::new(prefix.trim(), url.trim())?);
    }

    if routes.is_empty() {
        anyhow::bail!("Routing table is empty");
    }

    Ok(routes)
}
