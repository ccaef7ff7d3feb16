use anyhow::Result;

use super::DEFAULT_TOKEN_TTL_SECS;

/// Session token signing configuration
#[derive(Clone)]
pub struct TokenConfig {
    /// Shared HS256 secret; every service that verifies tokens needs the same value
    pub secret: String,
    /// Token lifetime in seconds (default: 1 hour)
    pub ttl_secs: i64,
}

impl TokenConfig {
    pub(crate) fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        if secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must be set");
        }

        Ok(Self {
            secret,
            ttl_secs: std::env::var("TOKEN_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TOKEN_TTL_SECS),
        })
    }
}

// Manual impl so the secret never reaches logs
impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}
