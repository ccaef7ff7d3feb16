use std::path::PathBuf;

/// Where the identity service loads its credential records from
#[derive(Clone, Debug)]
pub struct CredentialsConfig {
    /// JSON file with pre-hashed credential records (optional)
    pub file: Option<PathBuf>,
    /// bcrypt cost used for the timing-equalization dummy hash
    pub bcrypt_cost: u32,
}

impl CredentialsConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            file: std::env::var("CREDENTIALS_FILE")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            bcrypt_cost: std::env::var("BCRYPT_COST")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or(bcrypt::DEFAULT_COST),
        }
    }
}
