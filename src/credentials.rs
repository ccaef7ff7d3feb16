// ============================================================================
// Credential Store
// ============================================================================
//
// The identity service only ever asks one question of user storage:
// "which record belongs to this email?". Storage technology lives behind
// the CredentialStore trait; InMemoryCredentialStore backs the binary and
// the tests.
//
// ============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::auth::{Identity, Role};

/// A stored user: public identity plus bcrypt password hash
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub email: String,
    pub password_hash: String,
    pub identity: Identity,
}

impl CredentialRecord {
    pub fn verify_password(&self, password: &str) -> Result<bool> {
        Ok(bcrypt::verify(password, &self.password_hash)?)
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up the record for an exact email
    async fn lookup(&self, email: &str) -> Result<Option<CredentialRecord>>;
}

/// On-disk shape of a credential record (CREDENTIALS_FILE)
#[derive(Debug, Deserialize)]
struct CredentialFileEntry {
    id: i64,
    email: String,
    password_hash: String,
    role: Role,
}

/// Read-only credential store built once at startup
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    records: HashMap<String, CredentialRecord>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = CredentialRecord>) -> Result<Self> {
        let mut store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    /// Load records with pre-hashed passwords from a JSON array
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file {}", path.display()))?;
        let entries: Vec<CredentialFileEntry> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse credentials file {}", path.display()))?;

        Self::from_records(entries.into_iter().map(|entry| CredentialRecord {
            email: entry.email.clone(),
            password_hash: entry.password_hash,
            identity: Identity {
                id: entry.id,
                email: entry.email,
                role: entry.role,
            },
        }))
    }

    /// Add a user, hashing the plaintext password with the given bcrypt cost
    pub fn with_user(
        mut self,
        id: i64,
        email: &str,
        password: &str,
        role: Role,
        cost: u32,
    ) -> Result<Self> {
        let password_hash = bcrypt::hash(password, cost).context("Failed to hash password")?;
        self.insert(CredentialRecord {
            email: email.to_string(),
            password_hash,
            identity: Identity {
                id,
                email: email.to_string(),
                role,
            },
        })?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn insert(&mut self, record: CredentialRecord) -> Result<()> {
        if self.records.contains_key(&record.email) {
            anyhow::bail!("Duplicate credential record for {}", record.email);
        }
        self.records.insert(record.email.clone(), record);
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn lookup(&self, email: &str) -> Result<Option<CredentialRecord>> {
        Ok(self.records.get(email).cloned())
    }
}
