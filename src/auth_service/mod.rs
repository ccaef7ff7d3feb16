// ============================================================================
// Auth Service (users-service)
// ============================================================================
//
// Identity service: owns the credential store and the signing side of the
// token service.
// - POST /login exchanges credentials for a session token
// - GET  /me    echoes the caller's identity (protected)
// - GET  /health
//
// ============================================================================

use anyhow::{Context, Result};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::{Identity, TokenService, TokenVerifier};
use crate::credentials::CredentialStore;
use crate::error::{AppError, AppResult};
use crate::routes::{self, request_logging, require_auth};

pub const SERVICE_NAME: &str = "users-service";

// Plaintext of the dummy hash; never matches a real login attempt's hash
const DUMMY_PASSWORD: &str = "timing-equalization-placeholder";

/// Auth Service context
pub struct AuthServiceContext {
    pub tokens: Arc<TokenService>,
    pub credentials: Arc<dyn CredentialStore>,
    /// bcrypt hash verified when the email is unknown, so both failure paths cost the same
    dummy_hash: String,
}

impl AuthServiceContext {
    pub fn new(
        tokens: Arc<TokenService>,
        credentials: Arc<dyn CredentialStore>,
        bcrypt_cost: u32,
    ) -> Result<Self> {
        let dummy_hash =
            bcrypt::hash(DUMMY_PASSWORD, bcrypt_cost).context("Failed to compute dummy hash")?;

        Ok(Self {
            tokens,
            credentials,
            dummy_hash,
        })
    }

    /// Exchange an email and password for a session token.
    ///
    /// Missing fields, unknown email and wrong password all fail with
    /// [`AppError::InvalidCredentials`].
    pub async fn authenticate(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> AppResult<String> {
        let (email, password) = match (
            email.filter(|e| !e.is_empty()),
            password.filter(|p| !p.is_empty()),
        ) {
            (Some(email), Some(password)) => (email, password),
            _ => {
                tracing::debug!("Login rejected: email or password missing");
                return Err(AppError::InvalidCredentials);
            }
        };

        let record = self.credentials.lookup(email).await.map_err(|e| {
            tracing::error!(error = %e, "Credential store lookup failed");
            AppError::Unknown(e)
        })?;

        let password = password.to_string();
        let dummy_hash = self.dummy_hash.clone();
        let verified = tokio::task::spawn_blocking(move || -> Result<Option<Identity>> {
            match record {
                Some(record) => {
                    let matches = record.verify_password(&password)?;
                    Ok(matches.then_some(record.identity))
                }
                None => {
                    bcrypt::verify(&password, &dummy_hash)?;
                    Ok(None)
                }
            }
        })
        .await
        .map_err(|e| AppError::internal(format!("Password check task failed: {}", e)))?
        .unwrap_or_else(|e| {
            // Corrupt stored hash: log it, but answer like any other failure
            tracing::error!(error = %e, "Stored password hash could not be verified");
            None
        });

        let identity = verified.ok_or_else(|| {
            tracing::debug!("Login rejected: invalid credentials");
            AppError::InvalidCredentials
        })?;

        let token = self.tokens.issue(&identity)?;
        tracing::info!(user_id = identity.id, role = %identity.role, "User logged in");

        Ok(token)
    }
}

/// Build the identity service application
pub fn router(ctx: Arc<AuthServiceContext>) -> Router {
    let verifier: Arc<dyn TokenVerifier> = ctx.tokens.clone();

    let protected = Router::new()
        .route("/me", get(routes::auth::me))
        .route_layer(middleware::from_fn_with_state(verifier, require_auth));

    Router::new()
        .route(
            "/health",
            get(|| routes::health::health_check(SERVICE_NAME)),
        )
        .route("/login", post(routes::auth::login))
        .merge(protected)
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
