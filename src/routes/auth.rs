// ============================================================================
// Authentication Routes
// ============================================================================
//
// Endpoints (identity service):
// - POST /login - Exchange email + password for a session token
// - GET  /me    - Identity carried by the presented token (protected)
//
// ============================================================================

use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::Identity;
use crate::auth_service::AuthServiceContext;
use crate::error::AppError;
use crate::routes::extractors::AuthenticatedUser;

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /login
///
/// The body is parsed leniently: anything that is not a JSON object with
/// both fields is treated as missing credentials, which fails with the same
/// 401 as a wrong password.
pub async fn login(
    State(ctx): State<Arc<AuthServiceContext>>,
    body: Bytes,
) -> Result<Json<LoginResponse>, AppError> {
    let request: LoginRequest = serde_json::from_slice(&body).unwrap_or_default();

    let token = ctx
        .authenticate(request.email.as_deref(), request.password.as_deref())
        .await?;

    Ok(Json(LoginResponse { token }))
}

/// GET /me
pub async fn me(user: AuthenticatedUser) -> Json<Identity> {
    Json(user.0)
}
