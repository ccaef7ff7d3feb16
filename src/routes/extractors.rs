// ============================================================================
// Axum Extractors
// ============================================================================
//
// - AuthenticatedUser: identity attached by the require_auth middleware
// - bearer_token: strict "Bearer <token>" parsing of the Authorization header
//
// ============================================================================

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::auth::Identity;
use crate::error::AppError;

/// Identity of the caller, available to handlers behind `require_auth`
///
/// Usage:
/// ```rust,ignore
/// async fn handler(user: AuthenticatedUser) -> impl IntoResponse {
///     let identity = user.0;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Handlers mounted without the middleware never see an identity
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::MissingCredentials)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The scheme is case-sensitive and must be followed by exactly one space.
/// Every other shape, extra whitespace included, counts as no token at all.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty() && !token.starts_with(char::is_whitespace))
}
