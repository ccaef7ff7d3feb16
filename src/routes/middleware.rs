// ============================================================================
// Axum Middleware
// ============================================================================
//
// Middleware shared by every service:
// - request_logging: Log all incoming requests
// - require_auth: Bearer token guard for protected routes
//
// ============================================================================

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use crate::auth::TokenVerifier;
use crate::error::AppError;
use crate::routes::extractors::{bearer_token, AuthenticatedUser};

/// Request logging middleware
pub async fn request_logging(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    tracing::debug!(
        method = %method,
        path = %path,
        "Incoming request"
    );

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        path = %path,
        status = %status.as_u16(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

/// Bearer token authentication middleware
///
/// Mount with `route_layer(middleware::from_fn_with_state(verifier, require_auth))`
/// in front of protected routes. On success the caller's identity is stored in
/// the request extensions as [`AuthenticatedUser`].
///
/// Rejections are deliberately coarse:
/// - no usable `Bearer <token>` header → 401 "No credentials supplied"
/// - any verification failure → 401 "Invalid token"
pub async fn require_auth(
    State(verifier): State<Arc<dyn TokenVerifier>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = {
        let token = bearer_token(request.headers()).ok_or_else(|| {
            tracing::debug!(path = %request.uri().path(), "Missing bearer token");
            AppError::MissingCredentials
        })?;

        verifier.verify(token).map_err(|e| {
            tracing::debug!(
                path = %request.uri().path(),
                reason = %e,
                "Token verification failed"
            );
            AppError::InvalidToken(e)
        })?
    };

    request.extensions_mut().insert(AuthenticatedUser(identity));

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Identity, Role, TokenService};
    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, StatusCode},
        middleware,
        routing::get,
        Json, Router,
    };
    use chrono::{Duration, Utc};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn tokens(secret: &str) -> TokenService {
        TokenService::from_secret(secret.as_bytes(), Duration::hours(1))
    }

    fn admin() -> Identity {
        Identity {
            id: 1,
            email: "admin@test.cl".to_string(),
            role: Role::Admin,
        }
    }

    fn protected_app() -> Router {
        let verifier: Arc<dyn TokenVerifier> = Arc::new(tokens("test-secret"));
        Router::new()
            .route(
                "/",
                get(|user: AuthenticatedUser| async move { Json(user.0) }),
            )
            .route_layer(middleware::from_fn_with_state(verifier, require_auth))
            .route("/health", get(|| async { "ok" }))
    }

    async fn call(authorization: Option<String>) -> (StatusCode, Value) {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = protected_app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_valid_token_attaches_identity() {
        let token = tokens("test-secret").issue(&admin()).unwrap();
        let (status, body) = call(Some(format!("Bearer {}", token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "admin@test.cl");
        assert_eq!(body["role"], "admin");
        assert_eq!(body["id"], 1);
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let (status, body) = call(None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "No credentials supplied");
    }

    #[tokio::test]
    async fn test_header_without_bearer_scheme_is_unauthorized() {
        let token = tokens("test-secret").issue(&admin()).unwrap();

        for value in [
            token.clone(),
            format!("bearer {}", token),
            format!("Token {}", token),
            format!("Bearer  {}", token),
        ] {
            let (status, body) = call(Some(value)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["error"], "No credentials supplied");
        }
    }

    #[tokio::test]
    async fn test_garbage_token_is_invalid() {
        let (status, body) = call(Some("Bearer esto.no.es.un.jwt".to_string())).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid token");
    }

    #[tokio::test]
    async fn test_verification_failures_are_indistinguishable() {
        let wrong_secret = tokens("wrong-secret").issue(&admin()).unwrap();
        let expired = tokens("test-secret")
            .issue_at(&admin(), Utc::now() - Duration::hours(2))
            .unwrap();

        let mut bodies = Vec::new();
        for token in [wrong_secret, expired, "x.y.z".to_string()] {
            let (status, body) = call(Some(format!("Bearer {}", token))).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            bodies.push(body);
        }
        assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(bodies[0]["error"], "Invalid token");
    }

    #[tokio::test]
    async fn test_unprotected_route_skips_middleware() {
        let response = protected_app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_extractor_without_middleware_is_unauthorized() {
        let app = Router::new().route(
            "/",
            get(|user: AuthenticatedUser| async move { Json(user.0) }),
        );
        let response = app
            .oneshot(axum::http::Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
