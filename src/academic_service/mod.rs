// ============================================================================
// Academic Service
// ============================================================================
//
// Protected resource service. Holds only the verifying side of the token
// service; every route except /health requires a bearer token.
//
// ============================================================================

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::auth::TokenVerifier;
use crate::routes::{self, request_logging, require_auth};

pub const SERVICE_NAME: &str = "academic-service";

/// Academic Service context
pub struct AcademicServiceContext {
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AcademicServiceContext {
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { verifier }
    }
}

/// Build the academic service application
pub fn router(ctx: Arc<AcademicServiceContext>) -> Router {
    let protected = Router::new()
        .route("/", get(routes::courses::list_courses))
        .route("/:id", get(routes::courses::get_course))
        .route_layer(middleware::from_fn_with_state(
            ctx.verifier.clone(),
            require_auth,
        ));

    Router::new()
        .route(
            "/health",
            get(|| routes::health::health_check(SERVICE_NAME)),
        )
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_logging))
                .into_inner(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Identity, Role, TokenService};
    use crate::routes::courses::Course;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::Duration;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::from_secret(b"test-secret", Duration::hours(1)))
    }

    fn app(tokens: Arc<TokenService>) -> Router {
        router(Arc::new(AcademicServiceContext::new(tokens)))
    }

    fn admin() -> Identity {
        Identity {
            id: 1,
            email: "admin@test.cl".to_string(),
            role: Role::Admin,
        }
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_list_courses_with_valid_token() {
        let tokens = tokens();
        let token = tokens.issue(&admin()).unwrap();

        let response = app(tokens).oneshot(get("/", Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let courses: Vec<Course> = serde_json::from_value(body).unwrap();
        assert_eq!(courses, routes::courses::catalog());
    }

    #[tokio::test]
    async fn test_list_courses_without_token() {
        let response = app(tokens()).oneshot(get("/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = json_body(response).await;
        assert_eq!(body["error"], "No credentials supplied");
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_rejected() {
        let other = TokenService::from_secret(b"other-secret", Duration::hours(1));
        let token = other.issue(&admin()).unwrap();

        let response = app(tokens()).oneshot(get("/", Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = json_body(response).await;
        assert_eq!(body["error"], "Invalid token");
    }

    #[tokio::test]
    async fn test_get_course_by_id() {
        let tokens = tokens();
        let token = tokens.issue(&admin()).unwrap();

        let response = app(tokens.clone())
            .oneshot(get("/2", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let course: Course = serde_json::from_value(json_body(response).await).unwrap();
        assert_eq!(course.id, 2);

        let response = app(tokens).oneshot(get("/99", Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_course_requires_auth_first() {
        let response = app(tokens()).oneshot(get("/99", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let response = app(tokens()).oneshot(get("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "academic-service OK");
    }
}
