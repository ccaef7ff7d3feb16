// ============================================================================
// Gateway Router
// ============================================================================
//
// Routes requests to upstream services by path prefix.
//
// Matching rules:
// - entries are scanned in declared order; the first prefix match wins
//   (with "/course" declared before "/courses", "/courses" goes to "/course")
// - matching is a plain string prefix test
// - the matched prefix is stripped, the rest of the path and the query are
//   appended to the upstream base URL
// - local routes (/health) are registered on the axum router and never
//   reach dispatch
//
// ============================================================================

use anyhow::Result;
use axum::{
    extract::{Request, State},
    middleware,
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::gateway::service_client::ReverseProxy;
use crate::routes::middleware::request_logging;

/// One routing table entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    path_prefix: String,
    upstream_base_url: String,
}

impl RouteEntry {
    pub fn new(path_prefix: impl Into<String>, upstream_base_url: impl Into<String>) -> Result<Self> {
        let path_prefix = path_prefix.into();
        let upstream_base_url = upstream_base_url.into();

        if !path_prefix.starts_with('/') {
            anyhow::bail!("Route prefix {:?} must start with '/'", path_prefix);
        }
        if !(upstream_base_url.starts_with("http://") || upstream_base_url.starts_with("https://"))
        {
            anyhow::bail!(
                "Upstream URL {:?} for {} must start with http:// or https://",
                upstream_base_url,
                path_prefix
            );
        }

        Ok(Self {
            path_prefix,
            upstream_base_url: upstream_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    pub fn upstream_base_url(&self) -> &str {
        &self.upstream_base_url
    }

    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.path_prefix)
    }

    /// Build the upstream URL for a request path under this entry's prefix
    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        let rest = path.strip_prefix(self.path_prefix.as_str()).unwrap_or(path);
        let rest = if rest.is_empty() {
            "/".to_string()
        } else if rest.starts_with('/') {
            rest.to_string()
        } else {
            format!("/{}", rest)
        };

        match query {
            Some(query) => format!("{}{}?{}", self.upstream_base_url, rest, query),
            None => format!("{}{}", self.upstream_base_url, rest),
        }
    }
}

/// Ordered, immutable routing table
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new(entries: Vec<RouteEntry>) -> Self {
        Self { entries }
    }

    /// First entry, in declared order, whose prefix matches `path`
    pub fn resolve(&self, path: &str) -> Option<&RouteEntry> {
        self.entries.iter().find(|entry| entry.matches(path))
    }
}

/// Gateway router state
pub struct GatewayState {
    pub routes: RouteTable,
    pub proxy: Arc<dyn ReverseProxy>,
}

impl GatewayState {
    pub fn new(routes: RouteTable, proxy: Arc<dyn ReverseProxy>) -> Arc<Self> {
        Arc::new(Self { routes, proxy })
    }
}

/// Route request to the matching upstream
pub async fn dispatch(
    State(state): State<Arc<GatewayState>>,
    request: Request,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();

    let entry = state.routes.resolve(&path).ok_or_else(|| {
        tracing::debug!(path = %path, "No route matches request path");
        AppError::RouteNotFound
    })?;
    let target = entry.target_url(&path, request.uri().query());

    tracing::debug!(
        method = %request.method(),
        path = %path,
        prefix = entry.path_prefix(),
        upstream = %target,
        "Forwarding request"
    );

    match state.proxy.forward(request, &target).await {
        Ok(response) => Ok(response),
        Err(e) => {
            tracing::error!(
                error = %e,
                prefix = entry.path_prefix(),
                upstream = %target,
                "Failed to forward request to upstream"
            );
            Err(AppError::upstream(e.to_string()))
        }
    }
}

/// Gateway liveness check, served locally
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "api-gateway OK" }))
}

/// Build the gateway application
pub fn router(state: Arc<GatewayState>) -> Router {
    Router::new()
        // Local routes take precedence over proxying
        .route("/health", get(health_check))
        .fallback(dispatch)
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
