use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Fixed, unauthenticated liveness response for a backend service
pub async fn health_check(service_name: &'static str) -> Json<Value> {
    Json(json!({ "status": format!("{} OK", service_name) }))
}
