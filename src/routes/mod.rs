// ============================================================================
// HTTP Routes
// ============================================================================
//
// Handlers and middleware shared by the backend services. Each service
// assembles its own Router from these pieces (see auth_service and
// academic_service).
//
// ============================================================================

pub mod auth;
pub mod courses;
pub mod extractors;
pub mod health;
pub mod middleware;

pub use extractors::{bearer_token, AuthenticatedUser};
pub use middleware::{request_logging, require_auth};
