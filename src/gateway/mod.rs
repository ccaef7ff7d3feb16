// ============================================================================
// API Gateway
// ============================================================================
//
// Single entry point for client requests. The gateway:
// - serves its own liveness route locally
// - matches the request path against an ordered, static routing table
// - forwards method, headers and body to the selected upstream
// - relays the upstream response back unchanged
//
// It never verifies tokens itself; Authorization travels to the upstream
// untouched and the upstream's auth middleware decides.
//
// ============================================================================

pub mod router;
pub mod service_client;

pub use router::{dispatch, router, GatewayState, RouteEntry, RouteTable};
pub use service_client::{ReverseProxy, ServiceClient, UpstreamError};
