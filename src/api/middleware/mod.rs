//! API middleware components

pub mod authentication;
pub mod logging;
pub mod metrics;
pub mod security;

pub use authentication::{
    authenticate, require_roles, require_staff, Authenticated, Principal, STAFF_ROLES,
};
pub use logging::logging_middleware;
pub use metrics::metrics_middleware;
pub use security::security_headers_middleware;
