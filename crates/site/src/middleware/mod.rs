//! HTTP middleware stack for the site.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions, in-memory store)
//! 5. Security headers
//! 6. Rate limiting (admin login only)

pub mod admin_gate;
pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use admin_gate::{AdminGate, RequireAdmin, is_admin};
pub use auth::{OptionalUser, clear_current_user, set_current_user};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
