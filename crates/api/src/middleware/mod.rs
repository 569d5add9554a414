//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, one hub per request)
//! 2. `TraceLayer` (`http_request` span)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS
//! 5. Rate limiting on `POST /api/users/login`
//!
//! Authentication is not a layer: handlers opt in through the extractors in
//! [`auth`].

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{AuthRejection, AuthUser, OptionalAuth, RequireAdmin, RequireAuth};
pub use rate_limit::login_rate_limiter;
pub use request_id::request_id_middleware;
