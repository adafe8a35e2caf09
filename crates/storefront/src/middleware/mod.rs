//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. Request ID (add unique ID to each request)
//! 3. `TraceLayer` (request tracing, path-only spans)
//! 4. Security headers (CSP, frame denial, no-store)
//! 5. Session layer (tower-sessions, in-memory store, signed cookie)
//! 6. Rate limiting (governor, payment submission only)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod trace;

pub use auth::{OptionalAuth, RequireAuth, clear_session, set_current_user};
pub use rate_limit::payment_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
pub use trace::request_span;
