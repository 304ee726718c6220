//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request spans)
//! 3. Request ID (add unique ID to each request)
//! 4. Rate limiting (governor) on mutating public routes
//!
//! The cron route authenticates with [`RequireCronSecret`] instead of a
//! layer.

pub mod bearer;
pub mod cron_auth;
pub mod rate_limit;
pub mod request_id;

pub use bearer::bearer_token;
pub use cron_auth::RequireCronSecret;
pub use rate_limit::{RateLimiterLayer, public_write_rate_limiter};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
