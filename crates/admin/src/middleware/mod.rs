//! HTTP middleware for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request spans)
//! 3. Request ID (shared with the storefront)
//! 4. CORS, when `ADMIN_ALLOWED_ORIGIN` is set
//!
//! Authentication is an extractor, [`RequireAdminAuth`], on every
//! `/api/admin` handler.

pub mod auth;

pub use auth::RequireAdminAuth;
