//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness
//! GET  /health/ready                   - Readiness (database ping)
//!
//! # Store
//! GET  /api/store/settings             - Currency, free shipping, hours
//!
//! # Catalog
//! GET  /api/products                   - Product listing (filter, sort, page)
//! GET  /api/products/categories        - Distinct categories
//! GET  /api/products/{id}              - Product detail
//! GET  /api/shipping/zones             - Active shipping zones
//! GET  /api/promotions                 - Running promotions
//!
//! # Checkout (rate limited)
//! POST /api/coupons/validate           - Check a coupon against a subtotal
//! POST /api/checkout/quote             - Server-side pricing preview
//! POST /api/orders                     - Place an order
//!
//! # Orders
//! GET  /api/orders?email=              - A customer's orders
//! GET  /api/orders/{order_number}      - One order, email must match
//!
//! # Salon
//! GET  /api/services                   - Active services
//! GET  /api/stylists                   - Active stylists
//! GET  /api/appointments?email=        - A customer's appointments
//! GET  /api/appointments/availability  - Free slots for a day
//! POST /api/appointments               - Book (rate limited)
//!
//! # Content
//! GET  /api/banners, /api/faqs, /api/testimonials
//! GET  /api/content/{key}              - Published content block
//!
//! # Cron (bearer secret)
//! GET|POST /api/cron/appointment-reminders
//! ```

pub mod appointments;
pub mod checkout;
pub mod content;
pub mod cron;
pub mod health;
pub mod orders;
pub mod products;
pub mod salon;
pub mod store;

use axum::{
    Router,
    routing::{get, post},
};
use salon_shop_core::Email;
use serde::Deserialize;

use crate::error::AppError;
use crate::middleware::public_write_rate_limiter;
use crate::state::AppState;

/// `?email=` query used by the customer lookup endpoints.
#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

impl EmailQuery {
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the address is missing or invalid.
    pub fn parse(&self) -> Result<Email, AppError> {
        Email::parse(&self.email)
            .map_err(|_| AppError::BadRequest("A valid email address is required".to_string()))
    }
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/categories", get(products::categories))
        .route("/products/{id}", get(products::show))
        .route("/shipping/zones", get(store::shipping_zones))
        .route("/promotions", get(content::promotions))
}

/// Create the mutating public routes router, behind the per-IP rate limiter.
pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/coupons/validate", post(checkout::validate_coupon))
        .route("/checkout/quote", post(checkout::quote))
        .route("/orders", post(orders::create))
        .route("/appointments", post(appointments::create))
        .layer(public_write_rate_limiter())
}

/// Create the customer lookup routes router.
pub fn lookup_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::index))
        .route("/orders/{order_number}", get(orders::show))
        .route("/appointments", get(appointments::index))
        .route("/appointments/availability", get(appointments::availability))
}

/// Create the salon and content routes router.
pub fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/services", get(salon::services))
        .route("/stylists", get(salon::stylists))
        .route("/banners", get(content::banners))
        .route("/faqs", get(content::faqs))
        .route("/testimonials", get(content::testimonials))
        .route("/content/{key}", get(content::block))
}

/// Create all `/api` routes for the storefront.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .route("/store/settings", get(store::settings))
        .merge(catalog_routes())
        .merge(write_routes())
        .merge(lookup_routes())
        .merge(content_routes())
        .route(
            "/cron/appointment-reminders",
            get(cron::appointment_reminders).post(cron::appointment_reminders),
        );

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_email_query_parse() {
        let query = EmailQuery {
            email: " Dana@Example.com ".to_string(),
        };
        assert_eq!(query.parse().unwrap().as_str(), "dana@example.com");

        let query = EmailQuery {
            email: "not-an-email".to_string(),
        };
        assert!(matches!(query.parse(), Err(AppError::BadRequest(_))));
    }
}
