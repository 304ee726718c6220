//! HTTP route handlers for the admin API.
//!
//! Every route lives under `/api/admin` and requires
//! `Authorization: Bearer <ADMIN_API_TOKEN>`.
//!
//! # Route Structure
//!
//! ```text
//! GET    /api/admin/dashboard                  - Counters and revenue
//!
//! # Catalog (list / create, get / update / delete by id)
//! /api/admin/products[/{id}]
//! /api/admin/shipping-zones[/{id}]
//! /api/admin/coupons[/{id}]
//! /api/admin/promotions[/{id}]
//!
//! # Content
//! /api/admin/banners[/{id}]
//! /api/admin/faqs[/{id}]
//! /api/admin/testimonials[/{id}]
//! /api/admin/content-blocks[/{id}]
//!
//! # Salon
//! /api/admin/services[/{id}]
//! /api/admin/stylists[/{id}]
//!
//! # Orders, customers, appointments
//! GET    /api/admin/orders                     - Filter by status, search
//! GET    /api/admin/orders/{id}                - Order with items
//! PATCH  /api/admin/orders/{id}/status         - Lifecycle transition
//! GET    /api/admin/customers                  - Filter by search, tier
//! GET    /api/admin/customers/{id}
//! PATCH  /api/admin/customers/{id}
//! GET    /api/admin/appointments               - Filter by status, date, stylist
//! PATCH  /api/admin/appointments/{id}/status   - Lifecycle transition
//! ```

pub mod appointments;
pub mod catalog;
pub mod content;
pub mod customers;
pub mod dashboard;
pub mod orders;
pub mod salon;

use axum::{
    Router,
    routing::{get, patch},
};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

/// Payload returned by every `DELETE`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Deleted<T> {
    pub id: T,
}

pub(crate) fn not_found(entity: &str) -> AppError {
    AppError::NotFound(format!("{entity} not found"))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(catalog::list_products).post(catalog::create_product))
        .route(
            "/products/{id}",
            get(catalog::get_product)
                .put(catalog::update_product)
                .delete(catalog::delete_product),
        )
        .route(
            "/shipping-zones",
            get(catalog::list_shipping_zones).post(catalog::create_shipping_zone),
        )
        .route(
            "/shipping-zones/{id}",
            get(catalog::get_shipping_zone)
                .put(catalog::update_shipping_zone)
                .delete(catalog::delete_shipping_zone),
        )
        .route("/coupons", get(catalog::list_coupons).post(catalog::create_coupon))
        .route(
            "/coupons/{id}",
            get(catalog::get_coupon)
                .put(catalog::update_coupon)
                .delete(catalog::delete_coupon),
        )
        .route(
            "/promotions",
            get(catalog::list_promotions).post(catalog::create_promotion),
        )
        .route(
            "/promotions/{id}",
            get(catalog::get_promotion)
                .put(catalog::update_promotion)
                .delete(catalog::delete_promotion),
        )
}

/// Create the content routes router.
pub fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/banners", get(content::list_banners).post(content::create_banner))
        .route(
            "/banners/{id}",
            get(content::get_banner)
                .put(content::update_banner)
                .delete(content::delete_banner),
        )
        .route("/faqs", get(content::list_faqs).post(content::create_faq))
        .route(
            "/faqs/{id}",
            get(content::get_faq)
                .put(content::update_faq)
                .delete(content::delete_faq),
        )
        .route(
            "/testimonials",
            get(content::list_testimonials).post(content::create_testimonial),
        )
        .route(
            "/testimonials/{id}",
            get(content::get_testimonial)
                .put(content::update_testimonial)
                .delete(content::delete_testimonial),
        )
        .route(
            "/content-blocks",
            get(content::list_content_blocks).post(content::create_content_block),
        )
        .route(
            "/content-blocks/{id}",
            get(content::get_content_block)
                .put(content::update_content_block)
                .delete(content::delete_content_block),
        )
}

/// Create the salon routes router.
pub fn salon_routes() -> Router<AppState> {
    Router::new()
        .route("/services", get(salon::list_services).post(salon::create_service))
        .route(
            "/services/{id}",
            get(salon::get_service)
                .put(salon::update_service)
                .delete(salon::delete_service),
        )
        .route("/stylists", get(salon::list_stylists).post(salon::create_stylist))
        .route(
            "/stylists/{id}",
            get(salon::get_stylist)
                .put(salon::update_stylist)
                .delete(salon::delete_stylist),
        )
}

/// Create the orders, customers and appointments routes router.
pub fn operations_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", patch(orders::update_status))
        .route("/customers", get(customers::index))
        .route("/customers/{id}", get(customers::show).patch(customers::update))
        .route("/appointments", get(appointments::index))
        .route("/appointments/{id}", get(appointments::show))
        .route("/appointments/{id}/status", patch(appointments::update_status))
}

/// Create all routes for the admin API.
pub fn routes() -> Router<AppState> {
    let admin = Router::new()
        .route("/dashboard", get(dashboard::show))
        .merge(catalog_routes())
        .merge(content_routes())
        .merge(salon_routes())
        .merge(operations_routes());

    Router::new().nest("/api/admin", admin)
}
