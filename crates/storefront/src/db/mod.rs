//! Database operations for the shop `PostgreSQL` database.
//!
//! # Schema: `shop`
//!
//! ## Tables
//!
//! - `products`, `shipping_zones`, `coupons`, `promotions` - Catalog and pricing inputs
//! - `customers` - One row per email, upserted by checkout and booking
//! - `orders`, `order_items` - Placed orders with price snapshots
//! - `services`, `stylists`, `appointments` - Salon bookings
//! - `banners`, `faqs`, `testimonials`, `content_blocks` - Marketing content
//!
//! The admin binary reuses these repositories; it has no tables of its own.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p salon-shop-cli -- migrate
//! ```

pub mod appointments;
pub mod content;
pub mod coupons;
pub mod customers;
pub mod orders;
pub mod products;
pub mod promotions;
pub mod salon;
pub mod shipping_zones;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use appointments::{AppointmentFilter, AppointmentRepository, NewAppointment};
pub use content::{
    BannerRepository, ContentBlockRepository, FaqRepository, TestimonialRepository,
};
pub use coupons::CouponRepository;
pub use customers::{CustomerFilter, CustomerRepository};
pub use orders::{NewOrder, NewOrderItem, OrderFilter, OrderRepository};
pub use products::{ProductFilter, ProductRepository, ProductSort};
pub use promotions::PromotionRepository;
pub use salon::{ServiceRepository, StylistRepository};
pub use shipping_zones::ShippingZoneRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique coupon code). The message is
    /// client-facing.
    #[error("{0}")]
    Conflict(String),
}

/// Map a failed `INSERT`/`UPDATE`: unique violations become `Conflict` with
/// `duplicate_message`.
pub(crate) fn map_write_error(err: sqlx::Error, duplicate_message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(duplicate_message.to_owned());
    }
    RepositoryError::Database(err)
}

/// Map a failed `DELETE`: rows still referenced by a foreign key become
/// `Conflict`.
pub(crate) fn map_delete_error(err: sqlx::Error, entity: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::Conflict(format!("{entity} is in use and cannot be deleted"));
    }
    RepositoryError::Database(err)
}

/// Turn a `DELETE` result into `NotFound` when nothing matched.
pub(crate) fn expect_deleted(rows_affected: u64) -> Result<(), RepositoryError> {
    if rows_affected == 0 {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
pub(crate) fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" shampoo "), "%shampoo%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_expect_deleted() {
        assert!(expect_deleted(1).is_ok());
        assert!(matches!(expect_deleted(0), Err(RepositoryError::NotFound)));
    }
}
