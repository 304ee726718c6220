//! Domain models for the storefront and the admin API.
//!
//! Each module holds the record as read from the database (`sqlx::FromRow`,
//! serialized to clients as-is) plus the input payload used to create or
//! replace it. Inputs validate themselves before they reach a repository.

pub mod appointment;
pub mod catalog;
pub mod content;
pub mod customer;
pub mod order;
pub mod salon;

use rust_decimal::Decimal;
use thiserror::Error;

pub use appointment::{Appointment, AppointmentSlot};
pub use catalog::{Coupon, CouponInput, Product, ProductInput, Promotion, PromotionInput, ShippingZone, ShippingZoneInput};
pub use content::{
    Banner, BannerInput, ContentBlock, ContentBlockInput, Faq, FaqInput, Testimonial,
    TestimonialInput,
};
pub use customer::{Customer, CustomerDetails, CustomerUpdate};
pub use order::{Order, OrderItem, OrderWithItems};
pub use salon::{SalonService, SalonServiceInput, Stylist, StylistInput};

/// An input payload failed validation. The message is shown to the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

pub(crate) fn require_text(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError(format!("{field} is required")));
    }
    Ok(())
}

pub(crate) fn require_non_negative(value: Decimal, field: &str) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError(format!("{field} cannot be negative")));
    }
    Ok(())
}

pub(crate) fn require_positive(value: i32, field: &str) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError(format!("{field} must be greater than zero")));
    }
    Ok(())
}

/// Trim an optional string, mapping blank to `None`.
#[must_use]
pub fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text() {
        assert!(require_text("Cut & Style", "name").is_ok());
        assert_eq!(
            require_text("   ", "name"),
            Err(ValidationError("name is required".to_string()))
        );
    }

    #[test]
    fn test_clean_optional() {
        assert_eq!(clean_optional(Some("  ")), None);
        assert_eq!(clean_optional(Some(" 555-0101 ")), Some("555-0101".to_string()));
        assert_eq!(clean_optional(None), None);
    }
}
