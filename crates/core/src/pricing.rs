//! Checkout pricing.
//!
//! Given the cart, a delivery method, the chosen shipping zone's flat fee, a
//! coupon discount that has already been validated, and the store's
//! free-shipping threshold, compute the numbers shown at checkout and stored
//! on the order:
//!
//! ```text
//! subtotal = Σ unit_price × quantity
//! shipping = 0                     if pickup
//!          = 0                     if threshold is set and subtotal >= threshold
//!          = zone base fee         otherwise
//! total    = max(0, subtotal + shipping - discount)
//! ```
//!
//! The same function backs the quote preview endpoint and order placement, so
//! the total a customer sees is the total that gets written.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ProductId, ShippingZoneId, round_money};

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.delivery_method", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// Collected at the salon; never charged shipping.
    #[default]
    Pickup,
    /// Shipped to an address inside a shipping zone.
    Delivery,
}

/// One priced line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub variant: Option<String>,
}

impl CartLine {
    /// `unit_price × quantity`, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The part of a shipping zone that pricing needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRate {
    pub zone_id: ShippingZoneId,
    pub base_fee: Decimal,
}

/// Everything [`quote`] needs.
#[derive(Debug, Clone)]
pub struct PricingInput<'a> {
    pub lines: &'a [CartLine],
    pub delivery_method: DeliveryMethod,
    /// Required for [`DeliveryMethod::Delivery`]; ignored for pickup.
    pub shipping: Option<ShippingRate>,
    /// Coupon discount, already validated. Zero when no coupon applies.
    pub discount: Decimal,
    /// Subtotal at or above which delivery is free. `None` disables it.
    pub free_shipping_threshold: Option<Decimal>,
}

/// Result of pricing a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    /// Delivery would have cost something but the threshold waived it.
    pub free_shipping_applied: bool,
    pub item_count: u32,
}

/// Reasons a cart cannot be priced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("quantity for product {product_id} must be at least 1")]
    InvalidQuantity { product_id: ProductId },
    #[error("price for product {product_id} cannot be negative")]
    NegativePrice { product_id: ProductId },
    #[error("discount cannot be negative")]
    NegativeDiscount,
    #[error("a shipping zone is required for delivery")]
    MissingShippingZone,
    #[error("subtotal exceeds the largest accepted order")]
    SubtotalTooLarge,
}

/// Largest subtotal a single order may carry, in the store currency.
#[must_use]
pub fn max_order_subtotal() -> Decimal {
    Decimal::new(99_999_999_999, 2)
}

/// Price a cart.
///
/// # Errors
///
/// Returns a [`PricingError`] for an empty cart, a zero quantity, a negative
/// price or discount, a subtotal above [`max_order_subtotal`], or a delivery
/// order without a shipping zone.
pub fn quote(input: &PricingInput<'_>) -> Result<Quote, PricingError> {
    if input.lines.is_empty() {
        return Err(PricingError::EmptyCart);
    }
    if input.discount.is_sign_negative() && !input.discount.is_zero() {
        return Err(PricingError::NegativeDiscount);
    }

    let mut subtotal = Decimal::ZERO;
    let mut item_count: u32 = 0;
    for line in input.lines {
        if line.quantity == 0 {
            return Err(PricingError::InvalidQuantity {
                product_id: line.product_id,
            });
        }
        if line.unit_price.is_sign_negative() && !line.unit_price.is_zero() {
            return Err(PricingError::NegativePrice {
                product_id: line.product_id,
            });
        }
        subtotal += line.line_total();
        item_count = item_count.saturating_add(line.quantity);
    }
    let subtotal = round_money(subtotal);
    if subtotal > max_order_subtotal() {
        return Err(PricingError::SubtotalTooLarge);
    }

    let (shipping, free_shipping_applied) = match input.delivery_method {
        DeliveryMethod::Pickup => (Decimal::ZERO, false),
        DeliveryMethod::Delivery => {
            let rate = input.shipping.ok_or(PricingError::MissingShippingZone)?;
            let qualifies = input
                .free_shipping_threshold
                .is_some_and(|threshold| subtotal >= threshold);
            if qualifies {
                (Decimal::ZERO, rate.base_fee > Decimal::ZERO)
            } else {
                (round_money(rate.base_fee), false)
            }
        }
    };

    let discount = round_money(input.discount);
    let total = round_money((subtotal + shipping - discount).max(Decimal::ZERO));

    Ok(Quote {
        subtotal,
        shipping,
        discount,
        total,
        free_shipping_applied,
        item_count,
    })
}

/// How much more the customer must add to qualify for free shipping.
///
/// `None` when there is no threshold or it is already met.
#[must_use]
pub fn amount_until_free_shipping(subtotal: Decimal, threshold: Option<Decimal>) -> Option<Decimal> {
    threshold
        .filter(|t| subtotal < *t)
        .map(|t| round_money(t - subtotal))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: i32, cents: i64, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            unit_price: Decimal::new(cents, 2),
            quantity,
            variant: None,
        }
    }

    fn zone(fee_cents: i64) -> Option<ShippingRate> {
        Some(ShippingRate {
            zone_id: ShippingZoneId::new(1),
            base_fee: Decimal::new(fee_cents, 2),
        })
    }

    fn input(lines: &[CartLine]) -> PricingInput<'_> {
        PricingInput {
            lines,
            delivery_method: DeliveryMethod::Delivery,
            shipping: zone(500),
            discount: Decimal::ZERO,
            free_shipping_threshold: Some(Decimal::new(50, 0)),
        }
    }

    #[test]
    fn test_subtotal_sums_lines() {
        let lines = [line(1, 1250, 2), line(2, 399, 3)];
        let quote = quote(&input(&lines)).unwrap();
        assert_eq!(quote.subtotal, Decimal::new(3697, 2));
        assert_eq!(quote.item_count, 5);
    }

    #[test]
    fn test_delivery_below_threshold_charges_zone_fee() {
        let lines = [line(1, 2000, 1)];
        let quote = quote(&input(&lines)).unwrap();
        assert_eq!(quote.shipping, Decimal::new(500, 2));
        assert_eq!(quote.total, Decimal::new(2500, 2));
        assert!(!quote.free_shipping_applied);
    }

    #[test]
    fn test_subtotal_at_threshold_ships_free() {
        let lines = [line(1, 2500, 2)];
        let quote = quote(&input(&lines)).unwrap();
        assert_eq!(quote.subtotal, Decimal::new(50, 0));
        assert_eq!(quote.shipping, Decimal::ZERO);
        assert!(quote.free_shipping_applied);
        assert_eq!(quote.total, Decimal::new(5000, 2));
    }

    #[test]
    fn test_pickup_never_charges_shipping() {
        let lines = [line(1, 1000, 1)];
        let mut pricing = input(&lines);
        pricing.delivery_method = DeliveryMethod::Pickup;
        pricing.shipping = None;
        let quote = quote(&pricing).unwrap();
        assert_eq!(quote.shipping, Decimal::ZERO);
        assert!(!quote.free_shipping_applied);
        assert_eq!(quote.total, Decimal::new(1000, 2));
    }

    #[test]
    fn test_no_threshold_always_charges_delivery() {
        let lines = [line(1, 100_000, 1)];
        let mut pricing = input(&lines);
        pricing.free_shipping_threshold = None;
        assert_eq!(quote(&pricing).unwrap().shipping, Decimal::new(500, 2));
    }

    #[test]
    fn test_discount_subtracts_from_subtotal_plus_shipping() {
        let lines = [line(1, 2000, 1)];
        let mut pricing = input(&lines);
        pricing.discount = Decimal::new(300, 2);
        let quote = quote(&pricing).unwrap();
        assert_eq!(quote.total, Decimal::new(2200, 2));
        assert_eq!(quote.discount, Decimal::new(300, 2));
    }

    #[test]
    fn test_total_never_negative() {
        let lines = [line(1, 500, 1)];
        let mut pricing = input(&lines);
        pricing.discount = Decimal::new(10_000, 2);
        assert_eq!(quote(&pricing).unwrap().total, Decimal::ZERO);
    }

    #[test]
    fn test_rejects_invalid_carts() {
        assert_eq!(quote(&input(&[])), Err(PricingError::EmptyCart));

        let zero_qty = [line(9, 100, 0)];
        assert_eq!(
            quote(&input(&zero_qty)),
            Err(PricingError::InvalidQuantity {
                product_id: ProductId::new(9)
            })
        );

        let negative = [line(4, -100, 1)];
        assert!(matches!(
            quote(&input(&negative)),
            Err(PricingError::NegativePrice { .. })
        ));

        let lines = [line(1, 100, 1)];
        let mut missing_zone = input(&lines);
        missing_zone.shipping = None;
        assert_eq!(quote(&missing_zone), Err(PricingError::MissingShippingZone));

        let mut negative_discount = input(&lines);
        negative_discount.discount = Decimal::new(-1, 0);
        assert_eq!(quote(&negative_discount), Err(PricingError::NegativeDiscount));
    }

    #[test]
    fn test_rejects_subtotal_above_limit() {
        // 99,999,999.99 each: ten fit, eleven do not.
        let lines = [line(1, 9_999_999_999, 10), line(2, 9_999_999_999, 1)];
        assert_eq!(quote(&input(&lines)), Err(PricingError::SubtotalTooLarge));

        let lines = [line(1, 9_999_999_999, 10)];
        let q = quote(&input(&lines)).unwrap();
        assert_eq!(q.subtotal, Decimal::new(99_999_999_990, 2));
    }

    #[test]
    fn test_amount_until_free_shipping() {
        let threshold = Some(Decimal::new(50, 0));
        assert_eq!(
            amount_until_free_shipping(Decimal::new(3250, 2), threshold),
            Some(Decimal::new(1750, 2))
        );
        assert_eq!(amount_until_free_shipping(Decimal::new(50, 0), threshold), None);
        assert_eq!(amount_until_free_shipping(Decimal::ONE, None), None);
    }
}
