//! Coupon eligibility and discount amounts.
//!
//! A coupon is looked up by its normalized code and evaluated against the cart
//! subtotal at a point in time. Evaluation either yields the discount amount or
//! a [`CouponRejection`] whose message is shown to the customer as-is.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::round_money;

/// How a coupon's `value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.discount_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// `value` is a percentage of the subtotal (10 = 10%).
    Percentage,
    /// `value` is an amount of money.
    FixedAmount,
}

/// The rules a coupon carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponRule {
    pub code: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub min_order_amount: Option<Decimal>,
    pub max_discount: Option<Decimal>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
    pub usage_count: i32,
    pub is_active: bool,
}

/// Why a coupon does not apply. `Display` is customer-facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponRejection {
    #[error("This coupon is no longer available")]
    Inactive,
    #[error("This coupon is not active yet")]
    NotYetActive,
    #[error("This coupon has expired")]
    Expired,
    #[error("This coupon has reached its usage limit")]
    UsageLimitReached,
    #[error("Spend at least {minimum} to use this coupon")]
    MinimumNotMet { minimum: Decimal },
}

/// Canonical form of a coupon code: trimmed, ASCII uppercase.
///
/// ```
/// use salon_shop_core::coupon::normalize_code;
///
/// assert_eq!(normalize_code("  summer10 "), "SUMMER10");
/// ```
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

impl CouponRule {
    /// Discount this coupon grants on `subtotal` at `now`.
    ///
    /// The amount is capped by `max_discount` and never exceeds the subtotal.
    ///
    /// # Errors
    ///
    /// Returns the first [`CouponRejection`] that applies, checked in order:
    /// inactive, not started, expired, usage limit, minimum order amount.
    pub fn evaluate(&self, subtotal: Decimal, now: DateTime<Utc>) -> Result<Decimal, CouponRejection> {
        if !self.is_active {
            return Err(CouponRejection::Inactive);
        }
        if self.starts_at.is_some_and(|starts| now < starts) {
            return Err(CouponRejection::NotYetActive);
        }
        if self.expires_at.is_some_and(|expires| now >= expires) {
            return Err(CouponRejection::Expired);
        }
        if self
            .usage_limit
            .is_some_and(|limit| self.usage_count >= limit)
        {
            return Err(CouponRejection::UsageLimitReached);
        }
        if let Some(minimum) = self.min_order_amount
            && subtotal < minimum
        {
            return Err(CouponRejection::MinimumNotMet { minimum });
        }

        let raw = match self.kind {
            DiscountKind::Percentage => subtotal * self.value / Decimal::ONE_HUNDRED,
            DiscountKind::FixedAmount => self.value,
        };
        let capped = self
            .max_discount
            .map_or(raw, |cap| raw.min(cap))
            .min(subtotal)
            .max(Decimal::ZERO);

        Ok(round_money(capped))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn percent(value: i64) -> CouponRule {
        CouponRule {
            code: "SUMMER".to_string(),
            kind: DiscountKind::Percentage,
            value: Decimal::new(value, 0),
            min_order_amount: None,
            max_discount: None,
            starts_at: None,
            expires_at: None,
            usage_limit: None,
            usage_count: 0,
            is_active: true,
        }
    }

    #[test]
    fn test_percentage_discount() {
        let discount = percent(15).evaluate(Decimal::new(4000, 2), now()).unwrap();
        assert_eq!(discount, Decimal::new(600, 2));
    }

    #[test]
    fn test_percentage_discount_rounds_to_cents() {
        let discount = percent(10).evaluate(Decimal::new(1999, 2), now()).unwrap();
        assert_eq!(discount, Decimal::new(200, 2));
    }

    #[test]
    fn test_fixed_discount_capped_at_subtotal() {
        let mut rule = percent(0);
        rule.kind = DiscountKind::FixedAmount;
        rule.value = Decimal::new(25, 0);
        assert_eq!(
            rule.evaluate(Decimal::new(1000, 2), now()).unwrap(),
            Decimal::new(1000, 2)
        );
    }

    #[test]
    fn test_max_discount_cap() {
        let mut rule = percent(50);
        rule.max_discount = Some(Decimal::new(20, 0));
        assert_eq!(
            rule.evaluate(Decimal::new(200, 0), now()).unwrap(),
            Decimal::new(20, 0)
        );
    }

    #[test]
    fn test_rejections() {
        let mut inactive = percent(10);
        inactive.is_active = false;
        assert_eq!(
            inactive.evaluate(Decimal::TEN, now()),
            Err(CouponRejection::Inactive)
        );

        let mut future = percent(10);
        future.starts_at = Some(now() + Duration::days(1));
        assert_eq!(
            future.evaluate(Decimal::TEN, now()),
            Err(CouponRejection::NotYetActive)
        );

        let mut expired = percent(10);
        expired.expires_at = Some(now());
        assert_eq!(
            expired.evaluate(Decimal::TEN, now()),
            Err(CouponRejection::Expired)
        );

        let mut used_up = percent(10);
        used_up.usage_limit = Some(3);
        used_up.usage_count = 3;
        assert_eq!(
            used_up.evaluate(Decimal::TEN, now()),
            Err(CouponRejection::UsageLimitReached)
        );

        let mut minimum = percent(10);
        minimum.min_order_amount = Some(Decimal::new(30, 0));
        assert_eq!(
            minimum.evaluate(Decimal::new(2999, 2), now()),
            Err(CouponRejection::MinimumNotMet {
                minimum: Decimal::new(30, 0)
            })
        );
        assert!(minimum.evaluate(Decimal::new(30, 0), now()).is_ok());
    }

    #[test]
    fn test_rejection_messages_are_customer_facing() {
        let message = CouponRejection::MinimumNotMet {
            minimum: Decimal::new(3000, 2),
        }
        .to_string();
        assert_eq!(message, "Spend at least 30.00 to use this coupon");
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" welcome5\n"), "WELCOME5");
    }
}
