//! Products, shipping zones, coupons and promotions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use salon_shop_core::coupon::{CouponRule, DiscountKind, normalize_code};
use salon_shop_core::pricing::ShippingRate;
use salon_shop_core::{CouponId, ProductId, PromotionId, ShippingZoneId};
use serde::{Deserialize, Serialize};

use super::{ValidationError, require_non_negative, require_text};

/// A product in the shop catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub variants: Vec<String>,
    /// `None` means stock is not tracked.
    pub stock_quantity: Option<i32>,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The price a customer pays: the sale price when one is set.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.sale_price.unwrap_or(self.price)
    }

    /// Whether `quantity` units can be sold right now.
    #[must_use]
    pub fn has_stock_for(&self, quantity: u32) -> bool {
        self.stock_quantity
            .is_none_or(|stock| i64::from(stock) >= i64::from(quantity))
    }
}

/// Create / replace payload for a product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub variants: Vec<String>,
    pub stock_quantity: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
}

impl ProductInput {
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.name, "name")?;
        require_text(&self.slug, "slug")?;
        if !self
            .slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ValidationError(
                "slug may only contain lowercase letters, digits and dashes".to_string(),
            ));
        }
        require_non_negative(self.price, "price")?;
        if let Some(sale) = self.sale_price {
            require_non_negative(sale, "sale_price")?;
        }
        if self.stock_quantity.is_some_and(|s| s < 0) {
            return Err(ValidationError("stock_quantity cannot be negative".to_string()));
        }
        Ok(())
    }
}

/// A flat-rate delivery destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShippingZone {
    pub id: ShippingZoneId,
    pub name: String,
    pub region: String,
    pub base_fee: Decimal,
    pub estimated_days: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShippingZone {
    #[must_use]
    pub const fn rate(&self) -> ShippingRate {
        ShippingRate {
            zone_id: self.id,
            base_fee: self.base_fee,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShippingZoneInput {
    pub name: String,
    pub region: String,
    pub base_fee: Decimal,
    pub estimated_days: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl ShippingZoneInput {
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.name, "name")?;
        require_text(&self.region, "region")?;
        require_non_negative(self.base_fee, "base_fee")
    }
}

/// A discount code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    pub description: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub min_order_amount: Option<Decimal>,
    pub max_discount: Option<Decimal>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
    pub usage_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// The rules [`CouponRule::evaluate`] works on.
    #[must_use]
    pub fn rule(&self) -> CouponRule {
        CouponRule {
            code: self.code.clone(),
            kind: self.kind,
            value: self.value,
            min_order_amount: self.min_order_amount,
            max_discount: self.max_discount,
            starts_at: self.starts_at,
            expires_at: self.expires_at,
            usage_limit: self.usage_limit,
            usage_count: self.usage_count,
            is_active: self.is_active,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CouponInput {
    pub code: String,
    #[serde(default)]
    pub description: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub min_order_amount: Option<Decimal>,
    pub max_discount: Option<Decimal>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl CouponInput {
    /// Normalize the code and check the numbers make sense.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        self.code = normalize_code(&self.code);
        require_text(&self.code, "code")?;
        if self.value <= Decimal::ZERO {
            return Err(ValidationError("value must be greater than zero".to_string()));
        }
        if self.kind == DiscountKind::Percentage && self.value > Decimal::ONE_HUNDRED {
            return Err(ValidationError(
                "a percentage discount cannot exceed 100".to_string(),
            ));
        }
        if let Some(min) = self.min_order_amount {
            require_non_negative(min, "min_order_amount")?;
        }
        if let Some(max) = self.max_discount {
            require_non_negative(max, "max_discount")?;
        }
        if self.usage_limit.is_some_and(|l| l <= 0) {
            return Err(ValidationError("usage_limit must be greater than zero".to_string()));
        }
        if let (Some(starts), Some(expires)) = (self.starts_at, self.expires_at)
            && starts >= expires
        {
            return Err(ValidationError("starts_at must be before expires_at".to_string()));
        }
        Ok(())
    }
}

/// A marketing promotion shown on the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Promotion {
    pub id: PromotionId,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub coupon_code: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromotionInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub coupon_code: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl PromotionInput {
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        require_text(&self.title, "title")?;
        self.coupon_code = self
            .coupon_code
            .as_deref()
            .map(normalize_code)
            .filter(|c| !c.is_empty());
        if let (Some(starts), Some(ends)) = (self.starts_at, self.ends_at)
            && starts >= ends
        {
            return Err(ValidationError("starts_at must be before ends_at".to_string()));
        }
        Ok(())
    }
}

pub(crate) const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product() -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(1),
            name: "Argan Oil".to_string(),
            slug: "argan-oil".to_string(),
            description: String::new(),
            category: "hair-care".to_string(),
            price: Decimal::new(2400, 2),
            sale_price: None,
            image_url: None,
            variants: vec![],
            stock_quantity: Some(2),
            is_active: true,
            is_featured: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_effective_price_prefers_sale_price() {
        let mut p = product();
        assert_eq!(p.effective_price(), Decimal::new(2400, 2));
        p.sale_price = Some(Decimal::new(1999, 2));
        assert_eq!(p.effective_price(), Decimal::new(1999, 2));
    }

    #[test]
    fn test_stock_check() {
        let mut p = product();
        assert!(p.has_stock_for(2));
        assert!(!p.has_stock_for(3));
        p.stock_quantity = None;
        assert!(p.has_stock_for(1_000));
    }

    #[test]
    fn test_product_input_rejects_bad_slug() {
        let input: ProductInput = serde_json::from_value(serde_json::json!({
            "name": "Argan Oil",
            "slug": "Argan Oil",
            "price": "24.00"
        }))
        .unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_coupon_input_normalizes_code() {
        let mut input: CouponInput = serde_json::from_value(serde_json::json!({
            "code": " spring15 ",
            "kind": "percentage",
            "value": "15"
        }))
        .unwrap();
        input.validate().unwrap();
        assert_eq!(input.code, "SPRING15");
        assert!(input.is_active);
    }

    #[test]
    fn test_coupon_input_rejects_percentage_over_100() {
        let mut input: CouponInput = serde_json::from_value(serde_json::json!({
            "code": "HALF",
            "kind": "percentage",
            "value": "150"
        }))
        .unwrap();
        assert!(input.validate().is_err());
    }
}
