//! Orders and their line items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use salon_shop_core::pricing::DeliveryMethod;
use salon_shop_core::{
    CustomerId, Email, OrderId, OrderItemId, OrderStatus, PaymentMethod, ProductId,
    ShippingZoneId,
};
use serde::{Deserialize, Serialize};

/// A placed order. Amounts are the ones computed at checkout and never
/// recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub customer_email: Email,
    pub customer_phone: Option<String>,
    pub status: OrderStatus,
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,
    pub shipping_zone_id: Option<ShippingZoneId>,
    pub shipping_address: Option<String>,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub coupon_code: Option<String>,
    pub notes: Option<String>,
    #[serde(skip)]
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Snapshot of a product at the time it was ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub variant: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

const ORDER_NUMBER_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generate a human-friendly order number, e.g. `ORD-20260310-K7M2QX`.
///
/// The suffix avoids look-alike characters (`0/O`, `1/I`). Uniqueness is
/// enforced by the database; callers retry on conflict.
#[must_use]
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let suffix: String = (0..6)
        .map(|_| {
            let idx = rng.random_range(0..ORDER_NUMBER_ALPHABET.len());
            char::from(ORDER_NUMBER_ALPHABET.get(idx).copied().unwrap_or(b'X'))
        })
        .collect();
    format!("ORD-{}-{suffix}", now.format("%Y%m%d"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_order_number_format() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap();
        let number = generate_order_number(now);
        assert!(number.starts_with("ORD-20260310-"));
        let suffix = number.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 6);
        assert!(suffix.bytes().all(|b| ORDER_NUMBER_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_idempotency_key_not_serialized() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap();
        let order = Order {
            id: OrderId::new(1),
            order_number: "ORD-20260310-AAAAAA".to_string(),
            customer_id: CustomerId::new(1),
            customer_name: "Maya".to_string(),
            customer_email: Email::parse("maya@example.com").unwrap(),
            customer_phone: None,
            status: OrderStatus::Pending,
            delivery_method: DeliveryMethod::Pickup,
            payment_method: PaymentMethod::CardOnPickup,
            shipping_zone_id: None,
            shipping_address: None,
            subtotal: Decimal::TEN,
            shipping_fee: Decimal::ZERO,
            discount: Decimal::ZERO,
            total: Decimal::TEN,
            coupon_code: None,
            notes: None,
            idempotency_key: Some("client-key".to_string()),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&order).unwrap();
        assert!(json.get("idempotency_key").is_none());
        assert_eq!(json["status"], "pending");
    }
}
