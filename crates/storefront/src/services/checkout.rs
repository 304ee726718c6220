//! Server-side pricing and order placement.
//!
//! Prices always come from the database: the client names products and
//! quantities, never amounts. Placing an order locks the products, coupon
//! and shipping zone it touches, writes the order, its items, the customer
//! totals and coupon usage in one transaction, and only then sends the
//! confirmation email.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use salon_shop_core::coupon::CouponRejection;
use salon_shop_core::pricing::{
    CartLine, DeliveryMethod, PricingError, PricingInput, Quote, ShippingRate,
    amount_until_free_shipping, quote,
};
use salon_shop_core::{Email, PaymentMethod, ProductId, ShippingZoneId, round_money};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use crate::config::StoreConfig;
use crate::db::{
    CouponRepository, CustomerRepository, NewOrder, NewOrderItem, OrderRepository,
    ProductRepository, RepositoryError, ShippingZoneRepository,
};
use crate::models::order::generate_order_number;
use crate::models::{Coupon, CustomerDetails, Order, OrderWithItems, Product, clean_optional};
use crate::services::email::EmailService;

/// Largest quantity of one line.
pub const MAX_LINE_QUANTITY: u32 = 99;
/// Most distinct lines in one order.
pub const MAX_LINES: usize = 50;
const MAX_NOTES_LENGTH: usize = 1000;
const MAX_IDEMPOTENCY_KEY_LENGTH: usize = 100;
const ORDER_NUMBER_ATTEMPTS: usize = 3;

/// Errors from pricing a cart or placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Request failed validation; the message is customer-facing.
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Coupon(#[from] CouponRejection),

    #[error("Coupon not found")]
    CouponNotFound,

    #[error("Product {0} is not available")]
    ProductUnavailable(ProductId),

    #[error("The selected shipping zone is not available")]
    ShippingZoneUnavailable,

    #[error("{name} is out of stock")]
    OutOfStock { name: String },

    /// The idempotency key belongs to another customer's order.
    #[error("This idempotency key has already been used")]
    IdempotencyKeyReused,

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One requested cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default)]
    pub variant: Option<String>,
}

/// `POST /api/checkout/quote` body.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    pub items: Vec<CartItemRequest>,
    #[serde(default)]
    pub delivery_method: DeliveryMethod,
    pub shipping_zone_id: Option<ShippingZoneId>,
    pub coupon_code: Option<String>,
}

/// Pricing preview returned to the cart page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteResponse {
    #[serde(flatten)]
    pub quote: Quote,
    pub coupon_code: Option<String>,
    pub amount_until_free_shipping: Option<Decimal>,
}

/// `POST /api/orders` body.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    pub customer: CustomerDetails,
    pub items: Vec<CartItemRequest>,
    #[serde(default)]
    pub delivery_method: DeliveryMethod,
    pub shipping_zone_id: Option<ShippingZoneId>,
    pub shipping_address: Option<String>,
    pub coupon_code: Option<String>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    /// Client-generated key; resubmitting with the same key returns the
    /// original order.
    pub idempotency_key: Option<String>,
}

impl PlaceOrderRequest {
    /// Trim free-text fields and check everything that needs no database.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Invalid` or `CheckoutError::Pricing` with a
    /// customer-facing message.
    pub fn validate(&mut self) -> Result<(), CheckoutError> {
        self.customer
            .normalize()
            .map_err(|e| CheckoutError::Invalid(e.0))?;
        validate_items(&self.items)?;

        self.shipping_address = clean_optional(self.shipping_address.as_deref());
        self.coupon_code = clean_optional(self.coupon_code.as_deref());
        self.notes = clean_optional(self.notes.as_deref());
        self.idempotency_key = clean_optional(self.idempotency_key.as_deref());

        if self.delivery_method == DeliveryMethod::Delivery {
            if self.shipping_zone_id.is_none() {
                return Err(PricingError::MissingShippingZone.into());
            }
            if self.shipping_address.is_none() {
                return Err(CheckoutError::Invalid(
                    "A shipping address is required for delivery".to_string(),
                ));
            }
        } else {
            self.shipping_zone_id = None;
            self.shipping_address = None;
        }

        if self
            .notes
            .as_ref()
            .is_some_and(|n| n.chars().count() > MAX_NOTES_LENGTH)
        {
            return Err(CheckoutError::Invalid("Order notes are too long".to_string()));
        }
        if self
            .idempotency_key
            .as_ref()
            .is_some_and(|k| k.len() > MAX_IDEMPOTENCY_KEY_LENGTH)
        {
            return Err(CheckoutError::Invalid("Invalid idempotency key".to_string()));
        }
        Ok(())
    }
}

/// Outcome of [`place_order`]. `created` is false when an earlier order with
/// the same idempotency key was returned.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: OrderWithItems,
    pub created: bool,
}

/// Result of `POST /api/coupons/validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CouponValidation {
    pub code: String,
    pub discount: Decimal,
    pub kind: salon_shop_core::coupon::DiscountKind,
    pub value: Decimal,
}

fn validate_items(items: &[CartItemRequest]) -> Result<(), CheckoutError> {
    if items.is_empty() {
        return Err(PricingError::EmptyCart.into());
    }
    if items.len() > MAX_LINES {
        return Err(CheckoutError::Invalid(format!(
            "An order can contain at most {MAX_LINES} different items"
        )));
    }
    if let Some(item) = items
        .iter()
        .find(|i| i.quantity == 0 || i.quantity > MAX_LINE_QUANTITY)
    {
        if item.quantity == 0 {
            return Err(PricingError::InvalidQuantity {
                product_id: item.product_id,
            }
            .into());
        }
        return Err(CheckoutError::Invalid(format!(
            "You can order at most {MAX_LINE_QUANTITY} of each item"
        )));
    }
    Ok(())
}

fn distinct_product_ids(items: &[CartItemRequest]) -> Vec<ProductId> {
    let mut ids: Vec<ProductId> = items.iter().map(|i| i.product_id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Turn requested items into priced cart lines using database prices.
///
/// Every product must be present in `products` and active, the variant (if
/// the product has variants) must be one of them, and tracked stock must
/// cover the summed quantity across lines.
fn price_lines(items: &[CartItemRequest], products: &[Product]) -> Result<Vec<CartLine>, CheckoutError> {
    let by_id: BTreeMap<ProductId, &Product> = products.iter().map(|p| (p.id, p)).collect();
    let mut wanted: BTreeMap<ProductId, u32> = BTreeMap::new();
    let mut lines = Vec::with_capacity(items.len());

    for item in items {
        let product = by_id
            .get(&item.product_id)
            .filter(|p| p.is_active)
            .ok_or(CheckoutError::ProductUnavailable(item.product_id))?;

        let variant = clean_optional(item.variant.as_deref());
        match &variant {
            Some(v) if !product.variants.iter().any(|pv| pv == v) => {
                return Err(CheckoutError::Invalid(format!(
                    "{} is not available in {v}",
                    product.name
                )));
            }
            None if !product.variants.is_empty() => {
                return Err(CheckoutError::Invalid(format!(
                    "Please choose an option for {}",
                    product.name
                )));
            }
            _ => {}
        }

        *wanted.entry(product.id).or_default() += item.quantity;
        lines.push(CartLine {
            product_id: product.id,
            unit_price: product.effective_price(),
            quantity: item.quantity,
            variant,
        });
    }

    for (id, quantity) in wanted {
        if let Some(product) = by_id.get(&id)
            && !product.has_stock_for(quantity)
        {
            return Err(CheckoutError::OutOfStock {
                name: product.name.clone(),
            });
        }
    }

    Ok(lines)
}

/// Quantities are capped at [`MAX_LINE_QUANTITY`] before this is reached.
fn line_quantity(line: &CartLine) -> i32 {
    i32::try_from(line.quantity).unwrap_or(i32::MAX)
}

/// Run the coupon rules against a subtotal. `None` means no coupon.
fn coupon_discount(
    coupon: Option<&Coupon>,
    subtotal: Decimal,
    now: DateTime<Utc>,
) -> Result<Decimal, CheckoutError> {
    coupon.map_or(Ok(Decimal::ZERO), |c| {
        c.rule().evaluate(subtotal, now).map_err(Into::into)
    })
}

/// Price the lines twice: once to learn the subtotal the coupon is judged
/// against, then with the discount applied.
fn price_with_coupon(
    lines: &[CartLine],
    delivery_method: DeliveryMethod,
    shipping: Option<ShippingRate>,
    coupon: Option<&Coupon>,
    store: &StoreConfig,
    now: DateTime<Utc>,
) -> Result<Quote, CheckoutError> {
    let mut input = PricingInput {
        lines,
        delivery_method,
        shipping,
        discount: Decimal::ZERO,
        free_shipping_threshold: store.free_shipping_threshold,
    };
    let undiscounted = quote(&input)?;
    input.discount = coupon_discount(coupon, undiscounted.subtotal, now)?;
    Ok(quote(&input)?)
}

/// Price a cart without placing it.
///
/// # Errors
///
/// Returns a `CheckoutError` for unknown products, an unavailable zone, a
/// rejected or unknown coupon, or a cart that cannot be priced.
#[instrument(skip(pool, store, request), fields(items = request.items.len()))]
pub async fn quote_cart(
    pool: &PgPool,
    store: &StoreConfig,
    request: &QuoteRequest,
    now: DateTime<Utc>,
) -> Result<QuoteResponse, CheckoutError> {
    validate_items(&request.items)?;

    let products = ProductRepository::new(pool)
        .get_active_many(&distinct_product_ids(&request.items))
        .await?;
    let lines = price_lines(&request.items, &products)?;

    let shipping = match (request.delivery_method, request.shipping_zone_id) {
        (DeliveryMethod::Delivery, Some(zone_id)) => Some(
            ShippingZoneRepository::new(pool)
                .get(zone_id)
                .await?
                .filter(|z| z.is_active)
                .ok_or(CheckoutError::ShippingZoneUnavailable)?
                .rate(),
        ),
        _ => None,
    };

    let coupon = match clean_optional(request.coupon_code.as_deref()) {
        Some(code) => Some(
            CouponRepository::new(pool)
                .find_by_code(&code)
                .await?
                .ok_or(CheckoutError::CouponNotFound)?,
        ),
        None => None,
    };

    let priced = price_with_coupon(
        &lines,
        request.delivery_method,
        shipping,
        coupon.as_ref(),
        store,
        now,
    )?;

    Ok(QuoteResponse {
        amount_until_free_shipping: amount_until_free_shipping(
            priced.subtotal,
            store.free_shipping_threshold,
        ),
        coupon_code: coupon.map(|c| c.code),
        quote: priced,
    })
}

/// Check a coupon code against a cart subtotal.
///
/// # Errors
///
/// Returns `CheckoutError::CouponNotFound` for unknown codes and
/// `CheckoutError::Coupon` when a rule rejects it.
pub async fn validate_coupon(
    pool: &PgPool,
    code: &str,
    subtotal: Decimal,
    now: DateTime<Utc>,
) -> Result<CouponValidation, CheckoutError> {
    if subtotal < Decimal::ZERO {
        return Err(CheckoutError::Invalid("Subtotal cannot be negative".to_string()));
    }
    let coupon = CouponRepository::new(pool)
        .find_by_code(code)
        .await?
        .ok_or(CheckoutError::CouponNotFound)?;
    let discount = coupon.rule().evaluate(round_money(subtotal), now)?;

    Ok(CouponValidation {
        code: coupon.code,
        discount,
        kind: coupon.kind,
        value: coupon.value,
    })
}

/// A resubmitted key only replays the order for the customer who placed it.
fn check_replay(order: &Order, customer_email: &Email) -> Result<(), CheckoutError> {
    if order.customer_email == *customer_email {
        Ok(())
    } else {
        Err(CheckoutError::IdempotencyKeyReused)
    }
}

/// Place an order atomically and send the confirmation email afterwards.
///
/// # Errors
///
/// Returns a `CheckoutError` if validation, pricing, stock or any database
/// step fails. Nothing is written unless every step succeeds.
#[instrument(
    skip(pool, store, email, request),
    fields(items = request.items.len(), delivery = ?request.delivery_method)
)]
pub async fn place_order(
    pool: &PgPool,
    store: &StoreConfig,
    email: Option<&EmailService>,
    mut request: PlaceOrderRequest,
    now: DateTime<Utc>,
) -> Result<PlacedOrder, CheckoutError> {
    request.validate()?;

    let mut tx = pool.begin().await?;

    if let Some(key) = request.idempotency_key.as_deref()
        && let Some(order) = OrderRepository::find_by_idempotency_key(&mut tx, key).await?
    {
        if let Err(e) = check_replay(&order, &request.customer.email) {
            tx.rollback().await?;
            tracing::warn!(order_number = %order.order_number, "Idempotency key reused by another customer");
            return Err(e);
        }
        let items = OrderRepository::items_in(&mut tx, order.id).await?;
        tx.rollback().await?;
        tracing::info!(order_number = %order.order_number, "Returning previously placed order");
        return Ok(PlacedOrder {
            order: OrderWithItems { order, items },
            created: false,
        });
    }

    let products =
        ProductRepository::lock_for_checkout(&mut tx, &distinct_product_ids(&request.items))
            .await?;
    let lines = price_lines(&request.items, &products)?;

    let shipping = match request.shipping_zone_id {
        Some(zone_id) => Some(
            ShippingZoneRepository::get_active_in(&mut tx, zone_id)
                .await?
                .ok_or(CheckoutError::ShippingZoneUnavailable)?
                .rate(),
        ),
        None => None,
    };

    let coupon = match request.coupon_code.as_deref() {
        Some(code) => Some(
            CouponRepository::lock_by_code(&mut tx, code)
                .await?
                .ok_or(CheckoutError::CouponNotFound)?,
        ),
        None => None,
    };

    let priced = price_with_coupon(
        &lines,
        request.delivery_method,
        shipping,
        coupon.as_ref(),
        store,
        now,
    )?;

    let mut per_product: BTreeMap<ProductId, i32> = BTreeMap::new();
    for line in &lines {
        *per_product.entry(line.product_id).or_default() += line_quantity(line);
    }
    for (product_id, quantity) in per_product {
        if !ProductRepository::decrement_stock(&mut tx, product_id, quantity).await? {
            let name = products
                .iter()
                .find(|p| p.id == product_id)
                .map_or_else(|| product_id.to_string(), |p| p.name.clone());
            return Err(CheckoutError::OutOfStock { name });
        }
    }

    let customer = CustomerRepository::upsert(&mut tx, &request.customer, priced.total, 1).await?;

    let coupon_code = coupon.as_ref().map(|c| c.code.as_str());
    let mut attempt = 0;
    let order = loop {
        attempt += 1;
        let order_number = generate_order_number(now);
        let new_order = NewOrder {
            order_number: &order_number,
            customer_id: customer.id,
            customer_name: &request.customer.name,
            customer_email: &request.customer.email,
            customer_phone: request.customer.phone.as_deref(),
            delivery_method: request.delivery_method,
            payment_method: request.payment_method,
            shipping_zone_id: shipping.map(|s| s.zone_id),
            shipping_address: request.shipping_address.as_deref(),
            subtotal: priced.subtotal,
            shipping_fee: priced.shipping,
            discount: priced.discount,
            total: priced.total,
            coupon_code,
            notes: request.notes.as_deref(),
            idempotency_key: request.idempotency_key.as_deref(),
        };

        // Savepoint so a colliding order number can be retried.
        let mut savepoint = sqlx::Connection::begin(&mut *tx).await?;
        match OrderRepository::insert(&mut savepoint, &new_order).await {
            Ok(order) => {
                savepoint.commit().await?;
                break order;
            }
            Err(RepositoryError::Conflict(constraint))
                if constraint.contains("order_number") && attempt < ORDER_NUMBER_ATTEMPTS =>
            {
                savepoint.rollback().await?;
            }
            Err(RepositoryError::Conflict(constraint)) if constraint.contains("idempotency") => {
                return Err(RepositoryError::Conflict(
                    "This order has already been submitted".to_string(),
                )
                .into());
            }
            Err(e) => return Err(e.into()),
        }
    };

    let by_id: BTreeMap<ProductId, &Product> = products.iter().map(|p| (p.id, p)).collect();
    let mut items = Vec::with_capacity(lines.len());
    for line in &lines {
        let product_name = by_id
            .get(&line.product_id)
            .map_or("", |p| p.name.as_str());
        let item = OrderRepository::insert_item(
            &mut tx,
            order.id,
            &NewOrderItem {
                product_id: line.product_id,
                product_name,
                variant: line.variant.as_deref(),
                unit_price: line.unit_price,
                quantity: line_quantity(line),
                line_total: round_money(line.line_total()),
            },
        )
        .await?;
        items.push(item);
    }

    if let Some(coupon) = &coupon {
        CouponRepository::increment_usage(&mut tx, coupon.id).await?;
    }

    tx.commit().await?;

    tracing::info!(
        order_number = %order.order_number,
        total = %order.total,
        "Order placed"
    );

    let placed = OrderWithItems { order, items };
    if let Some(email) = email {
        let email = email.clone();
        let confirmation = placed.clone();
        tokio::spawn(async move {
            if let Err(e) = email.send_order_confirmation(&confirmation).await {
                tracing::warn!(
                    order_number = %confirmation.order.order_number,
                    error = %e,
                    "Failed to send order confirmation"
                );
            }
        });
    }

    Ok(PlacedOrder {
        order: placed,
        created: true,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use salon_shop_core::coupon::DiscountKind;
    use salon_shop_core::{CouponId, CurrencyCode, CustomerId, OrderId, OrderStatus};

    use super::*;

    fn product(id: i32, price: i64, stock: Option<i32>) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            slug: format!("product-{id}"),
            description: String::new(),
            category: "hair".to_string(),
            price: Decimal::new(price, 2),
            sale_price: None,
            image_url: None,
            variants: Vec::new(),
            stock_quantity: stock,
            is_active: true,
            is_featured: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item(id: i32, quantity: u32) -> CartItemRequest {
        CartItemRequest {
            product_id: ProductId::new(id),
            quantity,
            variant: None,
        }
    }

    fn store(threshold: Option<i64>) -> StoreConfig {
        StoreConfig {
            name: "Salon Shop".to_string(),
            currency: CurrencyCode::USD,
            free_shipping_threshold: threshold.map(|t| Decimal::new(t, 0)),
            pickup_address: None,
        }
    }

    fn coupon(kind: DiscountKind, value: i64) -> Coupon {
        Coupon {
            id: CouponId::new(1),
            code: "SAVE".to_string(),
            description: String::new(),
            kind,
            value: Decimal::new(value, 0),
            min_order_amount: None,
            max_discount: None,
            starts_at: None,
            expires_at: None,
            usage_limit: None,
            usage_count: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request() -> PlaceOrderRequest {
        PlaceOrderRequest {
            customer: CustomerDetails {
                name: "  Dana Lee ".to_string(),
                email: Email::parse("dana@example.com").unwrap(),
                phone: Some(" ".to_string()),
            },
            items: vec![item(1, 2)],
            delivery_method: DeliveryMethod::Delivery,
            shipping_zone_id: Some(ShippingZoneId::new(3)),
            shipping_address: Some(" 12 High St ".to_string()),
            coupon_code: Some("  ".to_string()),
            payment_method: PaymentMethod::CashOnDelivery,
            notes: None,
            idempotency_key: Some("abc".to_string()),
        }
    }

    #[test]
    fn test_validate_trims_fields() {
        let mut req = request();
        req.validate().unwrap();
        assert_eq!(req.customer.name, "Dana Lee");
        assert_eq!(req.customer.phone, None);
        assert_eq!(req.shipping_address.as_deref(), Some("12 High St"));
        assert_eq!(req.coupon_code, None);
    }

    #[test]
    fn test_validate_delivery_requires_zone_and_address() {
        let mut req = request();
        req.shipping_zone_id = None;
        assert!(matches!(
            req.validate(),
            Err(CheckoutError::Pricing(PricingError::MissingShippingZone))
        ));

        let mut req = request();
        req.shipping_address = Some("   ".to_string());
        assert!(matches!(req.validate(), Err(CheckoutError::Invalid(_))));
    }

    #[test]
    fn test_validate_pickup_drops_shipping_fields() {
        let mut req = request();
        req.delivery_method = DeliveryMethod::Pickup;
        req.validate().unwrap();
        assert_eq!(req.shipping_zone_id, None);
        assert_eq!(req.shipping_address, None);
    }

    #[test]
    fn test_validate_items_quantity_bounds() {
        assert!(matches!(
            validate_items(&[]),
            Err(CheckoutError::Pricing(PricingError::EmptyCart))
        ));
        assert!(matches!(
            validate_items(&[item(1, 0)]),
            Err(CheckoutError::Pricing(PricingError::InvalidQuantity { .. }))
        ));
        assert!(matches!(
            validate_items(&[item(1, 100)]),
            Err(CheckoutError::Invalid(_))
        ));
        assert!(validate_items(&[item(1, 99)]).is_ok());
    }

    #[test]
    fn test_price_lines_uses_database_prices() {
        let mut discounted = product(1, 2000, None);
        discounted.sale_price = Some(Decimal::new(1500, 2));
        let lines = price_lines(&[item(1, 2)], &[discounted]).unwrap();
        assert_eq!(lines[0].unit_price, Decimal::new(1500, 2));
    }

    #[test]
    fn test_price_lines_rejects_unknown_and_inactive() {
        let mut inactive = product(2, 1000, None);
        inactive.is_active = false;
        assert!(matches!(
            price_lines(&[item(9, 1)], &[product(1, 1000, None)]),
            Err(CheckoutError::ProductUnavailable(id)) if id == ProductId::new(9)
        ));
        assert!(matches!(
            price_lines(&[item(2, 1)], &[inactive]),
            Err(CheckoutError::ProductUnavailable(_))
        ));
    }

    #[test]
    fn test_price_lines_sums_stock_across_variants() {
        let mut p = product(1, 1000, Some(3));
        p.variants = vec!["50ml".to_string(), "100ml".to_string()];
        let items = [
            CartItemRequest {
                variant: Some("50ml".to_string()),
                ..item(1, 2)
            },
            CartItemRequest {
                variant: Some("100ml".to_string()),
                ..item(1, 2)
            },
        ];
        let err = price_lines(&items, &[p]).unwrap_err();
        assert_eq!(err.to_string(), "Product 1 is out of stock");
    }

    #[test]
    fn test_price_lines_requires_known_variant() {
        let mut p = product(1, 1000, None);
        p.variants = vec!["50ml".to_string()];
        assert!(matches!(
            price_lines(&[item(1, 1)], std::slice::from_ref(&p)),
            Err(CheckoutError::Invalid(_))
        ));
        let wrong = CartItemRequest {
            variant: Some("1l".to_string()),
            ..item(1, 1)
        };
        assert!(matches!(
            price_lines(&[wrong], &[p]),
            Err(CheckoutError::Invalid(_))
        ));
    }

    #[test]
    fn test_price_with_coupon_and_free_shipping() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let lines = price_lines(&[item(1, 3)], &[product(1, 2000, None)]).unwrap();
        let rate = ShippingRate {
            zone_id: ShippingZoneId::new(1),
            base_fee: Decimal::new(5, 0),
        };

        // 60 subtotal, below the 100 threshold: pays shipping, 10% off.
        let q = price_with_coupon(
            &lines,
            DeliveryMethod::Delivery,
            Some(rate),
            Some(&coupon(DiscountKind::Percentage, 10)),
            &store(Some(100)),
            now,
        )
        .unwrap();
        assert_eq!(q.subtotal, Decimal::new(60, 0));
        assert_eq!(q.shipping, Decimal::new(5, 0));
        assert_eq!(q.discount, Decimal::new(6, 0));
        assert_eq!(q.total, Decimal::new(59, 0));

        // Threshold met exactly: free shipping.
        let q = price_with_coupon(
            &lines,
            DeliveryMethod::Delivery,
            Some(rate),
            None,
            &store(Some(60)),
            now,
        )
        .unwrap();
        assert_eq!(q.shipping, Decimal::ZERO);
        assert!(q.free_shipping_applied);
    }

    #[test]
    fn test_fixed_coupon_never_makes_total_negative() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let lines = price_lines(&[item(1, 1)], &[product(1, 500, None)]).unwrap();
        let q = price_with_coupon(
            &lines,
            DeliveryMethod::Pickup,
            None,
            Some(&coupon(DiscountKind::FixedAmount, 50)),
            &store(None),
            now,
        )
        .unwrap();
        assert_eq!(q.discount, Decimal::new(500, 2));
        assert_eq!(q.total, Decimal::ZERO);
    }

    #[test]
    fn test_rejected_coupon_surfaces_message() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let mut expired = coupon(DiscountKind::Percentage, 10);
        expired.expires_at = Some(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
        let err = coupon_discount(Some(&expired), Decimal::new(50, 0), now).unwrap_err();
        assert_eq!(err.to_string(), "This coupon has expired");
    }

    fn placed_order(email: &str) -> Order {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        Order {
            id: OrderId::new(1),
            order_number: "ORD-20260301-AAAAAA".to_string(),
            customer_id: CustomerId::new(1),
            customer_name: "Maya".to_string(),
            customer_email: Email::parse(email).unwrap(),
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
        }
    }

    #[test]
    fn test_replay_requires_same_customer() {
        let order = placed_order("maya@example.com");
        check_replay(&order, &Email::parse("maya@example.com").unwrap()).unwrap();
        check_replay(&order, &Email::parse(" Maya@Example.com ").unwrap()).unwrap();
        assert!(matches!(
            check_replay(&order, &Email::parse("someone@example.com").unwrap()),
            Err(CheckoutError::IdempotencyKeyReused)
        ));
    }

    #[test]
    fn test_distinct_product_ids_sorted() {
        let ids = distinct_product_ids(&[item(3, 1), item(1, 1), item(3, 2)]);
        assert_eq!(ids, vec![ProductId::new(1), ProductId::new(3)]);
    }
}
