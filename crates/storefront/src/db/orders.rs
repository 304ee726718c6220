//! Order repository.
//!
//! Orders are only ever written inside the checkout transaction (insert) or
//! an admin status change (update); both take a connection rather than the
//! pool so the caller controls the transaction.

use rust_decimal::Decimal;
use salon_shop_core::pricing::DeliveryMethod;
use salon_shop_core::{
    CustomerId, Email, OrderId, OrderStatus, PaymentMethod, ProductId, ShippingZoneId,
};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use super::{RepositoryError, like_pattern};
use crate::api::PageParams;
use crate::models::{Order, OrderItem, OrderWithItems};

const ORDER_COLUMNS: &str = r"
    id, order_number, customer_id, customer_name, customer_email, customer_phone, status,
    delivery_method, payment_method, shipping_zone_id, shipping_address, subtotal,
    shipping_fee, discount, total, coupon_code, notes, idempotency_key, created_at, updated_at
";

const ITEM_COLUMNS: &str = r"
    id, order_id, product_id, product_name, variant, unit_price, quantity, line_total
";

/// Everything needed to write an order row.
#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    pub order_number: &'a str,
    pub customer_id: CustomerId,
    pub customer_name: &'a str,
    pub customer_email: &'a Email,
    pub customer_phone: Option<&'a str>,
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,
    pub shipping_zone_id: Option<ShippingZoneId>,
    pub shipping_address: Option<&'a str>,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub coupon_code: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub idempotency_key: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem<'a> {
    pub product_id: ProductId,
    pub product_name: &'a str,
    pub variant: Option<&'a str>,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}

/// Admin listing filters.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Matches order number, customer name or email.
    pub search: Option<String>,
}

pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// An order previously placed with this idempotency key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_idempotency_key(
        conn: &mut PgConnection,
        key: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders WHERE idempotency_key = $1"
        ))
        .bind(key)
        .fetch_optional(conn)
        .await?;

        Ok(order)
    }

    /// Insert the order row with status `pending`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order number or idempotency
    /// key is already taken.
    #[instrument(skip(conn, order), fields(order_number = order.order_number))]
    pub async fn insert(conn: &mut PgConnection, order: &NewOrder<'_>) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(&format!(
            r"
            INSERT INTO shop.orders
                (order_number, customer_id, customer_name, customer_email, customer_phone,
                 delivery_method, payment_method, shipping_zone_id, shipping_address,
                 subtotal, shipping_fee, discount, total, coupon_code, notes, idempotency_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(order.order_number)
        .bind(order.customer_id)
        .bind(order.customer_name)
        .bind(order.customer_email)
        .bind(order.customer_phone)
        .bind(order.delivery_method)
        .bind(order.payment_method)
        .bind(order.shipping_zone_id)
        .bind(order.shipping_address)
        .bind(order.subtotal)
        .bind(order.shipping_fee)
        .bind(order.discount)
        .bind(order.total)
        .bind(order.coupon_code)
        .bind(order.notes)
        .bind(order.idempotency_key)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(
                    db_err.constraint().unwrap_or("orders").to_owned(),
                );
            }
            RepositoryError::Database(e)
        })
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_item(
        conn: &mut PgConnection,
        order_id: OrderId,
        item: &NewOrderItem<'_>,
    ) -> Result<OrderItem, RepositoryError> {
        let item = sqlx::query_as::<_, OrderItem>(&format!(
            r"
            INSERT INTO shop.order_items
                (order_id, product_id, product_name, variant, unit_price, quantity, line_total)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ITEM_COLUMNS}
            "
        ))
        .bind(order_id)
        .bind(item.product_id)
        .bind(item.product_name)
        .bind(item.variant)
        .bind(item.unit_price)
        .bind(item.quantity)
        .bind(item.line_total)
        .fetch_one(conn)
        .await?;

        Ok(item)
    }

    /// Line items of an order, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items_in(
        conn: &mut PgConnection,
        order_id: OrderId,
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM shop.order_items WHERE order_id = $1 ORDER BY id"
        ))
        .bind(order_id)
        .fetch_all(conn)
        .await?;

        Ok(items)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::items_in(&mut conn, order_id).await
    }

    /// The customer's orders with their items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_email(&self, email: &Email) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            r"
            SELECT {ORDER_COLUMNS} FROM shop.orders
            WHERE customer_email = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 100
            "
        ))
        .bind(email)
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i32> = orders.iter().map(|o| o.id.as_i32()).collect();
        let mut items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM shop.order_items WHERE order_id = ANY($1) ORDER BY id"
        ))
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        Ok(orders
            .into_iter()
            .map(|order| {
                let (mine, rest): (Vec<_>, Vec<_>) =
                    items.drain(..).partition(|item| item.order_id == order.id);
                items = rest;
                OrderWithItems { order, items: mine }
            })
            .collect())
    }

    /// Look up an order by its public number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_number(&self, order_number: &str) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders WHERE order_number = $1"
        ))
        .bind(order_number.trim().to_ascii_uppercase())
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// One page of orders for the admin API, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &OrderFilter,
        page: PageParams,
    ) -> Result<(Vec<Order>, i64), RepositoryError> {
        const WHERE: &str = r"
            WHERE ($1::shop.order_status IS NULL OR status = $1)
              AND ($2::text IS NULL OR order_number ILIKE $2
                   OR customer_name ILIKE $2 OR customer_email ILIKE $2)
        ";
        let search = filter.search.as_deref().map(like_pattern);

        let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM shop.orders {WHERE}"))
            .bind(filter.status)
            .bind(search.as_deref())
            .fetch_one(self.pool)
            .await?;

        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders {WHERE} ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"
        ))
        .bind(filter.status)
        .bind(search.as_deref())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok((orders, total))
    }

    /// Lock an order row for a status change.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lock(conn: &mut PgConnection, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(order)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_status(
        conn: &mut PgConnection,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(&format!(
            r"
            UPDATE shop.orders SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(conn)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
