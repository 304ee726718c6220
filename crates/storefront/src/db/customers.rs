//! Customer repository.

use rust_decimal::Decimal;
use salon_shop_core::{CustomerId, RewardTier};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use super::{RepositoryError, like_pattern};
use crate::api::PageParams;
use crate::models::{Customer, CustomerDetails, CustomerUpdate, clean_optional};

const CUSTOMER_COLUMNS: &str = r"
    id, name, email, phone, reward_tier, notes, order_count, total_spent, created_at, updated_at
";

/// Admin listing filters.
#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    /// Matches name, email or phone.
    pub search: Option<String>,
    pub tier: Option<RewardTier>,
}

pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert or refresh the customer keyed by `details.email`.
    ///
    /// Name and phone are refreshed from the latest submission (a missing
    /// phone keeps the stored one). `spent` and `orders` are added to the
    /// running totals; bookings pass zero for both.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(conn, details), fields(email = %details.email))]
    pub async fn upsert(
        conn: &mut PgConnection,
        details: &CustomerDetails,
        spent: Decimal,
        orders: i32,
    ) -> Result<Customer, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            r"
            INSERT INTO shop.customers (name, email, phone, order_count, total_spent)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO UPDATE SET
                name = EXCLUDED.name,
                phone = COALESCE(EXCLUDED.phone, shop.customers.phone),
                order_count = shop.customers.order_count + EXCLUDED.order_count,
                total_spent = shop.customers.total_spent + EXCLUDED.total_spent,
                updated_at = NOW()
            RETURNING {CUSTOMER_COLUMNS}
            "
        ))
        .bind(&details.name)
        .bind(&details.email)
        .bind(details.phone.as_deref())
        .bind(orders)
        .bind(spent)
        .fetch_one(conn)
        .await?;

        Ok(customer)
    }

    /// Subtract a cancelled order from the customer's totals.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn reverse_order(
        conn: &mut PgConnection,
        id: CustomerId,
        amount: Decimal,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE shop.customers SET
                order_count = GREATEST(order_count - 1, 0),
                total_spent = GREATEST(total_spent - $2, 0),
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(amount)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// One page of customers, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &CustomerFilter,
        page: PageParams,
    ) -> Result<(Vec<Customer>, i64), RepositoryError> {
        const WHERE: &str = r"
            WHERE ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1 OR phone ILIKE $1)
              AND ($2::shop.reward_tier IS NULL OR reward_tier = $2)
        ";
        let search = filter.search.as_deref().map(like_pattern);

        let (total,): (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM shop.customers {WHERE}"))
                .bind(search.as_deref())
                .bind(filter.tier)
                .fetch_one(self.pool)
                .await?;

        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM shop.customers {WHERE} ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"
        ))
        .bind(search.as_deref())
        .bind(filter.tier)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok((customers, total))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM shop.customers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(customer)
    }

    /// Apply an admin edit. Absent fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    pub async fn update(
        &self,
        id: CustomerId,
        update: &CustomerUpdate,
    ) -> Result<Customer, RepositoryError> {
        // An empty string clears phone/notes; NULL (absent) keeps them.
        let phone = update.phone.as_deref().map(|p| p.trim().to_owned());
        let notes = update.notes.as_deref().map(|n| n.trim().to_owned());

        sqlx::query_as::<_, Customer>(&format!(
            r"
            UPDATE shop.customers SET
                name = COALESCE($2, name),
                phone = CASE WHEN $3::text IS NULL THEN phone ELSE NULLIF($3, '') END,
                reward_tier = COALESCE($4, reward_tier),
                notes = CASE WHEN $5::text IS NULL THEN notes ELSE NULLIF($5, '') END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CUSTOMER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(clean_optional(update.name.as_deref()))
        .bind(phone)
        .bind(update.reward_tier)
        .bind(notes)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
