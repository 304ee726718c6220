//! Coupon repository.
//!
//! Codes are stored uppercase (enforced by a check constraint) and looked up
//! by their normalized form.

use salon_shop_core::CouponId;
use salon_shop_core::coupon::normalize_code;
use sqlx::{PgConnection, PgPool};

use super::{RepositoryError, expect_deleted, map_delete_error, map_write_error};
use crate::models::{Coupon, CouponInput};

const COUPON_COLUMNS: &str = r"
    id, code, description, kind, value, min_order_amount, max_discount,
    starts_at, expires_at, usage_limit, usage_count, is_active, created_at, updated_at
";

const DUPLICATE_CODE: &str = "A coupon with this code already exists";

/// Repository for coupons.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find a coupon by code (any case, surrounding whitespace ignored).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, RepositoryError> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM shop.coupons WHERE code = $1"
        ))
        .bind(normalize_code(code))
        .fetch_optional(self.pool)
        .await?;

        Ok(coupon)
    }

    /// Find and lock a coupon inside a checkout transaction so its usage
    /// count cannot be raced past the limit.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lock_by_code(
        conn: &mut PgConnection,
        code: &str,
    ) -> Result<Option<Coupon>, RepositoryError> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM shop.coupons WHERE code = $1 FOR UPDATE"
        ))
        .bind(normalize_code(code))
        .fetch_optional(conn)
        .await?;

        Ok(coupon)
    }

    /// Count one redemption.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn increment_usage(conn: &mut PgConnection, id: CouponId) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE shop.coupons SET usage_count = usage_count + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Coupon>, RepositoryError> {
        let coupons = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM shop.coupons ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(coupons)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CouponId) -> Result<Option<Coupon>, RepositoryError> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM shop.coupons WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(coupon)
    }

    /// Create a coupon. `input` must already be validated (code normalized).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code exists.
    pub async fn create(&self, input: &CouponInput) -> Result<Coupon, RepositoryError> {
        sqlx::query_as::<_, Coupon>(&format!(
            r"
            INSERT INTO shop.coupons
                (code, description, kind, value, min_order_amount, max_discount,
                 starts_at, expires_at, usage_limit, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {COUPON_COLUMNS}
            "
        ))
        .bind(&input.code)
        .bind(&input.description)
        .bind(input.kind)
        .bind(input.value)
        .bind(input.min_order_amount)
        .bind(input.max_discount)
        .bind(input.starts_at)
        .bind(input.expires_at)
        .bind(input.usage_limit)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_CODE))
    }

    /// Replace a coupon's rules. The usage count is kept.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` or `RepositoryError::Conflict`.
    pub async fn update(&self, id: CouponId, input: &CouponInput) -> Result<Coupon, RepositoryError> {
        sqlx::query_as::<_, Coupon>(&format!(
            r"
            UPDATE shop.coupons SET
                code = $2, description = $3, kind = $4, value = $5, min_order_amount = $6,
                max_discount = $7, starts_at = $8, expires_at = $9, usage_limit = $10,
                is_active = $11, updated_at = NOW()
            WHERE id = $1
            RETURNING {COUPON_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&input.code)
        .bind(&input.description)
        .bind(input.kind)
        .bind(input.value)
        .bind(input.min_order_amount)
        .bind(input.max_discount)
        .bind(input.starts_at)
        .bind(input.expires_at)
        .bind(input.usage_limit)
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_CODE))?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon does not exist.
    pub async fn delete(&self, id: CouponId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.coupons WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| map_delete_error(e, "Coupon"))?;

        expect_deleted(result.rows_affected())
    }
}
