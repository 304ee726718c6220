//! Promotion repository.

use chrono::{DateTime, Utc};
use salon_shop_core::PromotionId;
use sqlx::PgPool;

use super::{RepositoryError, expect_deleted, map_delete_error, map_write_error};
use crate::models::{Promotion, PromotionInput};

const PROMOTION_COLUMNS: &str = r"
    id, title, description, image_url, link_url, coupon_code, starts_at, ends_at,
    is_active, sort_order, created_at, updated_at
";

pub struct PromotionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PromotionRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active promotions whose date window contains `now`. Open-ended
    /// windows count as running.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_current(&self, now: DateTime<Utc>) -> Result<Vec<Promotion>, RepositoryError> {
        let promotions = sqlx::query_as::<_, Promotion>(&format!(
            r"
            SELECT {PROMOTION_COLUMNS} FROM shop.promotions
            WHERE is_active
              AND (starts_at IS NULL OR starts_at <= $1)
              AND (ends_at IS NULL OR ends_at > $1)
            ORDER BY sort_order, id
            "
        ))
        .bind(now)
        .fetch_all(self.pool)
        .await?;

        Ok(promotions)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Promotion>, RepositoryError> {
        let promotions = sqlx::query_as::<_, Promotion>(&format!(
            "SELECT {PROMOTION_COLUMNS} FROM shop.promotions ORDER BY sort_order, id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(promotions)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PromotionId) -> Result<Option<Promotion>, RepositoryError> {
        let promotion = sqlx::query_as::<_, Promotion>(&format!(
            "SELECT {PROMOTION_COLUMNS} FROM shop.promotions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(promotion)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &PromotionInput) -> Result<Promotion, RepositoryError> {
        sqlx::query_as::<_, Promotion>(&format!(
            r"
            INSERT INTO shop.promotions
                (title, description, image_url, link_url, coupon_code, starts_at, ends_at,
                 is_active, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PROMOTION_COLUMNS}
            "
        ))
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(input.image_url.as_deref())
        .bind(input.link_url.as_deref())
        .bind(input.coupon_code.as_deref())
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(input.is_active)
        .bind(input.sort_order)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "Promotion already exists"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the promotion does not exist.
    pub async fn update(
        &self,
        id: PromotionId,
        input: &PromotionInput,
    ) -> Result<Promotion, RepositoryError> {
        sqlx::query_as::<_, Promotion>(&format!(
            r"
            UPDATE shop.promotions SET
                title = $2, description = $3, image_url = $4, link_url = $5, coupon_code = $6,
                starts_at = $7, ends_at = $8, is_active = $9, sort_order = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {PROMOTION_COLUMNS}
            "
        ))
        .bind(id)
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(input.image_url.as_deref())
        .bind(input.link_url.as_deref())
        .bind(input.coupon_code.as_deref())
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(input.is_active)
        .bind(input.sort_order)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the promotion does not exist.
    pub async fn delete(&self, id: PromotionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.promotions WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| map_delete_error(e, "Promotion"))?;

        expect_deleted(result.rows_affected())
    }
}
