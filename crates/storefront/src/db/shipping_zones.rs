//! Shipping zone repository.

use salon_shop_core::ShippingZoneId;
use sqlx::{PgConnection, PgPool};

use super::{RepositoryError, expect_deleted, map_delete_error, map_write_error};
use crate::models::{ShippingZone, ShippingZoneInput};

const ZONE_COLUMNS: &str = r"
    id, name, region, base_fee, estimated_days, is_active, sort_order, created_at, updated_at
";

const DUPLICATE_ZONE: &str = "A shipping zone with this name already exists in the region";

/// Repository for shipping zones.
pub struct ShippingZoneRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShippingZoneRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active zones, grouped by region then by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<ShippingZone>, RepositoryError> {
        let zones = sqlx::query_as::<_, ShippingZone>(&format!(
            "SELECT {ZONE_COLUMNS} FROM shop.shipping_zones WHERE is_active ORDER BY region, sort_order, name"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(zones)
    }

    /// Every zone, for the admin API.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<ShippingZone>, RepositoryError> {
        let zones = sqlx::query_as::<_, ShippingZone>(&format!(
            "SELECT {ZONE_COLUMNS} FROM shop.shipping_zones ORDER BY region, sort_order, name"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(zones)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ShippingZoneId) -> Result<Option<ShippingZone>, RepositoryError> {
        let zone = sqlx::query_as::<_, ShippingZone>(&format!(
            "SELECT {ZONE_COLUMNS} FROM shop.shipping_zones WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(zone)
    }

    /// Active zone by ID inside a checkout transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active_in(
        conn: &mut PgConnection,
        id: ShippingZoneId,
    ) -> Result<Option<ShippingZone>, RepositoryError> {
        let zone = sqlx::query_as::<_, ShippingZone>(&format!(
            "SELECT {ZONE_COLUMNS} FROM shop.shipping_zones WHERE id = $1 AND is_active"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(zone)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate region/name pair.
    pub async fn create(&self, input: &ShippingZoneInput) -> Result<ShippingZone, RepositoryError> {
        sqlx::query_as::<_, ShippingZone>(&format!(
            r"
            INSERT INTO shop.shipping_zones (name, region, base_fee, estimated_days, is_active, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ZONE_COLUMNS}
            "
        ))
        .bind(input.name.trim())
        .bind(input.region.trim())
        .bind(input.base_fee)
        .bind(input.estimated_days.as_deref())
        .bind(input.is_active)
        .bind(input.sort_order)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_ZONE))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` or `RepositoryError::Conflict`.
    pub async fn update(
        &self,
        id: ShippingZoneId,
        input: &ShippingZoneInput,
    ) -> Result<ShippingZone, RepositoryError> {
        sqlx::query_as::<_, ShippingZone>(&format!(
            r"
            UPDATE shop.shipping_zones SET
                name = $2, region = $3, base_fee = $4, estimated_days = $5,
                is_active = $6, sort_order = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {ZONE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(input.name.trim())
        .bind(input.region.trim())
        .bind(input.base_fee)
        .bind(input.estimated_days.as_deref())
        .bind(input.is_active)
        .bind(input.sort_order)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_ZONE))?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if orders reference the zone.
    pub async fn delete(&self, id: ShippingZoneId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.shipping_zones WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| map_delete_error(e, "Shipping zone"))?;

        expect_deleted(result.rows_affected())
    }
}
