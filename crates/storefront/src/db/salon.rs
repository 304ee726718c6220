//! Salon service and stylist repositories.

use salon_shop_core::{ServiceId, StylistId};
use sqlx::PgPool;

use super::{RepositoryError, expect_deleted, map_delete_error, map_write_error};
use crate::models::{SalonService, SalonServiceInput, Stylist, StylistInput};

const SERVICE_COLUMNS: &str = r"
    id, name, description, category, duration_minutes, price, image_url, is_active,
    sort_order, created_at, updated_at
";

const STYLIST_COLUMNS: &str = r"
    id, name, title, bio, image_url, specialties, is_active, sort_order, created_at, updated_at
";

pub struct ServiceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ServiceRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Services on the menu, grouped by category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, include_inactive: bool) -> Result<Vec<SalonService>, RepositoryError> {
        let services = sqlx::query_as::<_, SalonService>(&format!(
            r"
            SELECT {SERVICE_COLUMNS} FROM shop.services
            WHERE $1 OR is_active
            ORDER BY category, sort_order, name
            "
        ))
        .bind(include_inactive)
        .fetch_all(self.pool)
        .await?;

        Ok(services)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ServiceId) -> Result<Option<SalonService>, RepositoryError> {
        let service = sqlx::query_as::<_, SalonService>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM shop.services WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(service)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active(&self, id: ServiceId) -> Result<Option<SalonService>, RepositoryError> {
        Ok(self.get(id).await?.filter(|s| s.is_active))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &SalonServiceInput) -> Result<SalonService, RepositoryError> {
        sqlx::query_as::<_, SalonService>(&format!(
            r"
            INSERT INTO shop.services
                (name, description, category, duration_minutes, price, image_url, is_active, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {SERVICE_COLUMNS}
            "
        ))
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.category.trim())
        .bind(input.duration_minutes)
        .bind(input.price)
        .bind(input.image_url.as_deref())
        .bind(input.is_active)
        .bind(input.sort_order)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "Service already exists"))
    }

    /// Existing appointments keep the duration they were booked with.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the service does not exist.
    pub async fn update(
        &self,
        id: ServiceId,
        input: &SalonServiceInput,
    ) -> Result<SalonService, RepositoryError> {
        sqlx::query_as::<_, SalonService>(&format!(
            r"
            UPDATE shop.services SET
                name = $2, description = $3, category = $4, duration_minutes = $5, price = $6,
                image_url = $7, is_active = $8, sort_order = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING {SERVICE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.category.trim())
        .bind(input.duration_minutes)
        .bind(input.price)
        .bind(input.image_url.as_deref())
        .bind(input.is_active)
        .bind(input.sort_order)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if appointments reference it.
    pub async fn delete(&self, id: ServiceId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.services WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| map_delete_error(e, "Service"))?;

        expect_deleted(result.rows_affected())
    }
}

pub struct StylistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StylistRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, include_inactive: bool) -> Result<Vec<Stylist>, RepositoryError> {
        let stylists = sqlx::query_as::<_, Stylist>(&format!(
            "SELECT {STYLIST_COLUMNS} FROM shop.stylists WHERE $1 OR is_active ORDER BY sort_order, name"
        ))
        .bind(include_inactive)
        .fetch_all(self.pool)
        .await?;

        Ok(stylists)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: StylistId) -> Result<Option<Stylist>, RepositoryError> {
        let stylist = sqlx::query_as::<_, Stylist>(&format!(
            "SELECT {STYLIST_COLUMNS} FROM shop.stylists WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(stylist)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active(&self, id: StylistId) -> Result<Option<Stylist>, RepositoryError> {
        Ok(self.get(id).await?.filter(|s| s.is_active))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &StylistInput) -> Result<Stylist, RepositoryError> {
        sqlx::query_as::<_, Stylist>(&format!(
            r"
            INSERT INTO shop.stylists (name, title, bio, image_url, specialties, is_active, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {STYLIST_COLUMNS}
            "
        ))
        .bind(input.name.trim())
        .bind(input.title.trim())
        .bind(&input.bio)
        .bind(input.image_url.as_deref())
        .bind(&input.specialties)
        .bind(input.is_active)
        .bind(input.sort_order)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "Stylist already exists"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the stylist does not exist.
    pub async fn update(&self, id: StylistId, input: &StylistInput) -> Result<Stylist, RepositoryError> {
        sqlx::query_as::<_, Stylist>(&format!(
            r"
            UPDATE shop.stylists SET
                name = $2, title = $3, bio = $4, image_url = $5, specialties = $6,
                is_active = $7, sort_order = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {STYLIST_COLUMNS}
            "
        ))
        .bind(id)
        .bind(input.name.trim())
        .bind(input.title.trim())
        .bind(&input.bio)
        .bind(input.image_url.as_deref())
        .bind(&input.specialties)
        .bind(input.is_active)
        .bind(input.sort_order)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if appointments reference it.
    pub async fn delete(&self, id: StylistId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.stylists WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| map_delete_error(e, "Stylist"))?;

        expect_deleted(result.rows_affected())
    }
}
