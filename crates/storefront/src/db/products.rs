//! Product repository.
//!
//! Public reads only ever see active products. Checkout locks the rows it
//! prices (`FOR UPDATE`) so stock decrements and price snapshots happen
//! against the same state.

use salon_shop_core::ProductId;
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use super::{RepositoryError, expect_deleted, like_pattern, map_delete_error, map_write_error};
use crate::api::PageParams;
use crate::models::{Product, ProductInput};

const PRODUCT_COLUMNS: &str = r"
    id, name, slug, description, category, price, sale_price, image_url,
    variants, stock_quantity, is_active, is_featured, created_at, updated_at
";

const DUPLICATE_SLUG: &str = "A product with this slug already exists";

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

impl ProductSort {
    const fn order_by(self) -> &'static str {
        match self {
            Self::Newest => "created_at DESC, id DESC",
            Self::PriceAsc => "COALESCE(sale_price, price) ASC, id",
            Self::PriceDesc => "COALESCE(sale_price, price) DESC, id",
            Self::Name => "name ASC, id",
        }
    }
}

/// Listing filters. `include_inactive` is only set by the admin API.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub featured_only: bool,
    pub sort: ProductSort,
    pub include_inactive: bool,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of products matching `filter`, plus the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: PageParams,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        const WHERE: &str = r"
            WHERE ($1 OR is_active)
              AND ($2::text IS NULL OR category = $2)
              AND ($3::text IS NULL OR name ILIKE $3 OR description ILIKE $3)
              AND (NOT $4 OR is_featured)
        ";
        let search = filter.search.as_deref().map(like_pattern);

        let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM shop.products {WHERE}"))
            .bind(filter.include_inactive)
            .bind(filter.category.as_deref())
            .bind(search.as_deref())
            .bind(filter.featured_only)
            .fetch_one(self.pool)
            .await?;

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products {WHERE} ORDER BY {} LIMIT $5 OFFSET $6",
            filter.sort.order_by()
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(filter.include_inactive)
            .bind(filter.category.as_deref())
            .bind(search.as_deref())
            .bind(filter.featured_only)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        Ok((products, total))
    }

    /// Distinct categories of active products, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn categories(&self) -> Result<Vec<String>, RepositoryError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r"
            SELECT DISTINCT category FROM shop.products
            WHERE is_active AND category <> ''
            ORDER BY category
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|(c,)| c).collect())
    }

    /// Get a product by ID regardless of status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Get an active product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.get(id).await?.filter(|p| p.is_active))
    }

    /// Active products with the given IDs (unknown or inactive IDs are absent).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let raw: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products WHERE id = ANY($1) AND is_active"
        ))
        .bind(&raw)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            r"
            INSERT INTO shop.products
                (name, slug, description, category, price, sale_price, image_url,
                 variants, stock_quantity, is_active, is_featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(input.name.trim())
        .bind(input.slug.trim())
        .bind(&input.description)
        .bind(input.category.trim())
        .bind(input.price)
        .bind(input.sale_price)
        .bind(input.image_url.as_deref())
        .bind(&input.variants)
        .bind(input.stock_quantity)
        .bind(input.is_active)
        .bind(input.is_featured)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_SLUG))
    }

    /// Replace a product's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist and
    /// `RepositoryError::Conflict` if the slug is taken.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: ProductId, input: &ProductInput) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            r"
            UPDATE shop.products SET
                name = $2, slug = $3, description = $4, category = $5, price = $6,
                sale_price = $7, image_url = $8, variants = $9, stock_quantity = $10,
                is_active = $11, is_featured = $12, updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(input.name.trim())
        .bind(input.slug.trim())
        .bind(&input.description)
        .bind(input.category.trim())
        .bind(input.price)
        .bind(input.sale_price)
        .bind(input.image_url.as_deref())
        .bind(&input.variants)
        .bind(input.stock_quantity)
        .bind(input.is_active)
        .bind(input.is_featured)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_SLUG))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if orders reference it; deactivate
    /// it instead.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| map_delete_error(e, "Product"))?;

        expect_deleted(result.rows_affected())
    }

    /// Lock the given products for the rest of the transaction.
    ///
    /// Rows are locked in id order so concurrent checkouts cannot deadlock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lock_for_checkout(
        conn: &mut PgConnection,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, RepositoryError> {
        let raw: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let products = sqlx::query_as::<_, Product>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS} FROM shop.products
            WHERE id = ANY($1)
            ORDER BY id
            FOR UPDATE
            "
        ))
        .bind(&raw)
        .fetch_all(conn)
        .await?;

        Ok(products)
    }

    /// Take `quantity` units out of stock. Untracked products are untouched.
    ///
    /// Returns `false` when a tracked product has too little stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn decrement_stock(
        conn: &mut PgConnection,
        id: ProductId,
        quantity: i32,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.products
            SET stock_quantity = stock_quantity - $2, updated_at = NOW()
            WHERE id = $1 AND (stock_quantity IS NULL OR stock_quantity >= $2)
            ",
        )
        .bind(id)
        .bind(quantity)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Put `quantity` units back (cancelled orders). Untracked products stay
    /// untracked.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn restock(
        conn: &mut PgConnection,
        id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE shop.products
            SET stock_quantity = stock_quantity + $2, updated_at = NOW()
            WHERE id = $1 AND stock_quantity IS NOT NULL
            ",
        )
        .bind(id)
        .bind(quantity)
        .execute(conn)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parses_snake_case() {
        let sort: ProductSort = serde_json::from_str("\"price_desc\"").unwrap();
        assert_eq!(sort, ProductSort::PriceDesc);
        assert_eq!(ProductSort::default(), ProductSort::Newest);
    }

    #[test]
    fn test_price_sort_uses_effective_price() {
        assert!(ProductSort::PriceAsc.order_by().contains("COALESCE(sale_price, price)"));
    }
}
