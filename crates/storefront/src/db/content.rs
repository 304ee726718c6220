//! Repositories for marketing content.

use salon_shop_core::{BannerId, ContentBlockId, FaqId, TestimonialId};
use sqlx::PgPool;

use super::{RepositoryError, expect_deleted, map_delete_error, map_write_error};
use crate::models::{
    Banner, BannerInput, ContentBlock, ContentBlockInput, Faq, FaqInput, Testimonial,
    TestimonialInput,
};

const BANNER_COLUMNS: &str = r"
    id, title, subtitle, image_url, link_url, button_text, is_active, sort_order,
    created_at, updated_at
";

const FAQ_COLUMNS: &str = r"
    id, question, answer, category, is_active, sort_order, created_at, updated_at
";

const TESTIMONIAL_COLUMNS: &str = r"
    id, customer_name, content, rating, image_url, is_active, sort_order, created_at, updated_at
";

const CONTENT_BLOCK_COLUMNS: &str = r"
    id, key, title, body, is_published, created_at, updated_at
";

pub struct BannerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BannerRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Banners shown on the storefront, or all of them for the admin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, include_inactive: bool) -> Result<Vec<Banner>, RepositoryError> {
        let banners = sqlx::query_as::<_, Banner>(&format!(
            "SELECT {BANNER_COLUMNS} FROM shop.banners WHERE $1 OR is_active ORDER BY sort_order, id"
        ))
        .bind(include_inactive)
        .fetch_all(self.pool)
        .await?;

        Ok(banners)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: BannerId) -> Result<Option<Banner>, RepositoryError> {
        let banner = sqlx::query_as::<_, Banner>(&format!(
            "SELECT {BANNER_COLUMNS} FROM shop.banners WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(banner)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &BannerInput) -> Result<Banner, RepositoryError> {
        sqlx::query_as::<_, Banner>(&format!(
            r"
            INSERT INTO shop.banners
                (title, subtitle, image_url, link_url, button_text, is_active, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {BANNER_COLUMNS}
            "
        ))
        .bind(input.title.trim())
        .bind(input.subtitle.as_deref())
        .bind(input.image_url.trim())
        .bind(input.link_url.as_deref())
        .bind(input.button_text.as_deref())
        .bind(input.is_active)
        .bind(input.sort_order)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "Banner already exists"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the banner does not exist.
    pub async fn update(&self, id: BannerId, input: &BannerInput) -> Result<Banner, RepositoryError> {
        sqlx::query_as::<_, Banner>(&format!(
            r"
            UPDATE shop.banners SET
                title = $2, subtitle = $3, image_url = $4, link_url = $5, button_text = $6,
                is_active = $7, sort_order = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {BANNER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(input.title.trim())
        .bind(input.subtitle.as_deref())
        .bind(input.image_url.trim())
        .bind(input.link_url.as_deref())
        .bind(input.button_text.as_deref())
        .bind(input.is_active)
        .bind(input.sort_order)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the banner does not exist.
    pub async fn delete(&self, id: BannerId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.banners WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| map_delete_error(e, "Banner"))?;

        expect_deleted(result.rows_affected())
    }
}

pub struct FaqRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FaqRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, include_inactive: bool) -> Result<Vec<Faq>, RepositoryError> {
        let faqs = sqlx::query_as::<_, Faq>(&format!(
            r"
            SELECT {FAQ_COLUMNS} FROM shop.faqs
            WHERE $1 OR is_active
            ORDER BY category, sort_order, id
            "
        ))
        .bind(include_inactive)
        .fetch_all(self.pool)
        .await?;

        Ok(faqs)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: FaqId) -> Result<Option<Faq>, RepositoryError> {
        let faq = sqlx::query_as::<_, Faq>(&format!("SELECT {FAQ_COLUMNS} FROM shop.faqs WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(faq)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &FaqInput) -> Result<Faq, RepositoryError> {
        sqlx::query_as::<_, Faq>(&format!(
            r"
            INSERT INTO shop.faqs (question, answer, category, is_active, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {FAQ_COLUMNS}
            "
        ))
        .bind(input.question.trim())
        .bind(input.answer.trim())
        .bind(input.category.trim())
        .bind(input.is_active)
        .bind(input.sort_order)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "FAQ already exists"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the FAQ does not exist.
    pub async fn update(&self, id: FaqId, input: &FaqInput) -> Result<Faq, RepositoryError> {
        sqlx::query_as::<_, Faq>(&format!(
            r"
            UPDATE shop.faqs SET
                question = $2, answer = $3, category = $4, is_active = $5, sort_order = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {FAQ_COLUMNS}
            "
        ))
        .bind(id)
        .bind(input.question.trim())
        .bind(input.answer.trim())
        .bind(input.category.trim())
        .bind(input.is_active)
        .bind(input.sort_order)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the FAQ does not exist.
    pub async fn delete(&self, id: FaqId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.faqs WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| map_delete_error(e, "FAQ"))?;

        expect_deleted(result.rows_affected())
    }
}

pub struct TestimonialRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TestimonialRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, include_inactive: bool) -> Result<Vec<Testimonial>, RepositoryError> {
        let testimonials = sqlx::query_as::<_, Testimonial>(&format!(
            r"
            SELECT {TESTIMONIAL_COLUMNS} FROM shop.testimonials
            WHERE $1 OR is_active
            ORDER BY sort_order, created_at DESC
            "
        ))
        .bind(include_inactive)
        .fetch_all(self.pool)
        .await?;

        Ok(testimonials)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: TestimonialId) -> Result<Option<Testimonial>, RepositoryError> {
        let testimonial = sqlx::query_as::<_, Testimonial>(&format!(
            "SELECT {TESTIMONIAL_COLUMNS} FROM shop.testimonials WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(testimonial)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &TestimonialInput) -> Result<Testimonial, RepositoryError> {
        sqlx::query_as::<_, Testimonial>(&format!(
            r"
            INSERT INTO shop.testimonials
                (customer_name, content, rating, image_url, is_active, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TESTIMONIAL_COLUMNS}
            "
        ))
        .bind(input.customer_name.trim())
        .bind(input.content.trim())
        .bind(input.rating)
        .bind(input.image_url.as_deref())
        .bind(input.is_active)
        .bind(input.sort_order)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "Testimonial already exists"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the testimonial does not exist.
    pub async fn update(
        &self,
        id: TestimonialId,
        input: &TestimonialInput,
    ) -> Result<Testimonial, RepositoryError> {
        sqlx::query_as::<_, Testimonial>(&format!(
            r"
            UPDATE shop.testimonials SET
                customer_name = $2, content = $3, rating = $4, image_url = $5,
                is_active = $6, sort_order = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {TESTIMONIAL_COLUMNS}
            "
        ))
        .bind(id)
        .bind(input.customer_name.trim())
        .bind(input.content.trim())
        .bind(input.rating)
        .bind(input.image_url.as_deref())
        .bind(input.is_active)
        .bind(input.sort_order)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the testimonial does not exist.
    pub async fn delete(&self, id: TestimonialId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.testimonials WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| map_delete_error(e, "Testimonial"))?;

        expect_deleted(result.rows_affected())
    }
}

pub struct ContentBlockRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContentBlockRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A published block by key. Keys are stored lowercase.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_published_by_key(&self, key: &str) -> Result<Option<ContentBlock>, RepositoryError> {
        let block = sqlx::query_as::<_, ContentBlock>(&format!(
            "SELECT {CONTENT_BLOCK_COLUMNS} FROM shop.content_blocks WHERE key = $1 AND is_published"
        ))
        .bind(key.trim().to_ascii_lowercase())
        .fetch_optional(self.pool)
        .await?;

        Ok(block)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<ContentBlock>, RepositoryError> {
        let blocks = sqlx::query_as::<_, ContentBlock>(&format!(
            "SELECT {CONTENT_BLOCK_COLUMNS} FROM shop.content_blocks ORDER BY key"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(blocks)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ContentBlockId) -> Result<Option<ContentBlock>, RepositoryError> {
        let block = sqlx::query_as::<_, ContentBlock>(&format!(
            "SELECT {CONTENT_BLOCK_COLUMNS} FROM shop.content_blocks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(block)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the key is already taken.
    pub async fn create(&self, input: &ContentBlockInput) -> Result<ContentBlock, RepositoryError> {
        sqlx::query_as::<_, ContentBlock>(&format!(
            r"
            INSERT INTO shop.content_blocks (key, title, body, is_published)
            VALUES ($1, $2, $3, $4)
            RETURNING {CONTENT_BLOCK_COLUMNS}
            "
        ))
        .bind(&input.key)
        .bind(input.title.trim())
        .bind(&input.body)
        .bind(input.is_published)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "A content block with this key already exists"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the block does not exist, or
    /// `RepositoryError::Conflict` if the new key is already taken.
    pub async fn update(
        &self,
        id: ContentBlockId,
        input: &ContentBlockInput,
    ) -> Result<ContentBlock, RepositoryError> {
        sqlx::query_as::<_, ContentBlock>(&format!(
            r"
            UPDATE shop.content_blocks SET
                key = $2, title = $3, body = $4, is_published = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {CONTENT_BLOCK_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&input.key)
        .bind(input.title.trim())
        .bind(&input.body)
        .bind(input.is_published)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_write_error(e, "A content block with this key already exists"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the block does not exist.
    pub async fn delete(&self, id: ContentBlockId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.content_blocks WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| map_delete_error(e, "Content block"))?;

        expect_deleted(result.rows_affected())
    }
}
