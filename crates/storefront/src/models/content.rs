//! Marketing content: banners, FAQs, testimonials and keyed content blocks.

use chrono::{DateTime, Utc};
use salon_shop_core::{BannerId, ContentBlockId, FaqId, TestimonialId};
use serde::{Deserialize, Serialize};

use super::catalog::default_true;
use super::{ValidationError, require_text};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Banner {
    pub id: BannerId,
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub button_text: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BannerInput {
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub button_text: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl BannerInput {
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.title, "title")?;
        require_text(&self.image_url, "image_url")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Faq {
    pub id: FaqId,
    pub question: String,
    pub answer: String,
    pub category: String,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FaqInput {
    pub question: String,
    pub answer: String,
    #[serde(default = "default_faq_category")]
    pub category: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

fn default_faq_category() -> String {
    "general".to_string()
}

impl FaqInput {
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.question, "question")?;
        require_text(&self.answer, "answer")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Testimonial {
    pub id: TestimonialId,
    pub customer_name: String,
    pub content: String,
    pub rating: i32,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestimonialInput {
    pub customer_name: String,
    pub content: String,
    #[serde(default = "default_rating")]
    pub rating: i32,
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

const fn default_rating() -> i32 {
    5
}

impl TestimonialInput {
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.customer_name, "customer_name")?;
        require_text(&self.content, "content")?;
        if !(1..=5).contains(&self.rating) {
            return Err(ValidationError("rating must be between 1 and 5".to_string()));
        }
        Ok(())
    }
}

/// A block of editable copy addressed by a stable key (e.g. `about-us`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContentBlock {
    pub id: ContentBlockId,
    pub key: String,
    pub title: String,
    pub body: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlockInput {
    pub key: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

impl ContentBlockInput {
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        self.key = self.key.trim().to_ascii_lowercase();
        require_text(&self.key, "key")?;
        if !self
            .key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError(
                "key may only contain letters, digits, dashes and underscores".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_testimonial_rating_bounds() {
        let mut input = TestimonialInput {
            customer_name: "Dana".to_string(),
            content: "Best balayage in town".to_string(),
            rating: 6,
            image_url: None,
            is_active: true,
            sort_order: 0,
        };
        assert!(input.validate().is_err());
        input.rating = 5;
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_content_block_key_normalized() {
        let mut input: ContentBlockInput =
            serde_json::from_value(serde_json::json!({"key": " About-Us "})).unwrap();
        input.validate().unwrap();
        assert_eq!(input.key, "about-us");

        let mut bad: ContentBlockInput =
            serde_json::from_value(serde_json::json!({"key": "about us"})).unwrap();
        assert!(bad.validate().is_err());
    }
}
