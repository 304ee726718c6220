//! Salon services and stylists.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use salon_shop_core::{ServiceId, StylistId};
use serde::{Deserialize, Serialize};

use super::catalog::default_true;
use super::{ValidationError, require_non_negative, require_positive, require_text};

/// A bookable treatment (cut, colour, manicure...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SalonService {
    pub id: ServiceId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub duration_minutes: i32,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SalonServiceInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub duration_minutes: i32,
    pub price: Decimal,
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl SalonServiceInput {
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.name, "name")?;
        require_positive(self.duration_minutes, "duration_minutes")?;
        if self.duration_minutes > 12 * 60 {
            return Err(ValidationError(
                "duration_minutes cannot exceed 720".to_string(),
            ));
        }
        require_non_negative(self.price, "price")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Stylist {
    pub id: StylistId,
    pub name: String,
    pub title: String,
    pub bio: String,
    pub image_url: Option<String>,
    pub specialties: Vec<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StylistInput {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bio: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl StylistInput {
    /// # Errors
    ///
    /// Returns an error if the name is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.name, "name")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_service_duration_must_be_positive() {
        let input: SalonServiceInput = serde_json::from_value(serde_json::json!({
            "name": "Blow-dry",
            "duration_minutes": 0,
            "price": "35.00"
        }))
        .unwrap();
        assert_eq!(
            input.validate(),
            Err(ValidationError("duration_minutes must be greater than zero".to_string()))
        );
    }
}
