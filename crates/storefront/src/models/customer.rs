//! Customers.
//!
//! There are no customer accounts. A customer row is created (or refreshed)
//! the first time an email places an order or books an appointment, and the
//! email is the key both flows upsert on.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use salon_shop_core::{CustomerId, Email, RewardTier};
use serde::{Deserialize, Serialize};

use super::{ValidationError, clean_optional, require_text};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub reward_tier: RewardTier,
    pub notes: Option<String>,
    pub order_count: i32,
    pub total_spent: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contact details submitted with an order or a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
}

impl CustomerDetails {
    /// Trim the name and phone.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or too long.
    pub fn normalize(&mut self) -> Result<(), ValidationError> {
        self.name = self.name.trim().to_string();
        require_text(&self.name, "Name")?;
        if self.name.chars().count() > 200 {
            return Err(ValidationError("Name is too long".to_string()));
        }
        self.phone = clean_optional(self.phone.as_deref());
        Ok(())
    }
}

/// Admin `PATCH` payload. Absent fields are left unchanged; an empty
/// `phone` or `notes` clears the value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub reward_tier: Option<RewardTier>,
    pub notes: Option<String>,
}

impl CustomerUpdate {
    /// # Errors
    ///
    /// Returns an error if a name is supplied but blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            require_text(name, "name")?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.reward_tier.is_none() && self.notes.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_details_normalize() {
        let mut details: CustomerDetails = serde_json::from_value(serde_json::json!({
            "name": "  Maya Lin ",
            "email": "Maya@Example.com",
            "phone": "   "
        }))
        .unwrap();
        details.normalize().unwrap();
        assert_eq!(details.name, "Maya Lin");
        assert_eq!(details.email.as_str(), "maya@example.com");
        assert_eq!(details.phone, None);
    }

    #[test]
    fn test_customer_details_requires_name() {
        let mut details = CustomerDetails {
            name: " ".to_string(),
            email: Email::parse("a@b.co").unwrap(),
            phone: None,
        };
        assert!(details.normalize().is_err());
    }

    #[test]
    fn test_customer_update_is_empty() {
        assert!(CustomerUpdate::default().is_empty());
        let update: CustomerUpdate =
            serde_json::from_value(serde_json::json!({"reward_tier": "gold"})).unwrap();
        assert!(!update.is_empty());
        assert_eq!(update.reward_tier, Some(RewardTier::Gold));
    }
}
