//! Seed reference data from a YAML file.
//!
//! ```yaml
//! shipping_zones:
//!   - name: Local delivery
//!     region: Metro
//!     base_fee: "5.00"
//!     estimated_days: 1-2 days
//! services:
//!   - name: Cut & Style
//!     category: Hair
//!     duration_minutes: 60
//!     price: "65.00"
//! stylists:
//!   - name: Ana
//!     title: Senior Stylist
//!     specialties: [color, balayage]
//! faqs:
//!   - question: Do you take walk-ins?
//!     answer: When a chair is free.
//! ```
//!
//! Every entry is validated before the database is touched. Rows that hit a
//! unique constraint are skipped, so a file can be re-applied.

use std::path::Path;

use salon_shop_storefront::config::env::get_database_url;
use salon_shop_storefront::db::{
    FaqRepository, RepositoryError, ServiceRepository, ShippingZoneRepository, StylistRepository,
    create_pool,
};
use salon_shop_storefront::models::{FaqInput, SalonServiceInput, ShippingZoneInput, StylistInput};
use serde::Deserialize;
use tracing::{error, info, warn};

/// Top-level layout of a catalog seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSeed {
    #[serde(default)]
    pub shipping_zones: Vec<ShippingZoneInput>,
    #[serde(default)]
    pub services: Vec<SalonServiceInput>,
    #[serde(default)]
    pub stylists: Vec<StylistInput>,
    #[serde(default)]
    pub faqs: Vec<FaqInput>,
}

impl CatalogSeed {
    /// Validate every entry, collecting one message per bad entry.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (i, zone) in self.shipping_zones.iter().enumerate() {
            if let Err(e) = zone.validate() {
                errors.push(format!("shipping_zones[{i}]: {e}"));
            }
        }
        for (i, service) in self.services.iter().enumerate() {
            if let Err(e) = service.validate() {
                errors.push(format!("services[{i}]: {e}"));
            }
        }
        for (i, stylist) in self.stylists.iter().enumerate() {
            if let Err(e) = stylist.validate() {
                errors.push(format!("stylists[{i}]: {e}"));
            }
        }
        for (i, faq) in self.faqs.iter().enumerate() {
            if let Err(e) = faq.validate() {
                errors.push(format!("faqs[{i}]: {e}"));
            }
        }
        errors
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shipping_zones.len() + self.services.len() + self.stylists.len() + self.faqs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Rows written and skipped by one seed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct SeedTally {
    inserted: usize,
    skipped: usize,
}

impl SeedTally {
    fn record<T>(
        &mut self,
        what: &str,
        result: Result<T, RepositoryError>,
    ) -> Result<(), RepositoryError> {
        match result {
            Ok(_) => self.inserted += 1,
            Err(RepositoryError::Conflict(msg)) => {
                warn!(entity = what, reason = %msg, "Skipping existing row");
                self.skipped += 1;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }
}

/// Load a catalog seed file into the database.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any entry fails
/// validation, or a database write fails for a reason other than a duplicate.
pub async fn catalog(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog seed");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let seed: CatalogSeed = serde_yaml::from_str(&content)?;

    let errors = seed.validate();
    if !errors.is_empty() {
        error!("Seed validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    info!(entries = seed.len(), "Seed file validated");

    let pool = create_pool(&database_url).await?;
    let mut tally = SeedTally::default();

    let zones = ShippingZoneRepository::new(&pool);
    for zone in &seed.shipping_zones {
        tally.record("shipping_zone", zones.create(zone).await)?;
    }

    let services = ServiceRepository::new(&pool);
    for service in &seed.services {
        tally.record("service", services.create(service).await)?;
    }

    let stylists = StylistRepository::new(&pool);
    for stylist in &seed.stylists {
        tally.record("stylist", stylists.create(stylist).await)?;
    }

    let faqs = FaqRepository::new(&pool);
    for faq in &seed.faqs {
        tally.record("faq", faqs.create(faq).await)?;
    }

    info!(
        inserted = tally.inserted,
        skipped = tally.skipped,
        "Catalog seed complete"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SEED: &str = r#"
shipping_zones:
  - name: Local delivery
    region: Metro
    base_fee: "5.00"
services:
  - name: Cut & Style
    category: Hair
    duration_minutes: 60
    price: "65.00"
stylists:
  - name: Ana
    specialties: [color, balayage]
faqs:
  - question: Do you take walk-ins?
    answer: When a chair is free.
"#;

    #[test]
    fn test_parse_seed_file() {
        let seed: CatalogSeed = serde_yaml::from_str(SEED).unwrap();
        assert_eq!(seed.len(), 4);
        assert!(seed.validate().is_empty());

        let service = &seed.services[0];
        assert_eq!(service.price.to_string(), "65.00");
        assert!(service.is_active);
        assert_eq!(seed.stylists[0].specialties, vec!["color", "balayage"]);
        assert_eq!(seed.faqs[0].category, "general");
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let seed: CatalogSeed = serde_yaml::from_str("faqs: []").unwrap();
        assert!(seed.is_empty());
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(serde_yaml::from_str::<CatalogSeed>("products: []").is_err());
    }

    #[test]
    fn test_validation_names_each_bad_entry() {
        let seed: CatalogSeed = serde_yaml::from_str(
            r#"
services:
  - name: " "
    duration_minutes: 30
    price: "10"
  - name: Trim
    duration_minutes: 0
    price: "10"
"#,
        )
        .unwrap();
        let errors = seed.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("services[0]:"));
        assert!(errors[1].starts_with("services[1]:"));
    }

    #[test]
    fn test_tally_skips_conflicts() {
        let mut tally = SeedTally::default();
        tally.record("faq", Ok::<_, RepositoryError>(())).unwrap();
        tally
            .record::<()>("faq", Err(RepositoryError::Conflict("exists".to_string())))
            .unwrap();
        assert!(tally.record::<()>("faq", Err(RepositoryError::NotFound)).is_err());
        assert_eq!(
            tally,
            SeedTally {
                inserted: 1,
                skipped: 1
            }
        );
    }
}
