//! In-memory cache for public, rarely-changing lists.
//!
//! Shipping zones, banners, FAQs, testimonials, services and stylists are
//! cached with `moka` for 5 minutes. The admin binary runs in a separate
//! process and cannot invalidate these entries; admin edits become visible
//! once the TTL expires.

use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::debug;

use crate::db::{
    BannerRepository, FaqRepository, RepositoryError, ServiceRepository, ShippingZoneRepository,
    StylistRepository, TestimonialRepository,
};
use crate::models::{Banner, Faq, SalonService, ShippingZone, Stylist, Testimonial};

const TTL: Duration = Duration::from_secs(300);

/// Cache key per cached list.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    ShippingZones,
    Banners,
    Faqs,
    Testimonials,
    Services,
    Stylists,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    ShippingZones(Vec<ShippingZone>),
    Banners(Vec<Banner>),
    Faqs(Vec<Faq>),
    Testimonials(Vec<Testimonial>),
    Services(Vec<SalonService>),
    Stylists(Vec<Stylist>),
}

/// Read-through cache in front of the public list queries.
#[derive(Clone)]
pub struct ContentCache {
    cache: Cache<CacheKey, CacheValue>,
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentCache {
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(TTL)
            .build();
        Self { cache }
    }

    /// Active shipping zones, ordered by region then name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the cache is cold and the query fails.
    pub async fn shipping_zones(&self, pool: &PgPool) -> Result<Vec<ShippingZone>, RepositoryError> {
        if let Some(CacheValue::ShippingZones(zones)) = self.cache.get(&CacheKey::ShippingZones).await {
            debug!("Cache hit for shipping zones");
            return Ok(zones);
        }
        let zones = ShippingZoneRepository::new(pool).list_active().await?;
        self.cache
            .insert(CacheKey::ShippingZones, CacheValue::ShippingZones(zones.clone()))
            .await;
        Ok(zones)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the cache is cold and the query fails.
    pub async fn banners(&self, pool: &PgPool) -> Result<Vec<Banner>, RepositoryError> {
        if let Some(CacheValue::Banners(banners)) = self.cache.get(&CacheKey::Banners).await {
            return Ok(banners);
        }
        let banners = BannerRepository::new(pool).list(false).await?;
        self.cache
            .insert(CacheKey::Banners, CacheValue::Banners(banners.clone()))
            .await;
        Ok(banners)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the cache is cold and the query fails.
    pub async fn faqs(&self, pool: &PgPool) -> Result<Vec<Faq>, RepositoryError> {
        if let Some(CacheValue::Faqs(faqs)) = self.cache.get(&CacheKey::Faqs).await {
            return Ok(faqs);
        }
        let faqs = FaqRepository::new(pool).list(false).await?;
        self.cache
            .insert(CacheKey::Faqs, CacheValue::Faqs(faqs.clone()))
            .await;
        Ok(faqs)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the cache is cold and the query fails.
    pub async fn testimonials(&self, pool: &PgPool) -> Result<Vec<Testimonial>, RepositoryError> {
        if let Some(CacheValue::Testimonials(items)) = self.cache.get(&CacheKey::Testimonials).await {
            return Ok(items);
        }
        let items = TestimonialRepository::new(pool).list(false).await?;
        self.cache
            .insert(CacheKey::Testimonials, CacheValue::Testimonials(items.clone()))
            .await;
        Ok(items)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the cache is cold and the query fails.
    pub async fn services(&self, pool: &PgPool) -> Result<Vec<SalonService>, RepositoryError> {
        if let Some(CacheValue::Services(services)) = self.cache.get(&CacheKey::Services).await {
            return Ok(services);
        }
        let services = ServiceRepository::new(pool).list(false).await?;
        self.cache
            .insert(CacheKey::Services, CacheValue::Services(services.clone()))
            .await;
        Ok(services)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the cache is cold and the query fails.
    pub async fn stylists(&self, pool: &PgPool) -> Result<Vec<Stylist>, RepositoryError> {
        if let Some(CacheValue::Stylists(stylists)) = self.cache.get(&CacheKey::Stylists).await {
            return Ok(stylists);
        }
        let stylists = StylistRepository::new(pool).list(false).await?;
        self.cache
            .insert(CacheKey::Stylists, CacheValue::Stylists(stylists.clone()))
            .await;
        Ok(stylists)
    }
}
