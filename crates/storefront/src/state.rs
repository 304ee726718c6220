//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::ContentCache;
use crate::config::StorefrontConfig;
use crate::services::email::{Branding, EmailService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    email: Option<EmailService>,
    cache: ContentCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Email is disabled when no SMTP settings are configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay cannot be configured.
    pub fn new(
        config: StorefrontConfig,
        pool: PgPool,
    ) -> Result<Self, lettre::transport::smtp::Error> {
        let email = match &config.email {
            Some(email_config) => Some(EmailService::new(email_config, branding(&config))?),
            None => {
                tracing::warn!("SMTP not configured; confirmation and reminder emails are disabled");
                None
            }
        };

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                email,
                cache: ContentCache::new(),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The email service, if SMTP is configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }

    /// Get a reference to the public list cache.
    #[must_use]
    pub fn cache(&self) -> &ContentCache {
        &self.inner.cache
    }
}

/// Store details stamped into outgoing email.
#[must_use]
pub fn branding(config: &StorefrontConfig) -> Branding {
    Branding {
        store_name: config.store.name.clone(),
        currency_symbol: config.store.currency.symbol(),
        pickup_address: config.store.pickup_address.clone(),
        utc_offset: config.booking.utc_offset,
    }
}
