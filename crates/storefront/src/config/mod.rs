//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `CRON_SECRET` - Bearer token for the reminder cron route (min 32 chars, high entropy)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STORE_NAME` - Shown in emails (default: Salon Shop)
//! - `STORE_CURRENCY` - ISO code (default: USD)
//! - `FREE_SHIPPING_THRESHOLD` - Subtotal at which delivery is free (unset = never)
//! - `PICKUP_ADDRESS` - Salon address shown for pickup orders
//! - `SALON_OPEN` / `SALON_CLOSE` - Local opening hours, `HH:MM` (default: 09:00 / 18:00)
//! - `SALON_SLOT_MINUTES` - Booking grid (default: 30)
//! - `SALON_UTC_OFFSET_MINUTES` - Salon's fixed offset from UTC (default: 0)
//! - `REMINDER_LOOKAHEAD_HOURS` - Reminder window (default: 24)
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_FROM` - Email delivery
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

pub mod env;

use std::net::{IpAddr, SocketAddr};

use chrono::{FixedOffset, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use salon_shop_core::CurrencyCode;
use salon_shop_core::booking::BookingHours;
use secrecy::SecretString;

pub use env::ConfigError;
use env::{
    get_database_url, get_env_or_default, get_optional_env, get_required_env,
    get_validated_secret, parse_env_or_default, parse_optional_env,
};

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Bearer token guarding `/api/cron/*`
    pub cron_secret: SecretString,
    pub store: StoreConfig,
    pub booking: BookingConfig,
    /// `None` disables outgoing email
    pub email: Option<EmailConfig>,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Store-wide commercial settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub name: String,
    pub currency: CurrencyCode,
    pub free_shipping_threshold: Option<Decimal>,
    pub pickup_address: Option<String>,
}

/// Salon opening hours and reminder window.
#[derive(Debug, Clone, Copy)]
pub struct BookingConfig {
    pub hours: BookingHours,
    pub utc_offset: FixedOffset,
    pub reminder_lookahead: TimeDelta,
}

/// SMTP settings.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            database_url: get_database_url("STOREFRONT_DATABASE_URL")?,
            host: parse_env_or_default("STOREFRONT_HOST", "127.0.0.1")?,
            port: parse_env_or_default("STOREFRONT_PORT", "3000")?,
            base_url: get_required_env("STOREFRONT_BASE_URL")?,
            cron_secret: get_validated_secret("CRON_SECRET")?,
            store: StoreConfig::from_env()?,
            booking: BookingConfig::from_env()?,
            email: EmailConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl StoreConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` for an unknown currency or a negative threshold.
    pub fn from_env() -> Result<Self, ConfigError> {
        let free_shipping_threshold: Option<Decimal> =
            parse_optional_env("FREE_SHIPPING_THRESHOLD")?;
        if free_shipping_threshold.is_some_and(|t| t.is_sign_negative()) {
            return Err(ConfigError::InvalidEnvVar(
                "FREE_SHIPPING_THRESHOLD".to_string(),
                "cannot be negative".to_string(),
            ));
        }

        Ok(Self {
            name: get_env_or_default("STORE_NAME", "Salon Shop"),
            currency: parse_env_or_default("STORE_CURRENCY", "USD")?,
            free_shipping_threshold,
            pickup_address: get_optional_env("PICKUP_ADDRESS"),
        })
    }
}

impl BookingConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` for malformed hours, offset or lookahead.
    pub fn from_env() -> Result<Self, ConfigError> {
        let open = parse_clock("SALON_OPEN", &get_env_or_default("SALON_OPEN", "09:00"))?;
        let close = parse_clock("SALON_CLOSE", &get_env_or_default("SALON_CLOSE", "18:00"))?;
        let slot_minutes: u32 = parse_env_or_default("SALON_SLOT_MINUTES", "30")?;
        let hours = BookingHours::new(open, close, slot_minutes)
            .map_err(|e| ConfigError::InvalidEnvVar("SALON_OPEN".to_string(), e.to_string()))?;

        let offset_minutes: i32 = parse_env_or_default("SALON_UTC_OFFSET_MINUTES", "0")?;
        let utc_offset = FixedOffset::east_opt(offset_minutes * 60).ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "SALON_UTC_OFFSET_MINUTES".to_string(),
                "offset out of range".to_string(),
            )
        })?;

        let lookahead_hours: u32 = parse_env_or_default("REMINDER_LOOKAHEAD_HOURS", "24")?;
        if lookahead_hours == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "REMINDER_LOOKAHEAD_HOURS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            hours,
            utc_offset,
            reminder_lookahead: TimeDelta::hours(i64::from(lookahead_hours)),
        })
    }
}

impl EmailConfig {
    /// SMTP is optional as a whole; once `SMTP_HOST` is set the rest is required.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `SMTP_HOST` is set without the other settings.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(smtp_host) = get_optional_env("SMTP_HOST") else {
            return Ok(None);
        };

        Ok(Some(Self {
            smtp_host,
            smtp_port: parse_env_or_default("SMTP_PORT", "587")?,
            smtp_username: get_required_env("SMTP_USERNAME")?,
            smtp_password: SecretString::from(get_required_env("SMTP_PASSWORD")?),
            from_address: get_required_env("SMTP_FROM")?,
        }))
    }
}

fn parse_clock(key: &str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            cron_secret: SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6k"),
            store: StoreConfig {
                name: "Salon Shop".to_string(),
                currency: CurrencyCode::USD,
                free_shipping_threshold: Some(Decimal::new(50, 0)),
                pickup_address: None,
            },
            booking: BookingConfig {
                hours: BookingHours::new(
                    NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                    NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                    30,
                )
                .unwrap(),
                utc_offset: FixedOffset::east_opt(0).unwrap(),
                reminder_lookahead: TimeDelta::hours(24),
            },
            email: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(
            parse_clock("SALON_OPEN", " 08:30 ").unwrap(),
            NaiveTime::from_hms_opt(8, 30, 0).unwrap()
        );
        assert!(parse_clock("SALON_OPEN", "8am").is_err());
    }

    #[test]
    fn test_email_config_debug_redacts_password() {
        let config = EmailConfig {
            smtp_host: "smtp.mail.test".to_string(),
            smtp_port: 587,
            smtp_username: "mailer".to_string(),
            smtp_password: SecretString::from("hunter2-but-longer"),
            from_address: "Salon <hello@salon.test>".to_string(),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("smtp.mail.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2-but-longer"));
    }

    #[test]
    fn test_config_debug_hides_secrets() {
        let debug_output = format!("{:?}", test_config());
        assert!(!debug_output.contains("aB3$xY9!"));
    }
}
