//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ADMIN_API_TOKEN` - Bearer token for every `/api/admin` request (min 32 chars, high entropy)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_ALLOWED_ORIGIN` - Origin of the admin frontend, enables CORS
//! - `SALON_UTC_OFFSET_MINUTES` - Salon offset for appointment date filters (default: 0)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::net::{IpAddr, SocketAddr};

use chrono::FixedOffset;
use salon_shop_storefront::config::env::{
    ConfigError, get_database_url, get_optional_env, get_validated_secret, parse_env_or_default,
};
use secrecy::SecretString;

/// Admin application configuration.
#[derive(Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bearer token required on every admin API request
    pub api_token: SecretString,
    /// Admin frontend origin allowed by CORS
    pub allowed_origin: Option<String>,
    /// Salon-local offset used to turn `?date=` into a UTC range
    pub utc_offset: FixedOffset,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("database_url", &"[REDACTED]")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_token", &"[REDACTED]")
            .field("allowed_origin", &self.allowed_origin)
            .field("utc_offset", &self.utc_offset)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .finish_non_exhaustive()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let offset_minutes: i32 = parse_env_or_default("SALON_UTC_OFFSET_MINUTES", "0")?;
        let utc_offset = FixedOffset::east_opt(offset_minutes * 60).ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "SALON_UTC_OFFSET_MINUTES".to_string(),
                "offset out of range".to_string(),
            )
        })?;

        Ok(Self {
            database_url: get_database_url("ADMIN_DATABASE_URL")?,
            host: parse_env_or_default("ADMIN_HOST", "127.0.0.1")?,
            port: parse_env_or_default("ADMIN_PORT", "3001")?,
            api_token: get_validated_secret("ADMIN_API_TOKEN")?,
            allowed_origin: get_optional_env("ADMIN_ALLOWED_ORIGIN"),
            utc_offset,
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const TEST_TOKEN: &str = "Zq8#vN2$kR5!mW7@tY4%hJ9&bC3*fG6x";

    pub(crate) fn test_config() -> AdminConfig {
        AdminConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            api_token: SecretString::from(TEST_TOKEN),
            allowed_origin: None,
            utc_offset: FixedOffset::east_opt(0).unwrap(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_socket_addr() {
        assert_eq!(test_config().socket_addr().port(), 3001);
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug_output = format!("{:?}", test_config());
        assert!(!debug_output.contains(TEST_TOKEN));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
