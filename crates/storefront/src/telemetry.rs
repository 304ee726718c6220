//! Process-wide logging and error tracking, shared by the storefront and
//! admin binaries.
//!
//! Sentry must be initialized before the subscriber so the tracing layer
//! picks up the client.

use std::borrow::Cow;

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Sentry client settings taken from either binary's config.
#[derive(Debug, Clone, Copy)]
pub struct SentrySettings<'a> {
    pub dsn: Option<&'a str>,
    pub environment: Option<&'a str>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
    /// Attach request bodies and user data to events.
    pub send_default_pii: bool,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
///
/// Returns `None` when no DSN is configured.
#[must_use]
pub fn init_sentry(settings: &SentrySettings<'_>) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.dsn?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: settings.environment.map(|e| Cow::Owned(e.to_string())),
            sample_rate: settings.sample_rate,
            traces_sample_rate: settings.traces_sample_rate,
            attach_stacktrace: true,
            send_default_pii: settings.send_default_pii,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// ERROR/WARN become Sentry events, INFO/DEBUG breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `default_filter`. `LOG_FORMAT=json` switches to
/// flattened JSON lines.
pub fn init_tracing(default_filter: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let json_layer = json_logs.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json_logs).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
///
/// # Panics
///
/// Panics if the signal handlers cannot be installed.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_dsn_means_no_client() {
        let settings = SentrySettings {
            dsn: None,
            environment: Some("test"),
            sample_rate: 1.0,
            traces_sample_rate: 0.0,
            send_default_pii: false,
        };
        assert!(init_sentry(&settings).is_none());
    }
}
