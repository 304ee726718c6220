//! Salon Shop Admin - internal administration API.
//!
//! This binary serves the admin JSON API on port 3001.
//!
//! # Security
//!
//! **Bind this to a private interface.** Every `/api/admin` route requires
//! `ADMIN_API_TOKEN` as a bearer token, and the binary has full read/write
//! access to orders, customers and the catalog.

#![cfg_attr(not(test), forbid(unsafe_code))]

use salon_shop_admin::config::AdminConfig;
use salon_shop_admin::state::AppState;
use salon_shop_storefront::db::create_pool;
use salon_shop_storefront::telemetry::{self, SentrySettings};

#[tokio::main]
async fn main() {
    let config = AdminConfig::from_env().expect("Failed to load configuration");

    let _sentry_guard = telemetry::init_sentry(&SentrySettings {
        dsn: config.sentry_dsn.as_deref(),
        environment: config.sentry_environment.as_deref(),
        sample_rate: config.sentry_sample_rate,
        traces_sample_rate: config.sentry_traces_sample_rate,
        send_default_pii: true, // Admin requests can include PII for debugging
    });
    telemetry::init_tracing("salon_shop_admin=info,tower_http=debug");

    let pool = create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    if config.allowed_origin.is_none() {
        tracing::info!("ADMIN_ALLOWED_ORIGIN not set; cross-origin requests are refused");
    }

    let addr = config.socket_addr();
    let app = salon_shop_admin::app(AppState::new(config, pool))
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    tracing::info!("admin listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await
        .expect("Server error");
}
