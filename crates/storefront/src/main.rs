//! Salon Shop storefront - public shop and booking API.
//!
//! This binary serves the public JSON API on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework, JSON envelope responses
//! - `PostgreSQL` via sqlx for catalog, orders and appointments
//! - SMTP (lettre) for order confirmations and appointment reminders
//! - Moka cache in front of rarely-changing public lists
//!
//! # Security
//!
//! This binary only exposes public endpoints. Catalog management lives in
//! the admin binary on its own port. The reminder cron endpoint requires
//! `CRON_SECRET` as a bearer token.

#![cfg_attr(not(test), forbid(unsafe_code))]

use salon_shop_storefront::config::StorefrontConfig;
use salon_shop_storefront::db;
use salon_shop_storefront::state::AppState;
use salon_shop_storefront::telemetry::{self, SentrySettings};

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Customer emails and addresses stay out of Sentry events
    let _sentry_guard = telemetry::init_sentry(&SentrySettings {
        dsn: config.sentry_dsn.as_deref(),
        environment: config.sentry_environment.as_deref(),
        sample_rate: config.sentry_sample_rate,
        traces_sample_rate: config.sentry_traces_sample_rate,
        send_default_pii: false,
    });
    telemetry::init_tracing("salon_shop_storefront=info,tower_http=debug");

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p salon-shop-cli -- migrate

    let addr = config.socket_addr();
    tracing::info!(
        store = %config.store.name,
        currency = ?config.store.currency,
        email_enabled = config.email.is_some(),
        "Configuration loaded"
    );
    let state = AppState::new(config, pool).expect("Failed to initialize application state");

    let app = salon_shop_storefront::app(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    // Peer address is the rate limit key when no proxy header is present
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(telemetry::shutdown_signal())
    .await
    .expect("Server error");
}
