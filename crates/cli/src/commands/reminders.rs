//! Appointment reminder command.
//!
//! Runs the same batch as `GET /api/cron/appointment-reminders`, for hosts
//! that schedule jobs with system cron instead of an HTTP scheduler.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string
//! - `SMTP_*` - Required unless `--dry-run`
//! - `STORE_*`, `SALON_*` - Branding and the reminder window, as for the storefront

use chrono::Utc;
use salon_shop_storefront::config::env::get_database_url;
use salon_shop_storefront::config::{BookingConfig, EmailConfig, StoreConfig};
use salon_shop_storefront::db::create_pool;
use salon_shop_storefront::services::email::{Branding, EmailService};
use salon_shop_storefront::services::reminders;
use tracing::info;

/// Send (or with `dry_run`, list) reminders for appointments inside the
/// lookahead window.
///
/// # Errors
///
/// Returns an error if configuration is missing, SMTP is not configured for
/// a real run, or selecting the batch fails.
pub async fn send(dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
    let store = StoreConfig::from_env()?;
    let booking = BookingConfig::from_env()?;
    let email_config = EmailConfig::from_env()?;

    let pool = create_pool(&database_url).await?;
    let now = Utc::now();

    if dry_run {
        let due = reminders::due(&pool, now, booking.reminder_lookahead).await?;
        info!(count = due.len(), "Appointments due a reminder");
        for appointment in &due {
            info!(
                appointment_id = %appointment.id,
                email = %appointment.customer_email,
                scheduled_at = %appointment.scheduled_at,
                service = %appointment.service_name,
                "Would remind"
            );
        }
        return Ok(());
    }

    let email_config = email_config.ok_or("SMTP_HOST not set; email delivery is not configured")?;
    let branding = Branding {
        store_name: store.name.clone(),
        currency_symbol: store.currency.symbol(),
        pickup_address: store.pickup_address.clone(),
        utc_offset: booking.utc_offset,
    };
    let email = EmailService::new(&email_config, branding)?;

    let report = reminders::run(&pool, &email, now, booking.reminder_lookahead).await?;
    if report.failed > 0 {
        return Err(format!(
            "{} of {} reminders failed",
            report.failed, report.considered
        )
        .into());
    }

    Ok(())
}
