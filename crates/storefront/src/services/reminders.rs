//! Appointment reminder batch.
//!
//! Runs sequentially: one email, one `UPDATE` per appointment. A crash part
//! way through leaves the remaining rows unstamped for the next run, and the
//! `reminder_sent_at IS NULL` guard on the update keeps two overlapping runs
//! from double-stamping a row.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use salon_shop_core::AppointmentId;
use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;

use crate::db::{AppointmentRepository, RepositoryError};
use crate::models::Appointment;
use crate::services::email::{EmailError, EmailService};

/// Most reminders sent by one run.
pub const BATCH_LIMIT: i64 = 500;

/// Outcome of one reminder run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReminderReport {
    pub considered: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Delivers one reminder message.
#[async_trait]
pub trait ReminderSender: Send + Sync {
    async fn send_reminder(&self, appointment: &Appointment) -> Result<(), EmailError>;
}

#[async_trait]
impl ReminderSender for EmailService {
    async fn send_reminder(&self, appointment: &Appointment) -> Result<(), EmailError> {
        self.send_appointment_reminder(appointment).await
    }
}

/// Records that an appointment's reminder went out.
#[async_trait]
pub trait ReminderLedger: Send + Sync {
    /// `Ok(false)` when the row was already stamped.
    async fn mark_sent(&self, id: AppointmentId, at: DateTime<Utc>) -> Result<bool, RepositoryError>;
}

#[async_trait]
impl ReminderLedger for AppointmentRepository<'_> {
    async fn mark_sent(&self, id: AppointmentId, at: DateTime<Utc>) -> Result<bool, RepositoryError> {
        self.mark_reminder_sent(id, at).await
    }
}

/// Appointments due a reminder in `[now, now + lookahead]`.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn due(
    pool: &PgPool,
    now: DateTime<Utc>,
    lookahead: TimeDelta,
) -> Result<Vec<Appointment>, RepositoryError> {
    AppointmentRepository::new(pool)
        .due_for_reminder(now, now + lookahead, BATCH_LIMIT)
        .await
}

/// Send reminders for every due appointment.
///
/// A failed send is logged and counted; the appointment stays unstamped and
/// is picked up again next run.
///
/// # Errors
///
/// Returns `RepositoryError` only if selecting the batch fails. Errors
/// stamping an individual row are counted as failures.
#[instrument(skip(pool, email), fields(lookahead_hours = lookahead.num_hours()))]
pub async fn run(
    pool: &PgPool,
    email: &EmailService,
    now: DateTime<Utc>,
    lookahead: TimeDelta,
) -> Result<ReminderReport, RepositoryError> {
    let appointments = due(pool, now, lookahead).await?;
    let report = deliver(&appointments, email, &AppointmentRepository::new(pool), now).await;

    tracing::info!(
        considered = report.considered,
        sent = report.sent,
        failed = report.failed,
        "Reminder run finished"
    );
    Ok(report)
}

/// Send and stamp each appointment in turn. Never stops early.
pub async fn deliver(
    appointments: &[Appointment],
    sender: &dyn ReminderSender,
    ledger: &dyn ReminderLedger,
    now: DateTime<Utc>,
) -> ReminderReport {
    let mut report = ReminderReport {
        considered: appointments.len(),
        ..ReminderReport::default()
    };

    for appointment in appointments {
        if let Err(e) = sender.send_reminder(appointment).await {
            tracing::warn!(
                appointment_id = %appointment.id,
                error = %e,
                "Failed to send appointment reminder"
            );
            report.failed += 1;
            continue;
        }

        match ledger.mark_sent(appointment.id, now).await {
            Ok(true) => report.sent += 1,
            Ok(false) => {
                tracing::info!(appointment_id = %appointment.id, "Reminder already stamped by another run");
                report.sent += 1;
            }
            Err(e) => {
                tracing::error!(
                    appointment_id = %appointment.id,
                    error = %e,
                    "Reminder sent but could not be recorded"
                );
                report.failed += 1;
            }
        }
    }

    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use chrono::TimeZone;
    use salon_shop_core::{AppointmentStatus, CustomerId, Email, ServiceId};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()
    }

    fn appointment(id: i32, email: &str) -> Appointment {
        Appointment {
            id: AppointmentId::new(id),
            customer_id: CustomerId::new(id),
            customer_name: "Dana".to_string(),
            customer_email: Email::parse(email).unwrap(),
            customer_phone: None,
            service_id: ServiceId::new(1),
            service_name: "Cut".to_string(),
            stylist_id: None,
            stylist_name: None,
            scheduled_at: now() + TimeDelta::hours(20),
            duration_minutes: 60,
            status: AppointmentStatus::Confirmed,
            notes: None,
            reminder_sent_at: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    /// Fails for one address, records the rest.
    #[derive(Default)]
    struct FakeSender {
        bounce: Option<&'static str>,
        delivered: Mutex<Vec<AppointmentId>>,
    }

    #[async_trait]
    impl ReminderSender for FakeSender {
        async fn send_reminder(&self, appointment: &Appointment) -> Result<(), EmailError> {
            if self.bounce == Some(appointment.customer_email.as_str()) {
                return Err(EmailError::InvalidAddress(appointment.customer_email.to_string()));
            }
            self.delivered.lock().unwrap().push(appointment.id);
            Ok(())
        }
    }

    /// Rows in `stamped` are already marked; `broken` fails to update.
    #[derive(Default)]
    struct FakeLedger {
        stamped: Mutex<HashSet<AppointmentId>>,
        broken: Option<AppointmentId>,
    }

    #[async_trait]
    impl ReminderLedger for FakeLedger {
        async fn mark_sent(&self, id: AppointmentId, _at: DateTime<Utc>) -> Result<bool, RepositoryError> {
            if self.broken == Some(id) {
                return Err(RepositoryError::DataCorruption("update failed".to_string()));
            }
            Ok(self.stamped.lock().unwrap().insert(id))
        }
    }

    #[tokio::test]
    async fn test_failed_send_is_counted_and_run_continues() {
        let appointments = [
            appointment(1, "a@example.com"),
            appointment(2, "bounce@example.com"),
            appointment(3, "c@example.com"),
        ];
        let sender = FakeSender {
            bounce: Some("bounce@example.com"),
            ..FakeSender::default()
        };
        let ledger = FakeLedger::default();

        let report = deliver(&appointments, &sender, &ledger, now()).await;

        assert_eq!(
            report,
            ReminderReport {
                considered: 3,
                sent: 2,
                failed: 1
            }
        );
        assert_eq!(
            *sender.delivered.lock().unwrap(),
            vec![AppointmentId::new(1), AppointmentId::new(3)]
        );
        let stamped = ledger.stamped.lock().unwrap();
        assert!(!stamped.contains(&AppointmentId::new(2)));
        assert_eq!(stamped.len(), 2);
    }

    #[tokio::test]
    async fn test_already_stamped_row_counts_as_sent() {
        let appointments = [appointment(1, "a@example.com"), appointment(2, "b@example.com")];
        let sender = FakeSender::default();
        let ledger = FakeLedger::default();
        ledger.stamped.lock().unwrap().insert(AppointmentId::new(2));

        let report = deliver(&appointments, &sender, &ledger, now()).await;

        assert_eq!(report.sent, 2);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn test_stamp_failure_counts_as_failed() {
        let appointments = [appointment(1, "a@example.com"), appointment(2, "b@example.com")];
        let sender = FakeSender::default();
        let ledger = FakeLedger {
            broken: Some(AppointmentId::new(1)),
            ..FakeLedger::default()
        };

        let report = deliver(&appointments, &sender, &ledger, now()).await;

        assert_eq!(sender.delivered.lock().unwrap().len(), 2);
        assert_eq!(
            report,
            ReminderReport {
                considered: 2,
                sent: 1,
                failed: 1
            }
        );
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let report = deliver(&[], &FakeSender::default(), &FakeLedger::default(), now()).await;
        assert_eq!(report, ReminderReport::default());
    }

    #[test]
    fn test_report_serializes_counts() {
        let report = ReminderReport {
            considered: 3,
            sent: 2,
            failed: 1,
        };
        assert_eq!(
            serde_json::to_value(report).unwrap_or_default(),
            serde_json::json!({"considered": 3, "sent": 2, "failed": 1})
        );
    }
}
