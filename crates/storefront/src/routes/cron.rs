//! Scheduled jobs triggered over HTTP by an external cron.

use axum::extract::State;
use chrono::Utc;
use tracing::instrument;

use crate::api::ApiResponse;
use crate::error::{AppError, Result};
use crate::middleware::RequireCronSecret;
use crate::services::reminders::{self, ReminderReport};
use crate::state::AppState;

/// `GET|POST /api/cron/appointment-reminders`
///
/// Requires `Authorization: Bearer <CRON_SECRET>`.
#[instrument(skip_all)]
pub async fn appointment_reminders(
    _auth: RequireCronSecret,
    State(state): State<AppState>,
) -> Result<ApiResponse<ReminderReport>> {
    let email = state.email().ok_or_else(|| {
        AppError::ServiceUnavailable("Email delivery is not configured".to_string())
    })?;

    let report = reminders::run(
        state.pool(),
        email,
        Utc::now(),
        state.config().booking.reminder_lookahead,
    )
    .await?;

    Ok(ApiResponse::ok(report))
}
