//! Appointment availability, booking and lookups.

use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use tracing::instrument;

use super::EmailQuery;
use crate::api::{ApiJson, ApiQuery, ApiResponse};
use crate::db::AppointmentRepository;
use crate::error::{Result, add_breadcrumb};
use crate::models::Appointment;
use crate::services::booking::{self, Availability, AvailabilityQuery, CreateAppointmentRequest};
use crate::state::AppState;

/// `GET /api/appointments/availability?date=&service_id=&stylist_id=`
#[instrument(skip(state))]
pub async fn availability(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AvailabilityQuery>,
) -> Result<ApiResponse<Availability>> {
    let availability =
        booking::availability(state.pool(), &state.config().booking, &query, Utc::now()).await?;
    Ok(ApiResponse::ok(availability))
}

/// `POST /api/appointments`
#[instrument(skip(state, request), fields(service_id = %request.service_id))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateAppointmentRequest>,
) -> Result<(StatusCode, ApiResponse<Appointment>)> {
    add_breadcrumb("booking", "Book appointment", None);

    let appointment = booking::book(
        state.pool(),
        &state.config().booking,
        state.email(),
        request,
        Utc::now(),
    )
    .await?;

    Ok(ApiResponse::created(appointment))
}

/// `GET /api/appointments?email=`
#[instrument(skip(state, query))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EmailQuery>,
) -> Result<ApiResponse<Vec<Appointment>>> {
    let email = query.parse()?;
    let appointments = AppointmentRepository::new(state.pool())
        .list_for_email(&email)
        .await?;
    Ok(ApiResponse::ok(appointments))
}
