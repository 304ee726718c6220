//! Salon availability and appointment booking.

use chrono::{DateTime, NaiveDate, Utc};
use salon_shop_core::booking::{
    BOOKING_HORIZON_DAYS, Booking, available_slots, is_bookable_start, local_day_bounds,
    within_horizon,
};
use salon_shop_core::{ServiceId, StylistId};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use crate::config::BookingConfig;
use crate::db::{
    AppointmentRepository, CustomerRepository, NewAppointment, RepositoryError, ServiceRepository,
    StylistRepository,
};
use crate::models::{Appointment, AppointmentSlot, CustomerDetails, SalonService, clean_optional};
use crate::services::email::EmailService;

const MAX_NOTES_LENGTH: usize = 1000;

#[derive(Debug, Error)]
pub enum BookingError {
    /// Request failed validation; the message is customer-facing.
    #[error("{0}")]
    Invalid(String),

    #[error("Appointments must be booked in the future")]
    InPast,

    #[error("That time is outside our opening hours")]
    OutsideHours,

    #[error("Service not found")]
    ServiceNotFound,

    #[error("Stylist not found")]
    StylistNotFound,

    #[error("That time slot has just been taken, please choose another")]
    SlotTaken,

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// `GET /api/appointments/availability` query.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    pub service_id: ServiceId,
    pub stylist_id: Option<StylistId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Availability {
    pub date: NaiveDate,
    pub service_id: ServiceId,
    pub stylist_id: Option<StylistId>,
    pub duration_minutes: i32,
    pub slots: Vec<AppointmentSlot>,
}

/// `POST /api/appointments` body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub customer: CustomerDetails,
    pub service_id: ServiceId,
    pub stylist_id: Option<StylistId>,
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl CreateAppointmentRequest {
    /// # Errors
    ///
    /// Returns `BookingError::Invalid` with a customer-facing message.
    pub fn validate(&mut self) -> Result<(), BookingError> {
        self.customer
            .normalize()
            .map_err(|e| BookingError::Invalid(e.0))?;
        self.notes = clean_optional(self.notes.as_deref());
        if self
            .notes
            .as_ref()
            .is_some_and(|n| n.chars().count() > MAX_NOTES_LENGTH)
        {
            return Err(BookingError::Invalid("Notes are too long".to_string()));
        }
        Ok(())
    }
}

fn outside_window() -> BookingError {
    BookingError::Invalid(format!(
        "Choose a date within the next {BOOKING_HORIZON_DAYS} days"
    ))
}

fn local_day(date: NaiveDate, config: &BookingConfig) -> Result<(DateTime<Utc>, DateTime<Utc>), BookingError> {
    local_day_bounds(date, config.utc_offset).ok_or_else(outside_window)
}

/// A salon-local date between yesterday and the end of the booking window.
fn check_date(date: NaiveDate, config: &BookingConfig, now: DateTime<Utc>) -> Result<(), BookingError> {
    let today = now.with_timezone(&config.utc_offset).date_naive();
    if within_horizon(date, today) {
        Ok(())
    } else {
        Err(outside_window())
    }
}

/// Time checks that need no database: in the future, inside the booking
/// window, on the slot grid and finished by closing time.
fn check_start(
    start: DateTime<Utc>,
    config: &BookingConfig,
    duration_minutes: i32,
    now: DateTime<Utc>,
) -> Result<(), BookingError> {
    if start <= now {
        return Err(BookingError::InPast);
    }
    check_date(start.with_timezone(&config.utc_offset).date_naive(), config, now)?;
    if !is_bookable_start(start, &config.hours, config.utc_offset, duration_minutes) {
        return Err(BookingError::OutsideHours);
    }
    Ok(())
}

async fn active_service(pool: &PgPool, id: ServiceId) -> Result<SalonService, BookingError> {
    ServiceRepository::new(pool)
        .get_active(id)
        .await?
        .ok_or(BookingError::ServiceNotFound)
}

async fn ensure_active_stylist(pool: &PgPool, id: Option<StylistId>) -> Result<(), BookingError> {
    if let Some(id) = id {
        StylistRepository::new(pool)
            .get_active(id)
            .await?
            .ok_or(BookingError::StylistNotFound)?;
    }
    Ok(())
}

/// Free slots for a service on a salon-local date.
///
/// Only a chosen stylist's appointments block slots; without a stylist every
/// slot inside opening hours is offered.
///
/// # Errors
///
/// Returns `BookingError::Invalid` for a date outside the booking window and
/// `BookingError::ServiceNotFound` / `StylistNotFound` for unknown or inactive
/// ids.
#[instrument(skip(pool, config))]
pub async fn availability(
    pool: &PgPool,
    config: &BookingConfig,
    query: &AvailabilityQuery,
    now: DateTime<Utc>,
) -> Result<Availability, BookingError> {
    check_date(query.date, config, now)?;

    let service = active_service(pool, query.service_id).await?;
    ensure_active_stylist(pool, query.stylist_id).await?;

    let booked = match query.stylist_id {
        Some(stylist_id) => {
            let (from, to) = local_day(query.date, config)?;
            AppointmentRepository::new(pool)
                .active_bookings(stylist_id, from, to)
                .await?
        }
        None => Vec::new(),
    };

    let slots = available_slots(
        query.date,
        &config.hours,
        config.utc_offset,
        service.duration_minutes,
        &booked,
        now,
    )
    .into_iter()
    .map(|start| AppointmentSlot::new(start, service.duration_minutes))
    .collect();

    Ok(Availability {
        date: query.date,
        service_id: service.id,
        stylist_id: query.stylist_id,
        duration_minutes: service.duration_minutes,
        slots,
    })
}

/// Book an appointment in status `pending`.
///
/// With a stylist chosen, the stylist's bookings are serialized with an
/// advisory lock and re-checked for overlap inside the transaction.
///
/// # Errors
///
/// Returns a `BookingError` for invalid input, a past or out-of-hours start,
/// unknown ids, or a slot that overlaps an existing appointment.
#[instrument(
    skip(pool, config, email, request),
    fields(service_id = %request.service_id, scheduled_at = %request.scheduled_at)
)]
pub async fn book(
    pool: &PgPool,
    config: &BookingConfig,
    email: Option<&EmailService>,
    mut request: CreateAppointmentRequest,
    now: DateTime<Utc>,
) -> Result<Appointment, BookingError> {
    request.validate()?;

    let service = active_service(pool, request.service_id).await?;
    ensure_active_stylist(pool, request.stylist_id).await?;
    check_start(request.scheduled_at, config, service.duration_minutes, now)?;

    let candidate = Booking {
        start: request.scheduled_at,
        duration_minutes: service.duration_minutes,
    };

    let mut tx = pool.begin().await?;

    if let Some(stylist_id) = request.stylist_id {
        AppointmentRepository::lock_stylist(&mut tx, stylist_id).await?;
        let local_date = request
            .scheduled_at
            .with_timezone(&config.utc_offset)
            .date_naive();
        let (from, to) = local_day(local_date, config)?;
        let booked = AppointmentRepository::active_bookings_in(&mut tx, stylist_id, from, to).await?;
        if booked.iter().any(|b| b.overlaps(&candidate)) {
            return Err(BookingError::SlotTaken);
        }
    }

    let customer = CustomerRepository::upsert(
        &mut tx,
        &request.customer,
        rust_decimal::Decimal::ZERO,
        0,
    )
    .await?;

    let appointment = AppointmentRepository::insert(
        &mut tx,
        &NewAppointment {
            customer_id: customer.id,
            customer_name: &request.customer.name,
            customer_email: &request.customer.email,
            customer_phone: request.customer.phone.as_deref(),
            service_id: service.id,
            stylist_id: request.stylist_id,
            scheduled_at: request.scheduled_at,
            duration_minutes: service.duration_minutes,
            notes: request.notes.as_deref(),
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(appointment_id = %appointment.id, "Appointment booked");

    if let Some(email) = email {
        let email = email.clone();
        let booked = appointment.clone();
        tokio::spawn(async move {
            if let Err(e) = email.send_appointment_confirmation(&booked).await {
                tracing::warn!(
                    appointment_id = %booked.id,
                    error = %e,
                    "Failed to send appointment confirmation"
                );
            }
        });
    }

    Ok(appointment)
}
