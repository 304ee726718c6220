//! Appointment repository.

use chrono::{DateTime, Utc};
use salon_shop_core::booking::Booking;
use salon_shop_core::{AppointmentId, AppointmentStatus, CustomerId, Email, ServiceId, StylistId};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use super::RepositoryError;
use crate::api::PageParams;
use crate::models::Appointment;

const APPOINTMENT_SELECT: &str = r"
    SELECT a.id, a.customer_id, a.customer_name, a.customer_email, a.customer_phone,
           a.service_id, s.name AS service_name, a.stylist_id, st.name AS stylist_name,
           a.scheduled_at, a.duration_minutes, a.status, a.notes, a.reminder_sent_at,
           a.created_at, a.updated_at
    FROM shop.appointments a
    JOIN shop.services s ON s.id = a.service_id
    LEFT JOIN shop.stylists st ON st.id = a.stylist_id
";

/// Advisory lock namespace for per-stylist booking serialization.
const STYLIST_LOCK_CLASS: i32 = 4101;

#[derive(Debug, Clone)]
pub struct NewAppointment<'a> {
    pub customer_id: CustomerId,
    pub customer_name: &'a str,
    pub customer_email: &'a Email,
    pub customer_phone: Option<&'a str>,
    pub service_id: ServiceId,
    pub stylist_id: Option<StylistId>,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub notes: Option<&'a str>,
}

/// Admin listing filters.
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    /// UTC bounds of a salon-local day.
    pub between: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub stylist_id: Option<StylistId>,
}

pub struct AppointmentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AppointmentRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The customer's appointments, latest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_email(&self, email: &Email) -> Result<Vec<Appointment>, RepositoryError> {
        let appointments = sqlx::query_as::<_, Appointment>(&format!(
            "{APPOINTMENT_SELECT} WHERE a.customer_email = $1 ORDER BY a.scheduled_at DESC LIMIT 100"
        ))
        .bind(email)
        .fetch_all(self.pool)
        .await?;

        Ok(appointments)
    }

    /// Intervals held by the stylist's active appointments starting in
    /// `[from, to)`. Appointments that start the previous day and run past
    /// midnight are not considered; the salon closes before then.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn active_bookings_in(
        conn: &mut PgConnection,
        stylist_id: StylistId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let rows: Vec<(DateTime<Utc>, i32)> = sqlx::query_as(
            r"
            SELECT scheduled_at, duration_minutes FROM shop.appointments
            WHERE stylist_id = $1
              AND status IN ('pending', 'confirmed')
              AND scheduled_at >= $2 AND scheduled_at < $3
            ORDER BY scheduled_at
            ",
        )
        .bind(stylist_id)
        .bind(from)
        .bind(to)
        .fetch_all(conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(start, duration_minutes)| Booking {
                start,
                duration_minutes,
            })
            .collect())
    }

    /// Pool variant of [`Self::active_bookings_in`] for read-only lookups.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn active_bookings(
        &self,
        stylist_id: StylistId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::active_bookings_in(&mut conn, stylist_id, from, to).await
    }

    /// Serialize bookings for one stylist until the transaction ends.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the lock query fails.
    pub async fn lock_stylist(conn: &mut PgConnection, stylist_id: StylistId) -> Result<(), RepositoryError> {
        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(STYLIST_LOCK_CLASS)
            .bind(stylist_id)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Insert an appointment with status `pending`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(conn, new), fields(scheduled_at = %new.scheduled_at))]
    pub async fn insert(
        conn: &mut PgConnection,
        new: &NewAppointment<'_>,
    ) -> Result<Appointment, RepositoryError> {
        let (id,): (AppointmentId,) = sqlx::query_as(
            r"
            INSERT INTO shop.appointments
                (customer_id, customer_name, customer_email, customer_phone, service_id,
                 stylist_id, scheduled_at, duration_minutes, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            ",
        )
        .bind(new.customer_id)
        .bind(new.customer_name)
        .bind(new.customer_email)
        .bind(new.customer_phone)
        .bind(new.service_id)
        .bind(new.stylist_id)
        .bind(new.scheduled_at)
        .bind(new.duration_minutes)
        .bind(new.notes)
        .fetch_one(&mut *conn)
        .await?;

        Self::get_in(conn, id).await?.ok_or_else(|| {
            RepositoryError::DataCorruption(format!("appointment {id} vanished after insert"))
        })
    }

    async fn get_in(
        conn: &mut PgConnection,
        id: AppointmentId,
    ) -> Result<Option<Appointment>, RepositoryError> {
        let appointment = sqlx::query_as::<_, Appointment>(&format!("{APPOINTMENT_SELECT} WHERE a.id = $1"))
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(appointment)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: AppointmentId) -> Result<Option<Appointment>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::get_in(&mut conn, id).await
    }

    /// Active appointments starting in `[from, until]` that have not been
    /// reminded yet, soonest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn due_for_reminder(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let appointments = sqlx::query_as::<_, Appointment>(&format!(
            r"
            {APPOINTMENT_SELECT}
            WHERE a.reminder_sent_at IS NULL
              AND a.status IN ('pending', 'confirmed')
              AND a.scheduled_at >= $1 AND a.scheduled_at <= $2
            ORDER BY a.scheduled_at, a.id
            LIMIT $3
            "
        ))
        .bind(from)
        .bind(until)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(appointments)
    }

    /// Stamp the reminder time. Returns `false` if another run got there
    /// first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_reminder_sent(
        &self,
        id: AppointmentId,
        at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.appointments SET reminder_sent_at = $2, updated_at = NOW()
            WHERE id = $1 AND reminder_sent_at IS NULL
            ",
        )
        .bind(id)
        .bind(at)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// One page of appointments for the admin API, soonest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &AppointmentFilter,
        page: PageParams,
    ) -> Result<(Vec<Appointment>, i64), RepositoryError> {
        const WHERE: &str = r"
            WHERE ($1::shop.appointment_status IS NULL OR a.status = $1)
              AND ($2::timestamptz IS NULL OR a.scheduled_at >= $2)
              AND ($3::timestamptz IS NULL OR a.scheduled_at < $3)
              AND ($4::int IS NULL OR a.stylist_id = $4)
        ";
        let (from, to) = filter.between.unzip();

        let (total,): (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM shop.appointments a {WHERE}"))
                .bind(filter.status)
                .bind(from)
                .bind(to)
                .bind(filter.stylist_id)
                .fetch_one(self.pool)
                .await?;

        let appointments = sqlx::query_as::<_, Appointment>(&format!(
            "{APPOINTMENT_SELECT} {WHERE} ORDER BY a.scheduled_at, a.id LIMIT $5 OFFSET $6"
        ))
        .bind(filter.status)
        .bind(from)
        .bind(to)
        .bind(filter.stylist_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok((appointments, total))
    }

    /// Lock an appointment row for a status change.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lock(
        conn: &mut PgConnection,
        id: AppointmentId,
    ) -> Result<Option<Appointment>, RepositoryError> {
        let appointment = sqlx::query_as::<_, Appointment>(&format!(
            "{APPOINTMENT_SELECT} WHERE a.id = $1 FOR UPDATE OF a"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(appointment)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the appointment does not exist.
    pub async fn set_status(
        conn: &mut PgConnection,
        id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment, RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.appointments SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Self::get_in(conn, id).await?.ok_or(RepositoryError::NotFound)
    }
}
