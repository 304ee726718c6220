//! Salon appointments.

use chrono::{DateTime, Utc};
use salon_shop_core::booking::Booking;
use salon_shop_core::{AppointmentId, AppointmentStatus, CustomerId, Email, ServiceId, StylistId};
use serde::{Deserialize, Serialize};

/// An appointment, with the service and stylist names joined in for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Appointment {
    pub id: AppointmentId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub customer_email: Email,
    pub customer_phone: Option<String>,
    pub service_id: ServiceId,
    pub service_name: String,
    pub stylist_id: Option<StylistId>,
    pub stylist_name: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub reminder_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    #[must_use]
    pub const fn booking(&self) -> Booking {
        Booking {
            start: self.scheduled_at,
            duration_minutes: self.duration_minutes,
        }
    }
}

/// A free start time returned by the availability endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentSlot {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl AppointmentSlot {
    #[must_use]
    pub fn new(starts_at: DateTime<Utc>, duration_minutes: i32) -> Self {
        Self {
            starts_at,
            ends_at: Booking {
                start: starts_at,
                duration_minutes,
            }
            .end(),
        }
    }
}
