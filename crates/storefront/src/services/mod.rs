//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `checkout` - Server-side pricing, coupon checks and order placement
//! - `booking` - Salon availability and appointment booking
//! - `reminders` - Appointment reminder batch (cron route and CLI)
//! - `email` - Transactional email over SMTP
//!
//! Services take a `&PgPool` and own their transactions; route handlers only
//! translate HTTP in and out.

pub mod booking;
pub mod checkout;
pub mod email;
pub mod reminders;
