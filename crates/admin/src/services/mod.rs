//! Business logic services for admin.
//!
//! # Services
//!
//! - `status` - Order and appointment status changes, with restocking on
//!   order cancellation

pub mod status;
