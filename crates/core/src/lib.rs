//! Salon Shop Core - Shared types and checkout arithmetic.
//!
//! This crate provides the pieces every other Salon Shop component agrees on:
//! - `storefront` - Public JSON API (catalog, checkout, bookings, reminders)
//! - `admin` - Back-office CRUD API
//! - `cli` - Migrations, seeding, one-shot jobs
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Pricing and slot computations live here so that the
//! storefront's checkout, its quote preview, and the tests all share exactly
//! one implementation.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, email, money, status enums
//! - [`pricing`] - Subtotal, shipping and grand-total computation
//! - [`coupon`] - Coupon eligibility and discount amounts
//! - [`booking`] - Appointment interval overlap and free-slot generation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod booking;
pub mod coupon;
pub mod pricing;
pub mod types;

pub use types::*;
