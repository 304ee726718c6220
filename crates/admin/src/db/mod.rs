//! Admin-only queries.
//!
//! Entity CRUD goes through the storefront repositories; this module holds
//! the reporting queries nothing public needs.

pub mod dashboard;

pub use dashboard::{DashboardRepository, DashboardStats, StatusCount};
