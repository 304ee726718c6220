//! CLI command implementations.

pub mod migrate;
pub mod reminders;
pub mod seed;
