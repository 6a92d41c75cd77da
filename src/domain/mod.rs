//! Core domain types and logic.

pub mod error;
pub mod dates;
pub mod units;
pub mod forecast;
pub mod deal;
pub mod store;
pub mod reconcile;
pub mod weekly;
pub mod coverage;
pub mod session;
pub mod config_validation;
