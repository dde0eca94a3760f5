//! Core domain types and logic.

pub mod asset;
pub mod config_validation;
pub mod dashboard;
pub mod error;
pub mod metrics;
pub mod series;
pub mod time_point;
pub mod transition;
