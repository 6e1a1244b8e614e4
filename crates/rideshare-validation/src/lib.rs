//! # rideshare-validation
//!
//! Field-level validation errors plus the permissive coercion and date
//! parsing rules applied to request input before it reaches the list and
//! update engine.

pub mod coerce;
pub mod date;
pub mod error;

pub use date::{format_datetime, parse_date, parse_date_field};
pub use error::{codes, ValidationError, ValidationResult};
