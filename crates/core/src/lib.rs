//! # rideshare-core
//!
//! Configuration and structured logging shared by every rideshare crate.

pub mod config;
pub mod logging;

pub use config::{AppConfig, ConfigError, Environment, ListingConfig, MAX_PAGE_SIZE};
pub use logging::{init_logging, LoggingConfig};
