pub mod app_config;
pub mod error;

pub use app_config::*;
pub use error::ConfigError;
