use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

/// Hard ceiling on any page size, whatever the configuration says
pub const MAX_PAGE_SIZE: u64 = 200;

/// Environment enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Testing,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::invalid_value(
                "environment",
                s,
                "development, testing, or production",
            )),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let env_str = match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
        };
        write!(f, "{}", env_str)
    }
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_testing(&self) -> bool {
        matches!(self, Environment::Testing)
    }
}

/// Page-size policy for list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Page size used when a request names none
    pub default_limit: u64,
    /// Largest page size a request may ask for
    pub max_limit: u64,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: MAX_PAGE_SIZE,
        }
    }
}

impl ListingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_limit == 0 || self.max_limit > MAX_PAGE_SIZE {
            return Err(ConfigError::invalid_value(
                "listing.max_limit",
                self.max_limit.to_string(),
                format!("between 1 and {}", MAX_PAGE_SIZE),
            ));
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(ConfigError::invalid_value(
                "listing.default_limit",
                self.default_limit.to_string(),
                format!("between 1 and {}", self.max_limit),
            ));
        }
        Ok(())
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: Environment,
    pub database_url: Option<String>,
    pub log_level: String,
    /// Public origin prefixed to media paths, e.g. `https://cdn.example.com`
    pub domain: String,
    pub listing: ListingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            database_url: None,
            log_level: "info".to_string(),
            domain: String::new(),
            listing: ListingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Configuration used by test suites
    pub fn testing() -> Self {
        Self {
            environment: Environment::Testing,
            log_level: "warn".to_string(),
            ..Self::default()
        }
    }

    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(env_str) = lookup("APP_ENV") {
            config.environment = env_str.parse()?;
        }

        config.database_url = lookup("DATABASE_URL");

        if let Some(log_level) = lookup("LOG_LEVEL") {
            config.log_level = log_level.to_lowercase();
        }

        if let Some(domain) = lookup("DOMAIN") {
            config.domain = domain;
        }

        if let Some(raw) = lookup("LIST_DEFAULT_LIMIT") {
            config.listing.default_limit = parse_limit("LIST_DEFAULT_LIMIT", &raw)?;
        }

        if let Some(raw) = lookup("LIST_MAX_LIMIT") {
            config.listing.max_limit = parse_limit("LIST_MAX_LIMIT", &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML document on disk
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::invalid_value(
                "log_level",
                self.log_level.clone(),
                format!("one of: {}", valid_levels.join(", ")),
            ));
        }

        if self.environment.is_production() && self.database_url.is_none() {
            return Err(ConfigError::missing_required(
                "database_url",
                "DATABASE_URL environment variable is required in production",
            ));
        }

        self.listing.validate()
    }

    /// Prefix a stored media path with the public domain
    pub fn media_url(&self, path: &str) -> String {
        format!("{}{}", self.domain.trim_end_matches('/'), path)
    }
}

fn parse_limit(var: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::invalid_value(var, raw, "a positive integer"))
}
