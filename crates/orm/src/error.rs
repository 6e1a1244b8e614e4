//! Error types for the list/update engine
//!
//! Validation failures carry a structured [`ValidationError`]; persistence
//! failures are propagated unchanged as strings.

use rideshare_validation::ValidationError;
use thiserror::Error;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Error types for engine and store operations
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// Request input was rejected
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(String),
    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Model not found in store
    #[error("Record not found in table '{0}'")]
    NotFound(String),
    /// Primary key is missing or invalid
    #[error("Primary key is missing or invalid")]
    MissingPrimaryKey,
}

impl ModelError {
    /// The underlying validation failure, if this is one
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            ModelError::Validation(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ModelError::NotFound(_))
    }
}

// Convert from sqlx errors
impl From<sqlx::Error> for ModelError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ModelError::NotFound("row".to_string()),
            other => ModelError::Database(other.to_string()),
        }
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_conversion() {
        let err: ModelError = ValidationError::unknown_filter_field("nonexistent").into();
        let inner = err.validation().unwrap();
        assert_eq!(inner.message, "unknown filter field");
        assert_eq!(
            err.to_string(),
            "Validation error: nonexistent: unknown filter field"
        );
    }

    #[test]
    fn test_serde_conversion() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ModelError::from(parse);
        assert!(matches!(err, ModelError::Serialization(_)));
        assert!(!err.is_not_found());
    }
}
