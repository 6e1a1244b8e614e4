//! Validation error type shared by the filter normalizer, the query compiler
//! and the update reconciler.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Machine-readable error codes
pub mod codes {
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const LIMIT_OUT_OF_BOUNDS: &str = "limit_out_of_bounds";
    pub const INVALID_PAGE: &str = "invalid_page";
    pub const UNKNOWN_FILTER_FIELD: &str = "unknown_filter_field";
    pub const MALFORMED_FILTER: &str = "malformed_filter";
    pub const UNSUPPORTED_FILTER: &str = "unsupported_filter";
    pub const INVALID_DATE: &str = "invalid_date";
    pub const INVALID_TYPE: &str = "invalid_type";
    pub const INVALID_JSON: &str = "invalid_json";
    pub const INVALID_CHOICE: &str = "invalid_choice";
    pub const UNKNOWN_FIELD: &str = "unknown_field";
    pub const READ_ONLY: &str = "read_only";
    pub const NOT_NULLABLE: &str = "not_nullable";
}

/// Validation failure for a single field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for programmatic handling
    pub code: String,
    /// Additional context, usually the offending value
    pub context: Option<serde_json::Value>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: codes::VALIDATION_FAILED.to_string(),
            context: None,
        }
    }

    /// Create a validation error with a specific code
    pub fn with_code(
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
            context: None,
        }
    }

    /// Set the error code
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Set additional context
    pub fn context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Attach the rejected value as context
    pub fn rejected(self, value: impl Into<serde_json::Value>) -> Self {
        self.context(serde_json::json!({ "value": value.into() }))
    }

    /// Requested page size is outside the configured bounds
    pub fn limit_out_of_bounds(limit: i64, max: u64) -> Self {
        Self::with_code("limit", "limit out of bounds", codes::LIMIT_OUT_OF_BOUNDS)
            .context(serde_json::json!({ "value": limit, "min": 1, "max": max }))
    }

    /// Filter names a field the entity does not declare
    pub fn unknown_filter_field(field: impl Into<String>) -> Self {
        Self::with_code(field, "unknown filter field", codes::UNKNOWN_FILTER_FIELD)
    }

    /// Update payload names a field the entity does not have
    pub fn unknown_field(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("entity has no field `{}`", field);
        Self::with_code(field, message, codes::UNKNOWN_FIELD)
    }

    /// Update payload targets a field callers may not write
    pub fn read_only(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("field `{}` is read-only", field);
        Self::with_code(field, message, codes::READ_ONLY)
    }

    /// Explicit null on a non-nullable field
    pub fn not_nullable(field: impl Into<String>) -> Self {
        Self::with_code(field, "field cannot be null", codes::NOT_NULLABLE)
    }

    /// Convert to a JSON body for API responses
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.code,
                "message": self.message,
                "field": self.field,
                "context": self.context,
            }
        })
    }
}
