// Validation errors and the uniform rejection envelope

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Human message carried by every rejection envelope.
pub const REJECTION_MESSAGE: &str = "Validation failed. Please check your input.";

/// Outcome of a custom check.
///
/// `Invalid` is an expected rejection and carries the message shown to the
/// caller. `Internal` marks an anomaly inside the check itself; the runner
/// records a generic failure for the field and logs the detail for operators.
#[derive(Debug, Clone)]
pub enum CheckError {
    Invalid(String),
    Internal(String),
}

impl CheckError {
    /// Expected rejection with a caller-facing message
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// Engine anomaly; the detail is logged, never shown to the caller
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(msg) => write!(f, "{}", msg),
            Self::Internal(detail) => write!(f, "internal check fault: {}", detail),
        }
    }
}

impl std::error::Error for CheckError {}

/// Validation error for a single failing constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Field name that failed validation
    pub field: String,

    /// Error message
    pub message: String,

    /// Validation constraint that failed
    pub constraint: String,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            constraint: "custom".to_string(),
        }
    }

    /// Set the constraint name
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = constraint.into();
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Ordered collection of validation errors for one request.
///
/// Order follows field declaration order, and within a field, constraint
/// declaration order. A field with several failing constraints contributes
/// several entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Add an error
    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Get errors for a specific field
    pub fn field_errors(&self, field: &str) -> Vec<&ValidationError> {
        self.errors.iter().filter(|e| e.field == field).collect()
    }

    /// Render the uniform rejection envelope.
    ///
    /// Each entry is a single-key map from field name to message; a field with
    /// two failing constraints yields two entries with the same key.
    pub fn to_json(&self) -> Value {
        let entries: Vec<Value> = self
            .errors
            .iter()
            .map(|e| {
                let mut entry = Map::new();
                entry.insert(e.field.clone(), Value::String(e.message.clone()));
                Value::Object(entry)
            })
            .collect();

        serde_json::json!({
            "message": REJECTION_MESSAGE,
            "errors": entries,
        })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::new(errors)
    }
}
