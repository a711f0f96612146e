use serde::Serialize;
use thiserror::Error;

/// A single violated field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Validation failure carrying every violated constraint, not just the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation failed: ")?;
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", v.field, v.message)?;
        }
        Ok(())
    }
}

/// Accumulator for field violations. Operations collect every problem with an
/// input before rejecting it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// ## Summary
    /// Converts the accumulated violations into a result: `Ok(())` when no
    /// violation was recorded, `Err(CoreError::Validation)` otherwise.
    ///
    /// ## Errors
    /// Returns `CoreError::Validation` listing every recorded violation.
    pub fn into_result(self) -> CoreResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(ValidationError { violations: self.0 }))
        }
    }
}

/// Core error type with minimal dependencies
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Illegal status transition: {from} -> {to}")]
    IllegalTransition { from: String, to: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

impl CoreError {
    /// Shorthand for a single-field validation error.
    #[must_use]
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(ValidationError {
            violations: vec![FieldViolation {
                field: field.into(),
                message: message.into(),
            }],
        })
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
