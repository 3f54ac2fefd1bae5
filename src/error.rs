//! Error types for formschema
//!
//! Validation failures are never Rust errors: they are accumulated as
//! [`Problem`](crate::report::Problem)s in an [`ErrorTree`](crate::report::ErrorTree).
//! The types here cover the fallible construction-time operations (checking a
//! schema, compiling a pattern, parsing an option) and the error channel that
//! user-supplied predicates and transforms report through.

use std::fmt;
use thiserror::Error;

/// Result type alias using formschema Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for formschema operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed schema (bad group reference, empty condition, invalid pattern)
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Invalid configuration value
    #[error("config error: {0}")]
    Config(String),
}

/// Schema construction error with context
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError {
    /// Error message
    pub message: String,
    /// Key path to the offending schema entry
    pub path: Option<String>,
    /// Underlying reason
    pub reason: Option<String>,
}

impl SchemaError {
    /// Create a new schema error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            reason: None,
        }
    }

    /// Set the key path of the offending entry
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref path) = self.path {
            write!(f, " (at {})", path)?;
        }

        if let Some(ref reason) = self.reason {
            write!(f, ": {}", reason)?;
        }

        Ok(())
    }
}

impl std::error::Error for SchemaError {}

/// Failure reported by a user-supplied predicate or transform.
///
/// This is the only way a callback can fail. The message is recorded
/// verbatim in the error tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackError {
    message: String,
}

impl CallbackError {
    /// Create a new callback error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CallbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CallbackError {}

impl From<String> for CallbackError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for CallbackError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<std::num::ParseIntError> for CallbackError {
    fn from(err: std::num::ParseIntError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<std::num::ParseFloatError> for CallbackError {
    fn from(err: std::num::ParseFloatError) -> Self {
        Self::new(err.to_string())
    }
}
