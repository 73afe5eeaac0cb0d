//! Result and error types for Mirar.

use thiserror::Error;

/// Result type for Mirar operations
pub type MirarResult<T> = Result<T, MirarError>;

/// Errors that can occur in Mirar
#[derive(Debug, Error)]
pub enum MirarError {
    /// Assertion failed (`must`/`must_not` outcome)
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Harness misconfiguration (e.g. text selector without a font face)
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Input injection error
    #[error("Input injection failed: {message}")]
    Input {
        /// Error message
        message: String,
    },

    /// Image encoding/processing error
    #[error("Image processing failed: {message}")]
    Image {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MirarError {
    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
