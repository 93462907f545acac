//! CedarLint error types.

use thiserror::Error;

/// Errors raised by the infrastructure around validation.
///
/// Problems inside the validated documents are never errors: they are
/// reported as diagnostics.
#[derive(Debug, Error)]
pub enum CedarLintError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O error.
    #[error("File error: {0}")]
    File(String),

    /// Schema translation error.
    #[error("Schema error: {0}")]
    Schema(String),
}

impl CedarLintError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a file error.
    pub fn file(message: impl Into<String>) -> Self {
        Self::File(message.into())
    }

    /// Creates a schema error.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }
}
