//! Error types for the dumper
//!
//! Only invalid arguments at the public entry points surface as errors.
//! Everything encountered while walking a value graph is rendered inline.

use thiserror::Error;

/// Result type alias for dumper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the dumper
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid options or composition-root misuse
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed positional format template
    #[error("Format error: {0}")]
    Format(String),

    /// Byte sink failures
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A caller-supplied `fmt::Write` sink refused output
    #[error("Sink rejected output")]
    Sink(#[from] std::fmt::Error),

    /// JSON options parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a format template error
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(format!("{:#}", err))
    }
}
