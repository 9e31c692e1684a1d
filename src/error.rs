//! Unified error handling for the slotsync crate
//!
//! Domain-specific errors (`FetchError` for partner transport) are wrapped
//! by a single [`Error`] enum usable across module boundaries. Cancellation
//! is a distinct marker variant, not a transport failure: the lane loop
//! matches on it to record an execution as interrupted rather than failed.

use std::io;
use thiserror::Error;

/// Errors from partner API transport.
///
/// None of these trigger an automatic retry anywhere in the system; they
/// propagate to abort the remaining day-fetches of the same product and
/// are swallowed into an empty result at the per-product boundary.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Partner returned 429
    #[error("partner rate limit exceeded")]
    RateLimited { retry_after: Option<String> },

    /// Non-2xx response
    #[error("partner server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("request timeout")]
    Timeout,
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, rate limit)
    Network,
    /// Storage and I/O errors
    Storage,
    /// Configuration and validation errors
    Config,
    /// Scheduler and cancellation
    Scheduler,
    /// Other/unknown errors
    Other,
}

/// Unified error type for the slotsync crate
#[derive(Error, Debug)]
pub enum Error {
    /// Partner transport errors
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Database errors
    #[error("database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("config error: {0}")]
    Config(String),

    /// Cooperative cancellation signal. Raised at lane checkpoints when a
    /// pause has aborted the execution's cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// True only for the cancellation marker.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) => ErrorCategory::Network,
            Self::Database(_) | Self::Io(_) => ErrorCategory::Storage,
            Self::Json(_) => ErrorCategory::Other,
            Self::Config(_) => ErrorCategory::Config,
            Self::Cancelled => ErrorCategory::Scheduler,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: err.to_string(),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
