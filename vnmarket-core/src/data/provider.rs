//! Fetcher trait and structured error types.
//!
//! The Fetcher trait abstracts over how raw bytes are retrieved (HTTP, an
//! in-memory body in tests) so the loaders never talk to the network directly.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable for {url}: {reason}")]
    NetworkUnreachable { url: String, reason: String },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("cannot parse '{value}' in column '{column}' at row {row}: {reason}")]
    Parse {
        column: String,
        row: usize,
        value: String,
        reason: String,
    },

    #[error("missing required column: {column}")]
    MissingColumn { column: String },

    #[error("response format changed: {0}")]
    Format(String),

    #[error("table error: {0}")]
    Polars(#[from] PolarsError),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl DataError {
    /// Transport failures and non-success statuses.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            DataError::NetworkUnreachable { .. } | DataError::HttpStatus { .. }
        )
    }

    /// Value coercion failures.
    pub fn is_parse(&self) -> bool {
        matches!(self, DataError::Parse { .. })
    }

    pub(crate) fn parse(
        column: &str,
        row: usize,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        DataError::Parse {
            column: column.to_string(),
            row,
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

/// Retrieves the raw body behind a URL.
///
/// Implementations must either return the complete body or fail; there is
/// no partial read.
pub trait Fetcher: Send + Sync {
    /// Human-readable name of this fetcher.
    fn name(&self) -> &str;

    /// Fetch the full body at `url`.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, DataError>;
}
