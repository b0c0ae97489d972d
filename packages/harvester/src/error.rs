//! Typed errors for the harvester library.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Per-item errors
//! (`FetchError`, `NormalizeError`) are handled inside the scan loop;
//! `HarvestError` is what aborts a run.

use thiserror::Error;

/// Errors raised while fetching one identifier from the upstream API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network failure, timeout, or non-success HTTP status
    #[error("transport error for item {id}: {source}")]
    Transport {
        id: i64,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Response body is not valid JSON
    #[error("parse error for item {id}: {source}")]
    Parse {
        id: i64,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Identifier the failed fetch was for.
    pub fn id(&self) -> i64 {
        match self {
            FetchError::Transport { id, .. } | FetchError::Parse { id, .. } => *id,
        }
    }
}

/// Errors raised when a payload cannot be normalized at all.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Payload shape is structurally wrong at `field`
    #[error("schema error at {field}: {reason}")]
    Schema { field: String, reason: String },
}

impl NormalizeError {
    pub(crate) fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        NormalizeError::Schema {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that abort a harvest run.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Record store unreachable or a write failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// No checkpoint has been seeded
    #[error("no scan checkpoint found; seed one before running")]
    CheckpointMissing,

    /// Stored checkpoint violates `from <= to`
    #[error("invalid scan checkpoint: from {from} > to {to}")]
    InvalidCheckpoint { from: i64, to: i64 },

    /// Advancing would overflow the identifier space
    #[error("checkpoint overflow advancing [{from}, {to}] by {stride}")]
    CheckpointOverflow { from: i64, to: i64, stride: i64 },

    /// Configuration missing or malformed
    #[error("config error: {key}: {reason}")]
    Config { key: String, reason: String },

    /// Local I/O failure (activity log file)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    pub(crate) fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        HarvestError::Storage(Box::new(err))
    }

    pub(crate) fn config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        HarvestError::Config {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for harvest operations.
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for normalization.
pub type NormalizeResult<T> = std::result::Result<T, NormalizeError>;
