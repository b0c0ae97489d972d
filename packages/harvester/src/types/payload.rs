//! Raw upstream payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FetchError, FetchResult};

/// Parsed upstream body for one scanned identifier.
///
/// This is the output of an `ItemFetcher`: valid JSON that has not been
/// checked against the catalog shape yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPayload {
    /// Scanned identifier this payload was fetched for
    pub id: i64,

    /// Parsed response body
    pub body: Value,
}

impl RawPayload {
    pub fn new(id: i64, body: Value) -> Self {
        Self { id, body }
    }

    /// Parse a response body.
    pub fn parse(id: i64, text: &str) -> FetchResult<Self> {
        let body = serde_json::from_str(text).map_err(|source| FetchError::Parse { id, source })?;
        Ok(Self { id, body })
    }
}
