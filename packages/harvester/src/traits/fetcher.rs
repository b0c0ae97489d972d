//! Item fetcher trait.
//!
//! A fetcher turns one scanned identifier into a parsed JSON payload. It
//! performs exactly one request per call and never retries; the crawl
//! driver decides what a failure means for the run.
//!
//! # Usage
//!
//! ```rust,ignore
//! use harvester::{HttpFetcher, ItemFetcher};
//!
//! let fetcher = HttpFetcher::new(&config)?;
//! let payload = fetcher.fetch(42).await?;
//! ```

use async_trait::async_trait;

use crate::error::FetchResult;
use crate::types::payload::RawPayload;

/// Source of raw catalog payloads keyed by integer identifier.
#[async_trait]
pub trait ItemFetcher: Send + Sync {
    /// Fetch the payload for `id`.
    ///
    /// Fails with `FetchError::Transport` when the upstream cannot be
    /// reached or answers with a non-success status, and with
    /// `FetchError::Parse` when the body is not valid JSON.
    async fn fetch(&self, id: i64) -> FetchResult<RawPayload>;

    /// Get the fetcher name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
