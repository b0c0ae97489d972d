//! Item fetcher implementations.
//!
//! # Available Fetchers
//!
//! - `HttpFetcher` - One GET per identifier with an optional fixed delay
//! - `MockFetcher` - For testing
//!
//! # Example
//!
//! ```rust,ignore
//! use harvester::fetchers::{HttpFetcher, ItemFetcher};
//! use harvester::HarvestConfig;
//!
//! let fetcher = HttpFetcher::new(&HarvestConfig::from_env()?)?;
//! let payload = fetcher.fetch(36059).await?;
//! ```

mod http;
mod mock;

pub use http::HttpFetcher;
pub use mock::MockFetcher;

// Re-export from traits for convenience
pub use crate::traits::fetcher::ItemFetcher;
