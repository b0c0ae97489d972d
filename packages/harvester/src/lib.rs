//! Resumable Catalog Harvester
//!
//! Walks a numeric identifier space against a retail product-detail API,
//! normalizes every response that carries a priced product and persists it
//! as a `ProductRecord`. Progress is a persisted `[from, to]` window that
//! moves forward by a fixed stride after each completed run, so repeated
//! invocations sweep the catalog without revisiting finished windows.
//!
//! # Usage
//!
//! ```rust,ignore
//! use harvester::{CrawlDriver, FileActivityLog, HarvestConfig, HttpFetcher, PostgresStore};
//!
//! let config = HarvestConfig::from_env()?;
//! let store = PostgresStore::connect(&config).await?;
//! let driver = CrawlDriver::new(HttpFetcher::new(&config)?, store, &config)
//!     .with_activity_log(FileActivityLog::new("ItemLog.txt"));
//!
//! let summary = driver.run().await?;
//! println!("{} saved, {} skipped", summary.saved, summary.skipped);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (ItemFetcher, RecordStore, ActivityLog)
//! - [`types`] - Product records, payloads, checkpoints and run summaries
//! - [`pipeline`] - Normalizer, range checkpoint and crawl driver
//! - [`fetchers`] - Fetcher implementations (HttpFetcher, MockFetcher)
//! - [`stores`] - Storage implementations (MemoryStore, PostgresStore)
//! - [`activity`] - Activity log sinks
//! - [`config`] - Environment-driven configuration
//! - [`testing`] - Canned payloads and store doubles for testing

pub mod activity;
pub mod config;
pub mod error;
pub mod fetchers;
pub mod pipeline;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use activity::{FileActivityLog, MemoryActivityLog};
pub use config::HarvestConfig;
pub use error::{FetchError, FetchResult, HarvestError, NormalizeError, NormalizeResult, Result};
pub use fetchers::{HttpFetcher, MockFetcher};
pub use pipeline::{coerce_allergens, normalize, AllergenInput, CrawlDriver, RangeCheckpoint};
pub use stores::MemoryStore;
pub use traits::{
    activity::{ActivityLog, NoopActivityLog},
    fetcher::ItemFetcher,
    store::RecordStore,
};
pub use types::{
    checkpoint::{ScanCheckpoint, DEFAULT_CHECKPOINT_STRIDE},
    payload::RawPayload,
    product::{NutritionEntry, ProductRecord},
    summary::{ItemOutcome, RunStatus, RunSummary},
};

#[cfg(feature = "postgres")]
pub use stores::PostgresStore;
