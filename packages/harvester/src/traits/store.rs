//! Record store trait.
//!
//! The store owns durable state across runs: the singleton scan checkpoint
//! and the harvested product records. Any failure here is fatal to a run.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{checkpoint::ScanCheckpoint, product::ProductRecord};

/// Persistence for checkpoints and product records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Get the current scan checkpoint, if one has been seeded.
    async fn find_checkpoint(&self) -> Result<Option<ScanCheckpoint>>;

    /// Persist the scan checkpoint, replacing any previous value.
    async fn save_checkpoint(&self, checkpoint: &ScanCheckpoint) -> Result<()>;

    /// Create a product record.
    ///
    /// Records are keyed by `(store_id, stock_code)`; creating an existing
    /// key replaces the stored record.
    async fn create_product(&self, product: &ProductRecord) -> Result<()>;

    /// Get a product by key.
    async fn find_product(&self, store_id: &str, stock_code: i64)
        -> Result<Option<ProductRecord>>;

    /// Count stored products.
    async fn count_products(&self) -> Result<u64>;
}
