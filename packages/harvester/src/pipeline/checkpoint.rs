//! Range checkpoint: the in-memory owner of the scan window for one run.

use std::ops::RangeInclusive;
use tracing::info;

use crate::error::{HarvestError, Result};
use crate::traits::store::RecordStore;
use crate::types::checkpoint::ScanCheckpoint;

/// Scan window loaded at run start and written back once at run end.
///
/// `advance` only touches memory; nothing is persisted until `save`.
#[derive(Debug, Clone)]
pub struct RangeCheckpoint {
    loaded: ScanCheckpoint,
    current: ScanCheckpoint,
}

impl RangeCheckpoint {
    /// Read the checkpoint from the store.
    ///
    /// A missing or inverted checkpoint is fatal: the run must not guess a
    /// window.
    pub async fn load<S: RecordStore + ?Sized>(store: &S) -> Result<Self> {
        let checkpoint = store
            .find_checkpoint()
            .await?
            .ok_or(HarvestError::CheckpointMissing)?;
        checkpoint.validate()?;
        Ok(Self {
            loaded: checkpoint,
            current: checkpoint,
        })
    }

    /// Window as loaded, before any advance.
    pub fn loaded(&self) -> ScanCheckpoint {
        self.loaded
    }

    /// Current (possibly advanced) bounds.
    pub fn current(&self) -> ScanCheckpoint {
        self.current
    }

    /// Identifiers to scan this run.
    pub fn window(&self) -> RangeInclusive<i64> {
        self.loaded.from..=self.loaded.to
    }

    /// Number of identifiers to scan this run.
    pub fn len(&self) -> u64 {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    /// Shift both bounds by `stride`, regardless of how many identifiers in
    /// the window produced records.
    pub fn advance(&mut self, stride: i64) -> Result<()> {
        self.current = self.current.shifted(stride)?;
        Ok(())
    }

    /// Persist the current bounds.
    pub async fn save<S: RecordStore + ?Sized>(&self, store: &S) -> Result<()> {
        store.save_checkpoint(&self.current).await?;
        info!(
            from = self.current.from,
            to = self.current.to,
            "Scan checkpoint saved"
        );
        Ok(())
    }
}
