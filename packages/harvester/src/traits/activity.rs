//! Activity log trait.
//!
//! The activity log receives one human-readable line per scanned identifier.
//! It is append-only and best-effort: the driver logs and ignores write
//! failures instead of aborting the run.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::summary::ItemOutcome;

/// Append-only sink for per-item outcome lines.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// Append one outcome.
    async fn record(&self, outcome: &ItemOutcome) -> Result<()>;
}

/// Activity log that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopActivityLog;

#[async_trait]
impl ActivityLog for NoopActivityLog {
    async fn record(&self, _outcome: &ItemOutcome) -> Result<()> {
        Ok(())
    }
}
