//! Crawl driver - scan the checkpoint window, fetch → normalize → store.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::HarvestConfig;
use crate::error::Result;
use crate::pipeline::{checkpoint::RangeCheckpoint, normalize::normalize};
use crate::traits::{
    activity::{ActivityLog, NoopActivityLog},
    fetcher::ItemFetcher,
    store::RecordStore,
};
use crate::types::summary::{ItemOutcome, RunStatus, RunSummary};

/// Orchestrates one harvest run.
///
/// Identifiers are visited strictly in ascending order with one fetch in
/// flight at a time. Per-item fetch and normalization failures are counted
/// and logged; store failures abort the run. The checkpoint is advanced and
/// saved exactly once, after the last identifier in the window.
///
/// # Example
///
/// ```rust,ignore
/// use harvester::{CrawlDriver, HarvestConfig, HttpFetcher, MemoryStore};
///
/// let config = HarvestConfig::from_env()?;
/// let driver = CrawlDriver::new(HttpFetcher::new(&config)?, store, &config);
/// let summary = driver.run().await?;
/// ```
pub struct CrawlDriver<F, S, L = NoopActivityLog> {
    fetcher: F,
    store: S,
    activity: L,
    store_id: String,
    stride: i64,
}

impl<F, S> CrawlDriver<F, S, NoopActivityLog>
where
    F: ItemFetcher,
    S: RecordStore,
{
    /// Create a driver without an activity log.
    pub fn new(fetcher: F, store: S, config: &HarvestConfig) -> Self {
        Self {
            fetcher,
            store,
            activity: NoopActivityLog,
            store_id: config.store_id.clone(),
            stride: config.checkpoint_stride,
        }
    }
}

impl<F, S, L> CrawlDriver<F, S, L> {
    /// Attach an activity log.
    pub fn with_activity_log<L2: ActivityLog>(self, activity: L2) -> CrawlDriver<F, S, L2> {
        CrawlDriver {
            fetcher: self.fetcher,
            store: self.store,
            activity,
            store_id: self.store_id,
            stride: self.stride,
        }
    }

    /// Underlying store, e.g. to close its connections.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<F, S, L> CrawlDriver<F, S, L>
where
    F: ItemFetcher,
    S: RecordStore,
    L: ActivityLog,
{
    /// Scan the whole window.
    pub async fn run(&self) -> Result<RunSummary> {
        self.run_with_cancel(CancellationToken::new()).await
    }

    /// Scan the window, stopping early if `cancel` fires.
    ///
    /// Cancellation is honoured before each fetch and while a fetch is in
    /// flight, never during a store write. An interrupted run leaves the
    /// persisted checkpoint untouched so the same window is rescanned next
    /// time.
    pub async fn run_with_cancel(&self, cancel: CancellationToken) -> Result<RunSummary> {
        let mut checkpoint = RangeCheckpoint::load(&self.store).await?;
        let mut summary = RunSummary::new(checkpoint.loaded());

        info!(
            from = checkpoint.loaded().from,
            to = checkpoint.loaded().to,
            items = checkpoint.len(),
            fetcher = self.fetcher.name(),
            "Harvest run starting"
        );

        for id in checkpoint.window() {
            if cancel.is_cancelled() {
                return Ok(self.interrupted(summary, id));
            }

            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = self.fetcher.fetch(id) => Some(result),
            };
            let Some(fetched) = fetched else {
                return Ok(self.interrupted(summary, id));
            };

            let outcome = match fetched {
                Ok(payload) => match normalize(&payload, &self.store_id) {
                    Ok(Some(record)) => {
                        self.store.create_product(&record).await?;
                        info!(
                            id,
                            stock_code = record.stock_code,
                            name = record.label(),
                            "Product saved"
                        );
                        ItemOutcome::Saved {
                            id,
                            stock_code: record.stock_code,
                            name: record.label().to_string(),
                        }
                    }
                    Ok(None) => {
                        info!(id, "Item does not exist or has no price, moving on");
                        ItemOutcome::Skipped { id }
                    }
                    Err(e) => {
                        warn!(id, error = %e, "Payload could not be normalized");
                        ItemOutcome::Errored {
                            id,
                            reason: e.to_string(),
                        }
                    }
                },
                Err(e) => {
                    warn!(id, error = %e, "Fetch failed");
                    ItemOutcome::Errored {
                        id,
                        reason: e.to_string(),
                    }
                }
            };

            if let Err(e) = self.activity.record(&outcome).await {
                warn!(id, error = %e, "Failed to write activity log line");
            }
            summary.record(&outcome);
        }

        checkpoint.advance(self.stride)?;
        checkpoint.save(&self.store).await?;
        summary.status = RunStatus::Completed {
            next: checkpoint.current(),
        };

        info!(
            "Harvest complete: {} scanned, {} saved, {} skipped, {} errored",
            summary.scanned, summary.saved, summary.skipped, summary.errored
        );

        Ok(summary)
    }

    fn interrupted(&self, mut summary: RunSummary, resume_from: i64) -> RunSummary {
        warn!(
            resume_from,
            scanned = summary.scanned,
            "Harvest interrupted; checkpoint left unchanged"
        );
        summary.status = RunStatus::Interrupted { resume_from };
        summary
    }
}
