//! Per-item outcomes and per-run summaries.

use serde::Serialize;

use crate::types::checkpoint::ScanCheckpoint;

/// What happened to one scanned identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// A record was persisted
    Saved { id: i64, stock_code: i64, name: String },

    /// No product or no price upstream
    Skipped { id: i64 },

    /// Fetch or normalization failed
    Errored { id: i64, reason: String },
}

impl ItemOutcome {
    /// Scanned identifier this outcome belongs to.
    pub fn id(&self) -> i64 {
        match self {
            ItemOutcome::Saved { id, .. }
            | ItemOutcome::Skipped { id }
            | ItemOutcome::Errored { id, .. } => *id,
        }
    }

    /// Human-readable activity line.
    pub fn log_line(&self) -> String {
        match self {
            ItemOutcome::Saved {
                stock_code, name, ..
            } => format!("Item ID: {} - {}", stock_code, name),
            ItemOutcome::Skipped { id } => {
                format!("Item: {} does not exist or does not have a Price.", id)
            }
            ItemOutcome::Errored { id, reason } => {
                format!("Item: {} is a faulty itemcode. ({})", id, reason)
            }
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunStatus {
    /// Every identifier was visited; checkpoint advanced to `next`
    Completed { next: ScanCheckpoint },

    /// Cancelled before `resume_from` was fetched; checkpoint untouched
    Interrupted { resume_from: i64 },
}

/// Aggregate result of one harvest run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Window that was scanned
    pub window: ScanCheckpoint,

    /// Identifiers visited
    pub scanned: usize,

    /// Records persisted
    pub saved: usize,

    /// Identifiers with no product or no price
    pub skipped: usize,

    /// Identifiers that failed to fetch or normalize
    pub errored: usize,

    /// Errored identifiers in scan order
    pub errored_ids: Vec<i64>,

    pub status: RunStatus,
}

impl RunSummary {
    pub(crate) fn new(window: ScanCheckpoint) -> Self {
        Self {
            window,
            scanned: 0,
            saved: 0,
            skipped: 0,
            errored: 0,
            errored_ids: Vec::new(),
            status: RunStatus::Interrupted {
                resume_from: window.from,
            },
        }
    }

    pub(crate) fn record(&mut self, outcome: &ItemOutcome) {
        self.scanned += 1;
        match outcome {
            ItemOutcome::Saved { .. } => self.saved += 1,
            ItemOutcome::Skipped { .. } => self.skipped += 1,
            ItemOutcome::Errored { id, .. } => {
                self.errored += 1;
                self.errored_ids.push(*id);
            }
        }
    }

    /// True if the whole window was visited and the checkpoint advanced.
    pub fn is_complete(&self) -> bool {
        matches!(self.status, RunStatus::Completed { .. })
    }
}
