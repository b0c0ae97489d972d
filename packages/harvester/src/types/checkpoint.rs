//! Scan window checkpoint.

use serde::{Deserialize, Serialize};

use crate::error::{HarvestError, Result};

/// Stride applied to both bounds after a completed scan.
pub const DEFAULT_CHECKPOINT_STRIDE: i64 = 7000;

/// Inclusive `[from, to]` identifier window persisted between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanCheckpoint {
    pub from: i64,
    pub to: i64,
}

impl ScanCheckpoint {
    pub fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }

    /// Reject windows with `from > to`.
    pub fn validate(&self) -> Result<()> {
        if self.from > self.to {
            return Err(HarvestError::InvalidCheckpoint {
                from: self.from,
                to: self.to,
            });
        }
        Ok(())
    }

    /// Number of identifiers in the window.
    pub fn len(&self) -> u64 {
        if self.from > self.to {
            0
        } else {
            self.to.abs_diff(self.from) + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The window shifted by `stride` on both bounds.
    pub fn shifted(&self, stride: i64) -> Result<Self> {
        let overflow = || HarvestError::CheckpointOverflow {
            from: self.from,
            to: self.to,
            stride,
        };
        Ok(Self {
            from: self.from.checked_add(stride).ok_or_else(overflow)?,
            to: self.to.checked_add(stride).ok_or_else(overflow)?,
        })
    }
}

impl std::fmt::Display for ScanCheckpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.from, self.to)
    }
}
