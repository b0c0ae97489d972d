//! Activity log sinks.
//!
//! - `FileActivityLog` - appends timestamped lines to a text file
//! - `MemoryActivityLog` - keeps lines in memory for tests

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::traits::activity::ActivityLog;
use crate::types::summary::ItemOutcome;

/// Appends `<RFC3339 timestamp> <line>` to a file, one line per outcome.
///
/// The file is created if missing and reopened in append mode per line.
#[derive(Debug, Clone)]
pub struct FileActivityLog {
    path: PathBuf,
}

impl FileActivityLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ActivityLog for FileActivityLog {
    async fn record(&self, outcome: &ItemOutcome) -> Result<()> {
        let line = format!(
            "{} {}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            outcome.log_line()
        );

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// In-memory activity log for testing. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryActivityLog {
    lines: Arc<RwLock<Vec<String>>>,
}

impl MemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded lines, without timestamps.
    pub fn lines(&self) -> Vec<String> {
        self.lines.read().unwrap().clone()
    }
}

#[async_trait]
impl ActivityLog for MemoryActivityLog {
    async fn record(&self, outcome: &ItemOutcome) -> Result<()> {
        self.lines.write().unwrap().push(outcome.log_line());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn test_file_log_appends_timestamped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileActivityLog::new(dir.path().join("ItemLog.txt"));

        log.record(&ItemOutcome::Skipped { id: 5 }).await.unwrap();
        log.record(&ItemOutcome::Saved {
            id: 6,
            stock_code: 60,
            name: "Milk".to_string(),
        })
        .await
        .unwrap();

        let content = tokio::fs::read_to_string(log.path()).await.unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let (stamp, text) = lines[0].split_once(' ').unwrap();
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
        assert_eq!(text, "Item: 5 does not exist or does not have a Price.");
        assert!(lines[1].ends_with(" Item ID: 60 - Milk"));
    }

    #[tokio::test]
    async fn test_file_log_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ItemLog.txt");
        std::fs::write(&path, "earlier run\n").unwrap();

        FileActivityLog::new(&path)
            .record(&ItemOutcome::Skipped { id: 1 })
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("earlier run\n"));
        assert_eq!(content.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_file_log_unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileActivityLog::new(dir.path().join("missing").join("ItemLog.txt"));

        let err = log.record(&ItemOutcome::Skipped { id: 1 }).await.unwrap_err();
        assert!(matches!(err, crate::HarvestError::Io(_)));
    }

    #[tokio::test]
    async fn test_memory_log_shares_lines() {
        let log = MemoryActivityLog::new();
        log.clone()
            .record(&ItemOutcome::Errored {
                id: 3,
                reason: "boom".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(log.lines(), vec!["Item: 3 is a faulty itemcode. (boom)"]);
    }
}
