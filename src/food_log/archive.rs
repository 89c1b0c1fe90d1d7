use std::collections::HashSet;
use std::path::Path;

use time::Date;
use tracing::info;

use super::model::LogEntry;
use crate::error::StorageError;
use crate::persistence::LazyCollection;

pub const ARCHIVE_FILE: &str = "foodlog_archive.json";
pub const ARCHIVE_VERSION: u32 = 1;

/// Append-only store for log entries moved out of the active log.
pub struct ArchiveRepository {
    entries: LazyCollection<LogEntry>,
}

impl ArchiveRepository {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            entries: LazyCollection::new(data_dir.join(ARCHIVE_FILE), ARCHIVE_VERSION),
        }
    }

    /// Appends entries whose ids are not archived yet and returns how many
    /// were added. Re-running an interrupted archive pass therefore does not
    /// duplicate anything.
    pub async fn append(&self, moved: Vec<LogEntry>) -> Result<usize, StorageError> {
        let added = self
            .entries
            .update(|archived| {
                let known: HashSet<String> = archived.iter().map(|e| e.id.clone()).collect();
                let fresh: Vec<LogEntry> = moved
                    .into_iter()
                    .filter(|e| !known.contains(&e.id))
                    .collect();
                if fresh.is_empty() {
                    return None;
                }
                let n = fresh.len();
                archived.extend(fresh);
                Some(n)
            })
            .await?
            .unwrap_or(0);
        if added > 0 {
            info!(added, "entries archived");
        }
        Ok(added)
    }

    pub async fn all_entries(&self) -> Vec<LogEntry> {
        self.entries.read(|xs| xs.to_vec()).await
    }

    pub async fn entries_for_date(&self, date: Date) -> Vec<LogEntry> {
        let mut out: Vec<LogEntry> = self
            .entries
            .read(|xs| xs.iter().filter(|e| e.date == date).cloned().collect())
            .await;
        out.sort_by_key(|e| e.meal);
        out
    }

    pub async fn len(&self) -> usize {
        self.entries.read(|xs| xs.len()).await
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
