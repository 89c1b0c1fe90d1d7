use std::path::Path;
use std::sync::Arc;

use time::Date;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::archive::ArchiveRepository;
use super::model::{DailyTotals, LogChanged, LogEntry, NewLogEntry};
use crate::clock::{months_before, Clock, IdGenerator};
use crate::error::StorageError;
use crate::persistence::LazyCollection;

pub const FOOD_LOG_FILE: &str = "foodlog.json";
pub const FOOD_LOG_VERSION: u32 = 1;

/// The active food log. Every mutation rewrites `foodlog.json` in full and,
/// once the collection lock is released, notifies subscribers.
pub struct FoodLogRepository {
    entries: LazyCollection<LogEntry>,
    archive: Arc<ArchiveRepository>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    changes: broadcast::Sender<LogChanged>,
}

impl FoodLogRepository {
    pub fn new(
        data_dir: &Path,
        archive: Arc<ArchiveRepository>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            entries: LazyCollection::new(data_dir.join(FOOD_LOG_FILE), FOOD_LOG_VERSION),
            archive,
            clock,
            ids,
            changes,
        }
    }

    pub fn archive(&self) -> &ArchiveRepository {
        &self.archive
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogChanged> {
        self.changes.subscribe()
    }

    fn notify(&self) {
        // no subscribers is fine
        let _ = self.changes.send(LogChanged);
    }

    /// Stores `new` and returns it with its id. A caller-supplied id that is
    /// already present replaces that entry, so ids stay unique.
    pub async fn add_entry(&self, new: NewLogEntry) -> Result<LogEntry, StorageError> {
        let id = new
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| self.ids.next_id());
        let entry = new.into_entry(id);

        let mut guard = self.entries.lock().await;
        let mut next = guard.items().to_vec();
        match next.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry.clone(),
            None => next.push(entry.clone()),
        }
        guard.commit(next).await?;
        drop(guard);

        self.notify();
        debug!(id = %entry.id, date = %entry.date, "log entry added");
        Ok(entry)
    }

    /// Entries for `date`, ordered by meal.
    pub async fn entries_for_date(&self, date: Date) -> Vec<LogEntry> {
        let mut out: Vec<LogEntry> = self
            .entries
            .read(|xs| xs.iter().filter(|e| e.date == date).cloned().collect())
            .await;
        out.sort_by_key(|e| e.meal);
        out
    }

    /// Entries with `start <= date <= end`, ordered by date then meal.
    pub async fn entries_between(&self, start: Date, end: Date) -> Vec<LogEntry> {
        let mut out: Vec<LogEntry> = self
            .entries
            .read(|xs| {
                xs.iter()
                    .filter(|e| e.date >= start && e.date <= end)
                    .cloned()
                    .collect()
            })
            .await;
        out.sort_by_key(|e| (e.date, e.meal));
        out
    }

    pub async fn all_entries(&self) -> Vec<LogEntry> {
        self.entries.read(|xs| xs.to_vec()).await
    }

    pub async fn daily_totals(&self, date: Date) -> DailyTotals {
        self.entries
            .read(|xs| {
                let mut totals = DailyTotals {
                    date: Some(date),
                    ..DailyTotals::default()
                };
                for e in xs.iter().filter(|e| e.date == date) {
                    totals.entries += 1;
                    totals.nutrients += e.nutrients();
                }
                totals
            })
            .await
    }

    /// Removes the entry with `id`. Returns `false` without writing when no
    /// such entry exists.
    pub async fn delete_entry(&self, id: &str) -> Result<bool, StorageError> {
        let removed = self
            .entries
            .update(|xs| {
                let pos = xs.iter().position(|e| e.id == id)?;
                xs.remove(pos);
                Some(())
            })
            .await?
            .is_some();
        if removed {
            self.notify();
            debug!(%id, "log entry deleted");
        }
        Ok(removed)
    }

    /// Moves entries dated before `today - months_old` (calendar months) into
    /// the archive and returns how many moved.
    ///
    /// The archive is written before the shrunk log, so a failure between the
    /// two writes leaves entries in both files rather than in neither.
    pub async fn archive_older_than(&self, months_old: u32) -> Result<usize, StorageError> {
        if months_old == 0 {
            return Ok(0);
        }
        let cutoff = months_before(self.clock.today(), months_old);

        let mut guard = self.entries.lock().await;
        let (moved, keep): (Vec<LogEntry>, Vec<LogEntry>) =
            guard.items().iter().cloned().partition(|e| e.date < cutoff);
        if moved.is_empty() {
            return Ok(0);
        }

        let count = moved.len();
        self.archive.append(moved).await?;
        guard.commit(keep).await?;
        drop(guard);

        self.notify();
        info!(count, %cutoff, "log entries moved to archive");
        Ok(count)
    }
}
