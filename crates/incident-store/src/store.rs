//! Storage seams used by the pipeline.

use incident_model::{
    IncidentRow, StoredIncident, UploadHistoryEntry, UploadRecord, UploadStats, UploadUpdate,
};

use crate::error::Result;
use crate::history::upload_stats;

/// Default number of entries returned by [`HistoryStore::list`] callers.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Default number of entries kept by [`HistoryStore::cleanup`] callers.
pub const DEFAULT_KEEP_RECORDS: usize = 100;

/// Bulk storage for normalized incidents.
pub trait IncidentStore: Send + Sync {
    /// Inserts every row or none; returns the stored rows in input order.
    fn insert_batch(&self, rows: &[IncidentRow]) -> Result<Vec<StoredIncident>>;

    /// All stored incidents, oldest first.
    fn incidents(&self) -> Result<Vec<StoredIncident>>;

    fn count(&self) -> Result<usize> {
        Ok(self.incidents()?.len())
    }
}

/// Durable audit trail of upload runs.
pub trait HistoryStore: Send + Sync {
    /// Persists a run summary, assigning id, date and status.
    fn record(&self, record: UploadRecord) -> Result<UploadHistoryEntry>;

    /// Entries newest first, optionally limited.
    fn list(&self, limit: Option<usize>) -> Result<Vec<UploadHistoryEntry>>;

    fn get(&self, id: u64) -> Result<Option<UploadHistoryEntry>> {
        Ok(self.list(None)?.into_iter().find(|entry| entry.id == id))
    }

    fn delete(&self, id: u64) -> Result<()>;

    /// Replaces the results of a re-processed upload.
    fn update_results(&self, id: u64, update: UploadUpdate) -> Result<UploadHistoryEntry>;

    /// Deletes all but the newest `keep` entries, returning how many were removed.
    fn cleanup(&self, keep: usize) -> Result<usize>;

    fn stats(&self) -> Result<UploadStats> {
        Ok(upload_stats(&self.list(None)?))
    }
}

/// Sorts entries newest first; ties on date fall back to the higher id.
pub(crate) fn sort_newest_first(entries: &mut [UploadHistoryEntry]) {
    entries.sort_by(|a, b| {
        b.upload_date
            .cmp(&a.upload_date)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Rejects a batch if any row breaks a column constraint.
pub(crate) fn check_constraints(rows: &[IncidentRow]) -> Result<()> {
    for (idx, row) in rows.iter().enumerate() {
        if let Some(violation) = row.constraint_violation() {
            return Err(crate::error::StoreError::Rejected(format!(
                "row {}: {violation}",
                idx + 1
            )));
        }
    }
    Ok(())
}
