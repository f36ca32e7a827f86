//! In-process store, used by tests and one-shot runs.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use incident_model::{
    IncidentRow, StoredIncident, UploadHistoryEntry, UploadRecord, UploadUpdate,
};

use crate::error::{Result, StoreError};
use crate::store::{HistoryStore, IncidentStore, check_constraints, sort_newest_first};

#[derive(Debug, Default)]
struct Tables {
    incidents: Vec<StoredIncident>,
    uploads: Vec<UploadHistoryEntry>,
    next_incident_id: u64,
    next_upload_id: u64,
}

/// Incident and history tables behind one mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    insert_failure: Option<String>,
    history_failure: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every insert fails with `message`.
    pub fn with_insert_failure(mut self, message: impl Into<String>) -> Self {
        self.insert_failure = Some(message.into());
        self
    }

    /// Every history write fails with `message`.
    pub fn with_history_failure(mut self, message: impl Into<String>) -> Self {
        self.history_failure = Some(message.into());
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl IncidentStore for MemoryStore {
    fn insert_batch(&self, rows: &[IncidentRow]) -> Result<Vec<StoredIncident>> {
        if let Some(message) = &self.insert_failure {
            return Err(StoreError::Unavailable(message.clone()));
        }
        check_constraints(rows)?;

        let mut tables = self.lock()?;
        let created_at = Utc::now();
        let mut stored = Vec::with_capacity(rows.len());
        for row in rows {
            tables.next_incident_id += 1;
            stored.push(StoredIncident {
                id: tables.next_incident_id,
                created_at,
                row: row.clone(),
            });
        }
        tables.incidents.extend(stored.iter().cloned());
        Ok(stored)
    }

    fn incidents(&self) -> Result<Vec<StoredIncident>> {
        Ok(self.lock()?.incidents.clone())
    }
}

impl HistoryStore for MemoryStore {
    fn record(&self, record: UploadRecord) -> Result<UploadHistoryEntry> {
        if let Some(message) = &self.history_failure {
            return Err(StoreError::Unavailable(message.clone()));
        }
        let mut tables = self.lock()?;
        tables.next_upload_id += 1;
        let entry = record.into_entry(tables.next_upload_id, Utc::now());
        tables.uploads.push(entry.clone());
        Ok(entry)
    }

    fn list(&self, limit: Option<usize>) -> Result<Vec<UploadHistoryEntry>> {
        let mut entries = self.lock()?.uploads.clone();
        sort_newest_first(&mut entries);
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    fn delete(&self, id: u64) -> Result<()> {
        let mut tables = self.lock()?;
        let before = tables.uploads.len();
        tables.uploads.retain(|entry| entry.id != id);
        if tables.uploads.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    fn update_results(&self, id: u64, update: UploadUpdate) -> Result<UploadHistoryEntry> {
        let mut tables = self.lock()?;
        let entry = tables
            .uploads
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(StoreError::NotFound(id))?;
        entry.apply_update(update, Utc::now());
        Ok(entry.clone())
    }

    fn cleanup(&self, keep: usize) -> Result<usize> {
        let mut tables = self.lock()?;
        sort_newest_first(&mut tables.uploads);
        let removed = tables.uploads.len().saturating_sub(keep);
        tables.uploads.truncate(keep);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use incident_model::ProcessingStatus;

    use super::*;

    fn upload(name: &str, processed: usize, errors: usize) -> UploadRecord {
        UploadRecord {
            filename: name.to_string(),
            file_size: 10,
            total_rows: processed + errors,
            processed_rows: processed,
            error_rows: errors,
            quality_score: Some(80.0),
            error_details: None,
            mapping_rules: Vec::new(),
            processing_time_ms: 1,
            uploaded_by: None,
        }
    }

    #[test]
    fn history_crud() {
        let store = MemoryStore::new();
        let first = store.record(upload("a.csv", 2, 0)).unwrap();
        let second = store.record(upload("b.csv", 0, 3)).unwrap();
        assert_eq!(first.processing_status, ProcessingStatus::Success);
        assert_eq!(second.processing_status, ProcessingStatus::Error);

        let listed = store.list(None).unwrap();
        assert_eq!(listed[0].id, second.id);

        let updated = store
            .update_results(
                second.id,
                UploadUpdate {
                    processed_rows: 2,
                    error_rows: 1,
                    quality_score: None,
                    error_details: None,
                },
            )
            .unwrap();
        assert_eq!(updated.processing_status, ProcessingStatus::Partial);

        store.delete(first.id).unwrap();
        assert!(matches!(store.delete(first.id), Err(StoreError::NotFound(_))));
        assert_eq!(store.list(Some(10)).unwrap().len(), 1);
    }

    #[test]
    fn cleanup_keeps_newest() {
        let store = MemoryStore::new();
        for idx in 0..4 {
            store.record(upload(&format!("{idx}.csv"), 1, 0)).unwrap();
        }
        assert_eq!(store.cleanup(1).unwrap(), 3);
        let remaining = store.list(None).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].filename, "3.csv");
        assert_eq!(store.cleanup(5).unwrap(), 0);
    }
}
