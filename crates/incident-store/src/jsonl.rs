//! File-backed store: one JSON document per line.
//!
//! Layout inside the store directory:
//!
//! - `incidents.jsonl`: append-only incident rows
//! - `uploads.jsonl`: upload history, rewritten on delete/update/cleanup
//!
//! Appends and rewrites are serialized by an in-process mutex. Rewrites go
//! through a temp file and a rename, so a crash leaves either the old or the
//! new file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;

use incident_model::{
    IncidentRow, StoredIncident, UploadHistoryEntry, UploadRecord, UploadUpdate,
};

use crate::error::{Result, StoreError};
use crate::store::{HistoryStore, IncidentStore, check_constraints, sort_newest_first};

pub const INCIDENTS_FILE: &str = "incidents.jsonl";
pub const UPLOADS_FILE: &str = "uploads.jsonl";

/// JSON-lines store rooted at a directory.
#[derive(Debug)]
pub struct JsonlStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl JsonlStore {
    /// Opens (and creates if needed) a store directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::Io {
            operation: "create directory",
            path: dir.clone(),
            source: e,
        })?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn incidents_path(&self) -> PathBuf {
        self.dir.join(INCIDENTS_FILE)
    }

    fn uploads_path(&self) -> PathBuf {
        self.dir.join(UPLOADS_FILE)
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>> {
        self.lock.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(StoreError::Io {
                operation: "open",
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let mut values = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| StoreError::Io {
            operation: "read",
            path: path.to_path_buf(),
            source: e,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let value = serde_json::from_str(&line).map_err(|e| StoreError::Deserialization {
            path: path.to_path_buf(),
            line: idx + 1,
            source: e,
        })?;
        values.push(value);
    }
    Ok(values)
}

fn encode_lines<T: Serialize>(values: &[T], what: &'static str) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    for value in values {
        serde_json::to_writer(&mut buffer, value)
            .map_err(|source| StoreError::Serialization { what, source })?;
        buffer.push(b'\n');
    }
    Ok(buffer)
}

fn append_lines<T: Serialize>(path: &Path, values: &[T], what: &'static str) -> Result<()> {
    let buffer = encode_lines(values, what)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StoreError::Io {
            operation: "open",
            path: path.to_path_buf(),
            source: e,
        })?;
    file.write_all(&buffer).map_err(|e| StoreError::Io {
        operation: "write",
        path: path.to_path_buf(),
        source: e,
    })?;
    file.sync_all().map_err(|e| StoreError::Io {
        operation: "sync",
        path: path.to_path_buf(),
        source: e,
    })
}

fn rewrite_lines<T: Serialize>(path: &Path, values: &[T], what: &'static str) -> Result<()> {
    let buffer = encode_lines(values, what)?;
    let temp_path = path.with_extension("jsonl.tmp");

    let mut file = File::create(&temp_path).map_err(|e| StoreError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;
    file.write_all(&buffer).map_err(|e| StoreError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;
    file.sync_all().map_err(|e| StoreError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| StoreError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), entries = values.len(), "rewrote store file");
    Ok(())
}

impl IncidentStore for JsonlStore {
    fn insert_batch(&self, rows: &[IncidentRow]) -> Result<Vec<StoredIncident>> {
        check_constraints(rows)?;
        let _guard = self.guard()?;
        let path = self.incidents_path();
        let existing: Vec<StoredIncident> = read_lines(&path)?;
        let mut next_id = existing.iter().map(|row| row.id).max().unwrap_or(0);

        let created_at = Utc::now();
        let stored: Vec<StoredIncident> = rows
            .iter()
            .map(|row| {
                next_id += 1;
                StoredIncident {
                    id: next_id,
                    created_at,
                    row: row.clone(),
                }
            })
            .collect();
        append_lines(&path, &stored, "incidents")?;
        Ok(stored)
    }

    fn incidents(&self) -> Result<Vec<StoredIncident>> {
        let _guard = self.guard()?;
        read_lines(&self.incidents_path())
    }
}

impl HistoryStore for JsonlStore {
    fn record(&self, record: UploadRecord) -> Result<UploadHistoryEntry> {
        let _guard = self.guard()?;
        let path = self.uploads_path();
        let existing: Vec<UploadHistoryEntry> = read_lines(&path)?;
        let next_id = existing.iter().map(|entry| entry.id).max().unwrap_or(0) + 1;
        let entry = record.into_entry(next_id, Utc::now());
        append_lines(&path, std::slice::from_ref(&entry), "upload history")?;
        Ok(entry)
    }

    fn list(&self, limit: Option<usize>) -> Result<Vec<UploadHistoryEntry>> {
        let _guard = self.guard()?;
        let mut entries: Vec<UploadHistoryEntry> = read_lines(&self.uploads_path())?;
        sort_newest_first(&mut entries);
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    fn delete(&self, id: u64) -> Result<()> {
        let _guard = self.guard()?;
        let path = self.uploads_path();
        let mut entries: Vec<UploadHistoryEntry> = read_lines(&path)?;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Err(StoreError::NotFound(id));
        }
        rewrite_lines(&path, &entries, "upload history")
    }

    fn update_results(&self, id: u64, update: UploadUpdate) -> Result<UploadHistoryEntry> {
        let _guard = self.guard()?;
        let path = self.uploads_path();
        let mut entries: Vec<UploadHistoryEntry> = read_lines(&path)?;
        let entry = entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(StoreError::NotFound(id))?;
        entry.apply_update(update, Utc::now());
        let updated = entry.clone();
        rewrite_lines(&path, &entries, "upload history")?;
        Ok(updated)
    }

    fn cleanup(&self, keep: usize) -> Result<usize> {
        let _guard = self.guard()?;
        let path = self.uploads_path();
        let mut entries: Vec<UploadHistoryEntry> = read_lines(&path)?;
        if entries.len() <= keep {
            return Ok(0);
        }
        sort_newest_first(&mut entries);
        let removed = entries.len() - keep;
        entries.truncate(keep);
        // Keep the file in insertion order.
        entries.sort_by_key(|entry| entry.id);
        rewrite_lines(&path, &entries, "upload history")?;
        Ok(removed)
    }
}
