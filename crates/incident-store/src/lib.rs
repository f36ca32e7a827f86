//! Storage for imported incidents and the upload audit trail.
//!
//! Two seams are defined as traits: [`IncidentStore`] takes normalized batches,
//! [`HistoryStore`] keeps one entry per run. [`MemoryStore`] backs tests and
//! one-shot runs; [`JsonlStore`] keeps both tables as JSON-lines files.

#![deny(unsafe_code)]

pub mod error;
pub mod history;
pub mod jsonl;
pub mod memory;
pub mod persist;
pub mod store;

pub use error::{Result, StoreError};
pub use history::{RECENT_UPLOADS, record_run, upload_stats};
pub use jsonl::JsonlStore;
pub use memory::MemoryStore;
pub use persist::{PersistOutcome, normalize_record, persist};
pub use store::{DEFAULT_HISTORY_LIMIT, DEFAULT_KEEP_RECORDS, HistoryStore, IncidentStore};
