//! Upload audit trail.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::iso_millis;
use crate::rule::MappingRule;

/// Lifecycle status of an upload record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Pending,
    Success,
    Partial,
    Error,
}

impl ProcessingStatus {
    /// Zero error rows is a success; otherwise any stored row makes it partial.
    pub fn derive(processed_rows: usize, error_rows: usize) -> Self {
        if error_rows == 0 {
            Self::Success
        } else if processed_rows > 0 {
            Self::Partial
        } else {
            Self::Error
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors and warnings captured for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ErrorDetails {
    /// `None` when there is nothing to report.
    pub fn from_parts(errors: Vec<String>, warnings: Vec<String>) -> Option<Self> {
        if errors.is_empty() && warnings.is_empty() {
            None
        } else {
            Some(Self { errors, warnings })
        }
    }
}

/// Summary of a run, before the store assigns identity and status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub filename: String,
    pub file_size: u64,
    pub total_rows: usize,
    pub processed_rows: usize,
    pub error_rows: usize,
    pub quality_score: Option<f64>,
    pub error_details: Option<ErrorDetails>,
    pub mapping_rules: Vec<MappingRule>,
    pub processing_time_ms: u64,
    pub uploaded_by: Option<String>,
}

impl UploadRecord {
    pub fn status(&self) -> ProcessingStatus {
        ProcessingStatus::derive(self.processed_rows, self.error_rows)
    }

    /// Stamps the record into a persisted entry.
    pub fn into_entry(self, id: u64, upload_date: DateTime<Utc>) -> UploadHistoryEntry {
        let processing_status = self.status();
        UploadHistoryEntry {
            id,
            filename: self.filename,
            file_size: self.file_size,
            total_rows: self.total_rows,
            processed_rows: self.processed_rows,
            error_rows: self.error_rows,
            quality_score: self.quality_score,
            error_details: self.error_details,
            mapping_rules: self.mapping_rules,
            processing_time_ms: self.processing_time_ms,
            uploaded_by: self.uploaded_by,
            upload_date,
            processing_status,
        }
    }
}

/// A persisted upload history row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadHistoryEntry {
    pub id: u64,
    pub filename: String,
    pub file_size: u64,
    pub total_rows: usize,
    pub processed_rows: usize,
    pub error_rows: usize,
    pub quality_score: Option<f64>,
    pub error_details: Option<ErrorDetails>,
    pub mapping_rules: Vec<MappingRule>,
    pub processing_time_ms: u64,
    pub uploaded_by: Option<String>,
    #[serde(with = "iso_millis")]
    pub upload_date: DateTime<Utc>,
    pub processing_status: ProcessingStatus,
}

/// New results for an upload that was re-processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadUpdate {
    pub processed_rows: usize,
    pub error_rows: usize,
    pub quality_score: Option<f64>,
    pub error_details: Option<ErrorDetails>,
}

impl UploadHistoryEntry {
    /// Applies retry results, re-deriving the status and bumping the date.
    pub fn apply_update(&mut self, update: UploadUpdate, now: DateTime<Utc>) {
        self.processed_rows = update.processed_rows;
        self.error_rows = update.error_rows;
        self.quality_score = update.quality_score;
        self.error_details = update.error_details;
        self.processing_status = ProcessingStatus::derive(self.processed_rows, self.error_rows);
        self.upload_date = now;
    }
}

/// Aggregate statistics over the upload history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadStats {
    pub total_uploads: usize,
    pub total_rows_processed: usize,
    /// Percentage of uploads with status `success`.
    pub success_rate: f64,
    pub average_quality_score: f64,
    pub recent_uploads: Vec<UploadHistoryEntry>,
    pub last_upload_date: Option<DateTime<Utc>>,
}
