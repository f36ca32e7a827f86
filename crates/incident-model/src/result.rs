//! Outcome of a processing run.

use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::record::StoredIncident;
use crate::schema::TargetField;

/// An error surfaced to the caller of a processing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessingIssue {
    /// Required targets not covered by the rule set; nothing was processed.
    StructuralAbort { missing: Vec<TargetField> },
    /// A validator rejected a transformed value; only that row was skipped.
    RowValidation {
        line: u64,
        field: TargetField,
        value: String,
    },
    /// The bulk insert failed; nothing was stored.
    Persistence { message: String },
    /// Any other failure inside the run.
    Unexpected { message: String },
}

impl ProcessingIssue {
    pub fn is_row_scoped(&self) -> bool {
        matches!(self, Self::RowValidation { .. })
    }
}

impl fmt::Display for ProcessingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StructuralAbort { missing } => {
                let names: Vec<&str> = missing.iter().map(|field| field.as_str()).collect();
                write!(f, "Required fields are not mapped: {}", names.join(", "))
            }
            Self::RowValidation { line, field, value } => {
                write!(f, "Line {line}: invalid value for {field}: {value}")
            }
            Self::Persistence { message } => write!(f, "Database insert failed: {message}"),
            Self::Unexpected { message } => write!(f, "Unexpected processing failure: {message}"),
        }
    }
}

/// Result of one processing run. Never mutated after it is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// True iff at least one record was stored.
    pub success: bool,
    /// Rows that passed transformation and validation.
    pub processed_rows: usize,
    pub errors: Vec<ProcessingIssue>,
    pub warnings: Vec<String>,
    /// Rows that actually landed in the store.
    pub inserted_data: Vec<StoredIncident>,
    pub skipped_rows: usize,
}

impl ProcessingResult {
    /// A run that stored nothing and reports a single error.
    pub fn failed(issue: ProcessingIssue, skipped_rows: usize) -> Self {
        Self {
            success: false,
            processed_rows: 0,
            errors: vec![issue],
            warnings: Vec::new(),
            inserted_data: Vec::new(),
            skipped_rows,
        }
    }

    pub fn inserted_rows(&self) -> usize {
        self.inserted_data.len()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Plain-text processing report.
    pub fn report(&self, processed_at: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "CSV PROCESSING REPORT");
        let _ = writeln!(out, "=====================");
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Completed successfully: {}",
            if self.success { "YES" } else { "NO" }
        );
        let _ = writeln!(out, "Processed rows: {}", self.processed_rows);
        let _ = writeln!(out, "Skipped rows: {}", self.skipped_rows);
        let _ = writeln!(out, "Errors: {}", self.errors.len());
        let _ = writeln!(out, "Warnings: {}", self.warnings.len());
        let _ = writeln!(out);
        let _ = writeln!(out, "ERRORS:");
        for error in &self.errors {
            let _ = writeln!(out, "- {error}");
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "WARNINGS:");
        for warning in &self.warnings {
            let _ = writeln!(out, "- {warning}");
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "INSERTED DATA:");
        let _ = writeln!(
            out,
            "{} incident(s) added to the database.",
            self.inserted_rows()
        );
        let _ = writeln!(out);
        let _ = write!(out, "Processed at: {processed_at}");
        out
    }
}
