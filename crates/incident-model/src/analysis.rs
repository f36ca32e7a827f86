//! Analysis snapshot produced before any mapping decision.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::TargetField;

/// Coarse type inferred from a column sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferredType {
    #[default]
    String,
    Number,
    Date,
    Coordinates,
}

impl InferredType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Date => "date",
            Self::Coordinates => "coordinates",
        }
    }
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile of one source column, derived from a bounded sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub inferred_type: InferredType,
    /// Up to ten trimmed, non-blank values from the first data rows.
    pub samples: Vec<String>,
    /// Confidence in `inferred_type`, in [0, 1].
    pub confidence: f64,
    pub suggested_mapping: Option<TargetField>,
}

impl ColumnProfile {
    /// The first few samples, for display.
    pub fn examples(&self) -> &[String] {
        &self.samples[..self.samples.len().min(3)]
    }
}

/// Problem detected while analysing a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisIssue {
    /// Required target fields with no suggested source column.
    MissingRequiredFields { fields: Vec<TargetField> },
    /// Fewer data rows than the minimum considered representative.
    FewRows { rows: usize, minimum: usize },
    /// Columns without a single non-empty sampled value.
    EmptyColumns { count: usize },
}

impl fmt::Display for AnalysisIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequiredFields { fields } => {
                let names: Vec<&str> = fields.iter().map(|field| field.as_str()).collect();
                write!(f, "Missing required fields: {}", names.join(", "))
            }
            Self::FewRows { rows, minimum } => {
                write!(f, "Very little data ({rows} rows, fewer than {minimum})")
            }
            Self::EmptyColumns { count } => write!(f, "{count} empty column(s) detected"),
        }
    }
}

/// Immutable result of analysing one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvAnalysis {
    pub total_rows: usize,
    pub columns: Vec<ColumnProfile>,
    /// First data rows, cells aligned with `columns`.
    pub preview: Vec<Vec<String>>,
    pub encoding: String,
    pub delimiter: char,
    pub has_headers: bool,
    /// Heuristic schema-alignment score in [0, 100].
    pub quality_score: f64,
    pub issues: Vec<AnalysisIssue>,
}

impl CsvAnalysis {
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Distinct suggested target fields, in schema order.
    pub fn suggested_fields(&self) -> Vec<TargetField> {
        TargetField::ALL
            .into_iter()
            .filter(|field| {
                self.columns
                    .iter()
                    .any(|column| column.suggested_mapping == Some(*field))
            })
            .collect()
    }
}
