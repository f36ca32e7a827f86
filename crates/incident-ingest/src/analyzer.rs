//! File analysis: decoding, sniffing, column profiling, scoring.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use incident_map::suggest_mapping;
use incident_model::{
    AnalysisIssue, ColumnProfile, CsvAnalysis, RawTable, SchemaConfig, TargetField,
};

use crate::decode::decode;
use crate::detect::infer_type;
use crate::error::Result;
use crate::reader::read_table;
use crate::sniff::{detect_delimiter, detect_headers, first_line};

/// Data rows below which a file is flagged as too small to be representative.
pub const MIN_REPRESENTATIVE_ROWS: usize = 10;

/// Sampling and preview limits for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeOptions {
    /// Leading data rows sampled per column.
    pub sample_rows: usize,
    /// Non-blank samples kept per column.
    pub max_samples: usize,
    /// Data rows copied into the preview.
    pub preview_rows: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            sample_rows: 10,
            max_samples: 10,
            preview_rows: 5,
        }
    }
}

/// A parsed file together with the encoding it was decoded from.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    pub table: RawTable,
    pub encoding: &'static str,
}

/// Decodes and parses a file, sniffing delimiter and header row.
pub fn ingest(bytes: &[u8]) -> Result<Ingested> {
    let decoded = decode(bytes)?;
    let delimiter = detect_delimiter(&decoded.text);
    let has_headers = detect_headers(first_line(&decoded.text), delimiter);
    debug!(?delimiter, has_headers, encoding = decoded.encoding, "sniffed layout");
    Ok(Ingested {
        table: read_table(&decoded.text, delimiter, has_headers)?,
        encoding: decoded.encoding,
    })
}

/// Decodes and parses a file with the layout taken from an earlier analysis.
pub fn ingest_with(bytes: &[u8], delimiter: char, has_headers: bool) -> Result<Ingested> {
    let decoded = decode(bytes)?;
    Ok(Ingested {
        table: read_table(&decoded.text, delimiter, has_headers)?,
        encoding: decoded.encoding,
    })
}

/// Analyzes raw bytes. Identical input yields an identical analysis.
pub fn analyze(
    bytes: &[u8],
    schema: &SchemaConfig,
    options: &AnalyzeOptions,
) -> Result<CsvAnalysis> {
    let span = info_span!("analyze", bytes = bytes.len());
    let _guard = span.enter();
    let start = Instant::now();

    let ingested = ingest(bytes)?;
    let analysis = analyze_table(&ingested.table, ingested.encoding, schema, options);

    info!(
        rows = analysis.total_rows,
        columns = analysis.columns.len(),
        quality_score = analysis.quality_score,
        issues = analysis.issues.len(),
        duration_ms = start.elapsed().as_millis(),
        "analysis complete"
    );
    Ok(analysis)
}

/// Profiles every column of an already parsed table.
pub fn analyze_table(
    table: &RawTable,
    encoding: &str,
    schema: &SchemaConfig,
    options: &AnalyzeOptions,
) -> CsvAnalysis {
    let columns: Vec<ColumnProfile> = table
        .headers
        .iter()
        .enumerate()
        .map(|(idx, name)| profile_column(table, idx, name, schema, options))
        .collect();

    let preview = table
        .rows
        .iter()
        .take(options.preview_rows)
        .cloned()
        .collect();

    let quality_score = quality_score(&columns, schema);
    let issues = detect_issues(&columns, table.row_count(), schema);

    CsvAnalysis {
        total_rows: table.row_count(),
        columns,
        preview,
        encoding: encoding.to_string(),
        delimiter: table.delimiter,
        has_headers: table.has_headers,
        quality_score,
        issues,
    }
}

fn profile_column(
    table: &RawTable,
    idx: usize,
    name: &str,
    schema: &SchemaConfig,
    options: &AnalyzeOptions,
) -> ColumnProfile {
    let samples: Vec<String> = table
        .column_values(idx)
        .take(options.sample_rows)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .take(options.max_samples)
        .map(str::to_string)
        .collect();
    let (inferred_type, confidence) = infer_type(&samples);
    let suggested_mapping = suggest_mapping(schema, name);
    debug!(
        column = name,
        %inferred_type,
        confidence,
        suggested = ?suggested_mapping,
        "profiled column"
    );
    ColumnProfile {
        name: name.to_string(),
        inferred_type,
        samples,
        confidence,
        suggested_mapping,
    }
}

/// Heuristic alignment of the columns with the target schema, in [0, 100].
///
/// Starts at 100, loses up to 30 for unmapped columns and up to 20 for
/// low-confidence columns, gains up to 20 for required fields found.
pub fn quality_score(columns: &[ColumnProfile], schema: &SchemaConfig) -> f64 {
    if columns.is_empty() {
        return 0.0;
    }
    let total = columns.len() as f64;
    let unmapped = columns
        .iter()
        .filter(|column| column.suggested_mapping.is_none())
        .count() as f64;
    let low_confidence = columns
        .iter()
        .filter(|column| column.confidence < 0.5)
        .count() as f64;

    let required = schema.required_fields();
    let found = required
        .iter()
        .filter(|field| suggests(columns, **field))
        .count() as f64;
    let required_share = if required.is_empty() {
        0.0
    } else {
        found / required.len() as f64
    };

    let score = 100.0 - 30.0 * (unmapped / total) - 20.0 * (low_confidence / total)
        + 20.0 * required_share;
    score.clamp(0.0, 100.0)
}

fn suggests(columns: &[ColumnProfile], field: TargetField) -> bool {
    columns
        .iter()
        .any(|column| column.suggested_mapping == Some(field))
}

fn detect_issues(
    columns: &[ColumnProfile],
    total_rows: usize,
    schema: &SchemaConfig,
) -> Vec<AnalysisIssue> {
    let mut issues = Vec::new();

    let missing: Vec<TargetField> = schema
        .required_fields()
        .into_iter()
        .filter(|field| !suggests(columns, *field))
        .collect();
    if !missing.is_empty() {
        issues.push(AnalysisIssue::MissingRequiredFields { fields: missing });
    }

    if total_rows < MIN_REPRESENTATIVE_ROWS {
        issues.push(AnalysisIssue::FewRows {
            rows: total_rows,
            minimum: MIN_REPRESENTATIVE_ROWS,
        });
    }

    let empty = columns
        .iter()
        .filter(|column| column.samples.is_empty())
        .count();
    if empty > 0 {
        issues.push(AnalysisIssue::EmptyColumns { count: empty });
    }

    issues
}
