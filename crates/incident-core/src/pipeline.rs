//! End-to-end import of one uploaded file.
//!
//! # Run order
//!
//! 1. **analyze** - decode, sniff, profile, score (no side effects)
//! 2. caller edits the generated [`MappingRules`]
//! 3. **process** - structural pre-check, parse, per-row transform and
//!    validation, bulk insert, history entry
//!
//! `process` never fails: every problem ends up in the returned
//! [`ProcessingResult`].

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, info_span};

use incident_ingest::{analyze, ingest_with};
use incident_map::MappingRules;
use incident_model::{
    CsvAnalysis, ErrorDetails, MappingRule, ProcessingIssue, ProcessingResult, SchemaConfig,
    UploadRecord,
};
use incident_store::{HistoryStore, IncidentStore, MemoryStore, persist, record_run};
use incident_transform::{missing_required_targets, process_rows};

use crate::options::PipelineOptions;
use crate::state::{RunOutcome, RunState};

/// An uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    pub fn file_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Schema, stores and options shared by every run.
#[derive(Clone)]
pub struct Pipeline {
    schema: Arc<SchemaConfig>,
    incidents: Arc<dyn IncidentStore>,
    history: Arc<dyn HistoryStore>,
    options: PipelineOptions,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("schema", &self.schema)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Counts and errors of a run before the history entry is written.
struct RunSummary {
    result: ProcessingResult,
    quality_score: f64,
    error_rows: usize,
}

impl Pipeline {
    pub fn new(
        schema: Arc<SchemaConfig>,
        incidents: Arc<dyn IncidentStore>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            schema,
            incidents,
            history,
            options: PipelineOptions::default(),
        }
    }

    /// Uses one store for both incidents and history.
    pub fn with_store<S>(schema: Arc<SchemaConfig>, store: Arc<S>) -> Self
    where
        S: IncidentStore + HistoryStore + 'static,
    {
        let incidents: Arc<dyn IncidentStore> = store.clone();
        let history: Arc<dyn HistoryStore> = store;
        Self::new(schema, incidents, history)
    }

    /// Default schema over a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::with_store(
            Arc::new(SchemaConfig::incidents()),
            Arc::new(MemoryStore::new()),
        )
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn schema(&self) -> &SchemaConfig {
        &self.schema
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn incidents(&self) -> &dyn IncidentStore {
        self.incidents.as_ref()
    }

    pub fn history(&self) -> &dyn HistoryStore {
        self.history.as_ref()
    }

    /// Profiles an uploaded file against the schema.
    pub fn analyze(&self, bytes: &[u8]) -> incident_ingest::Result<CsvAnalysis> {
        analyze(bytes, &self.schema, &self.options.analyze_options())
    }

    /// One editable rule per analysed column.
    pub fn rules(&self, analysis: &CsvAnalysis) -> MappingRules {
        MappingRules::generate(analysis, &self.schema)
    }

    /// Transforms, validates and stores the rows of `upload`, then records the run.
    pub fn process(
        &self,
        upload: &Upload,
        rules: &[MappingRule],
        analysis: &CsvAnalysis,
    ) -> ProcessingResult {
        let span = info_span!(
            "process",
            file = %upload.filename,
            rows = analysis.total_rows,
            rules = rules.len()
        );
        let _guard = span.enter();
        let start = Instant::now();
        let mut state = RunState::Mapping;
        advance(&mut state, RunState::Processing);

        let RunSummary {
            mut result,
            quality_score,
            error_rows,
        } = self.run(upload, rules, analysis);
        let outcome = RunOutcome::classify(&result);
        advance(&mut state, RunState::Finished(outcome));

        let elapsed_ms = start.elapsed().as_millis() as u64;
        if self.options.record_history {
            let record = UploadRecord {
                filename: upload.filename.clone(),
                file_size: upload.file_size(),
                total_rows: analysis.total_rows,
                processed_rows: result.inserted_rows(),
                error_rows,
                quality_score: Some(quality_score),
                error_details: ErrorDetails::from_parts(
                    result.error_messages(),
                    result.warnings.clone(),
                ),
                mapping_rules: rules.to_vec(),
                processing_time_ms: elapsed_ms,
                uploaded_by: Some(self.options.uploaded_by.clone()),
            };
            if let Some(warning) = record_run(self.history.as_ref(), record) {
                result.warnings.push(warning);
            }
            advance(&mut state, RunState::Recorded(outcome));
        }

        info!(
            outcome = %outcome,
            processed = result.processed_rows,
            inserted = result.inserted_rows(),
            skipped = result.skipped_rows,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            duration_ms = elapsed_ms,
            "processing complete"
        );
        result
    }

    fn run(&self, upload: &Upload, rules: &[MappingRule], analysis: &CsvAnalysis) -> RunSummary {
        let total_rows = analysis.total_rows;

        let missing = missing_required_targets(rules, analysis);
        if !missing.is_empty() {
            info!(missing = ?missing, "required targets are not mapped, run aborted");
            return RunSummary {
                result: ProcessingResult::failed(
                    ProcessingIssue::StructuralAbort { missing },
                    total_rows,
                ),
                quality_score: analysis.quality_score,
                error_rows: total_rows.max(1),
            };
        }

        let ingested = match ingest_with(&upload.bytes, analysis.delimiter, analysis.has_headers) {
            Ok(ingested) => ingested,
            Err(e) => {
                return RunSummary {
                    result: ProcessingResult::failed(
                        ProcessingIssue::Unexpected {
                            message: e.to_string(),
                        },
                        total_rows,
                    ),
                    quality_score: 0.0,
                    error_rows: total_rows.max(1),
                };
            }
        };

        let batch = process_rows(&ingested.table, rules, analysis, &self.schema);
        let processed_rows = batch.processed();
        let stored = persist(self.incidents.as_ref(), &batch.records);
        let inserted = stored.inserted_rows();
        let skipped_rows = batch.skipped + processed_rows.saturating_sub(inserted);
        debug!(processed_rows, inserted, skipped_rows, "batch persisted");

        let mut errors = batch.issues;
        errors.extend(stored.error);
        RunSummary {
            result: ProcessingResult {
                success: inserted > 0,
                processed_rows,
                errors,
                warnings: batch.warnings,
                inserted_data: stored.inserted,
                skipped_rows,
            },
            quality_score: analysis.quality_score,
            error_rows: skipped_rows,
        }
    }
}

fn advance(state: &mut RunState, next: RunState) {
    debug_assert!(state.can_transition_to(next), "{state} -> {next}");
    debug!(from = %state, to = %next, "run state");
    *state = next;
}
