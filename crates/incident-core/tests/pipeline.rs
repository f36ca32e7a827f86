//! End-to-end runs through the pipeline with in-memory stores.

use std::sync::Arc;

use incident_core::{Pipeline, PipelineOptions, RunOutcome, Upload};
use incident_model::{
    IncidentRow, MappingRule, ProcessingIssue, ProcessingStatus, SchemaConfig, StoredIncident,
    TargetField, format_timestamp,
};
use incident_store::{HistoryStore, IncidentStore, MemoryStore};
use proptest::prelude::*;
use proptest::test_runner::Config;

const SMALL_FILE: &str = "type,lieu,date\nVol,Dakar,2024-01-05\n,,";

fn pipeline_with(incidents: MemoryStore, history: Arc<MemoryStore>) -> Pipeline {
    Pipeline::new(Arc::new(SchemaConfig::incidents()), Arc::new(incidents), history)
}

fn run(pipeline: &Pipeline, name: &str, text: &str) -> incident_model::ProcessingResult {
    let analysis = pipeline.analyze(text.as_bytes()).unwrap();
    let rules = pipeline.rules(&analysis);
    pipeline.process(&Upload::new(name, text), rules.as_slice(), &analysis)
}

#[test]
fn small_file_imports_one_row_and_skips_the_blank_one() {
    let history = Arc::new(MemoryStore::new());
    let pipeline = pipeline_with(MemoryStore::new(), history.clone());

    let result = run(&pipeline, "small.csv", SMALL_FILE);

    assert!(result.success);
    assert_eq!(result.processed_rows, 1);
    assert_eq!(result.skipped_rows, 1);
    assert!(result.errors.is_empty());
    let stored = &result.inserted_data[0].row;
    assert_eq!(stored.incident_type, "Vol");
    assert_eq!(stored.location, "Dakar");
    assert_eq!(
        format_timestamp(&stored.date_occurred),
        "2024-01-05T00:00:00.000Z"
    );
    assert_eq!(stored.source, "csv_import");
    assert_eq!(RunOutcome::classify(&result), RunOutcome::Partial);

    let entries = history.list(None).unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.filename, "small.csv");
    assert_eq!(entry.file_size, SMALL_FILE.len() as u64);
    assert_eq!(entry.total_rows, 2);
    assert_eq!(entry.processed_rows, 1);
    assert_eq!(entry.error_rows, 1);
    assert_eq!(entry.processing_status, ProcessingStatus::Partial);
    assert_eq!(entry.uploaded_by.as_deref(), Some("anonymous"));
    assert_eq!(entry.mapping_rules.len(), 3);
    assert!(entry.error_details.is_none());
}

#[test]
fn invalid_latitude_fails_only_its_row() {
    let pipeline = Pipeline::in_memory();
    let text = "type,lieu,date,lat\n\
                Vol,Dakar,2024-01-05,14.7\n\
                Vol,Thies,2024-01-06,not-a-number\n\
                Agression,Rufisque,06/01/2024,14.71\n";

    let result = run(&pipeline, "coords.csv", text);

    assert!(result.success);
    assert_eq!(result.processed_rows, 2);
    assert_eq!(result.skipped_rows, 1);
    assert_eq!(
        result.errors,
        vec![ProcessingIssue::RowValidation {
            line: 3,
            field: TargetField::Latitude,
            value: "not-a-number".to_string(),
        }]
    );
    assert_eq!(
        result.error_messages(),
        vec!["Line 3: invalid value for latitude: not-a-number"]
    );
    assert_eq!(result.inserted_data[1].row.latitude, Some(14.71));
    assert_eq!(pipeline.incidents().count().unwrap(), 2);
}

#[test]
fn rule_on_a_column_the_file_lacks_does_not_cover_its_target() {
    let pipeline = Pipeline::in_memory();
    let text = "type,lieu,date\nVol,,2024-01-05\n";
    let analysis = pipeline.analyze(text.as_bytes()).unwrap();
    let mut rules = pipeline.rules(&analysis).into_vec();
    rules.retain(|rule| rule.csv_column != "lieu");
    rules.push(MappingRule {
        csv_column: "ghost".to_string(),
        target_field: Some(TargetField::Location),
        transformation: None,
        required: true,
        validator: None,
    });

    let result = pipeline.process(&Upload::new("ghost.csv", text), &rules, &analysis);

    assert!(!result.success);
    assert_eq!(result.processed_rows, 0);
    assert!(result.inserted_data.is_empty());
    assert_eq!(
        result.errors,
        vec![ProcessingIssue::StructuralAbort {
            missing: vec![TargetField::Location]
        }]
    );
    assert_eq!(pipeline.incidents().count().unwrap(), 0);
}

/// Store that reports every row twice.
struct DuplicatingStore(MemoryStore);

impl IncidentStore for DuplicatingStore {
    fn insert_batch(&self, rows: &[IncidentRow]) -> incident_store::Result<Vec<StoredIncident>> {
        let mut stored = self.0.insert_batch(rows)?;
        stored.extend(self.0.insert_batch(rows)?);
        Ok(stored)
    }

    fn incidents(&self) -> incident_store::Result<Vec<StoredIncident>> {
        self.0.incidents()
    }
}

#[test]
fn store_returning_extra_rows_keeps_skip_count() {
    let pipeline = Pipeline::new(
        Arc::new(SchemaConfig::incidents()),
        Arc::new(DuplicatingStore(MemoryStore::new())),
        Arc::new(MemoryStore::new()),
    );

    let result = run(&pipeline, "small.csv", SMALL_FILE);

    assert_eq!(result.processed_rows, 1);
    assert_eq!(result.inserted_rows(), 2);
    assert_eq!(result.skipped_rows, 1);
}

#[test]
fn unmapped_required_field_aborts_before_any_row() {
    let history = Arc::new(MemoryStore::new());
    let pipeline = pipeline_with(MemoryStore::new(), history.clone());
    let analysis = pipeline.analyze(SMALL_FILE.as_bytes()).unwrap();
    let mut rules = pipeline.rules(&analysis);
    rules.clear("lieu").unwrap();

    let result = pipeline.process(
        &Upload::new("small.csv", SMALL_FILE),
        rules.as_slice(),
        &analysis,
    );

    assert!(!result.success);
    assert_eq!(result.processed_rows, 0);
    assert_eq!(result.skipped_rows, analysis.total_rows);
    assert_eq!(
        result.errors,
        vec![ProcessingIssue::StructuralAbort {
            missing: vec![TargetField::Location]
        }]
    );
    assert_eq!(RunOutcome::classify(&result), RunOutcome::Failed);
    assert_eq!(pipeline.incidents().count().unwrap(), 0);
    assert_eq!(
        history.list(None).unwrap()[0].processing_status,
        ProcessingStatus::Error
    );
}

#[test]
fn rejected_batch_demotes_processed_rows_to_skipped() {
    let history = Arc::new(MemoryStore::new());
    let pipeline = pipeline_with(
        MemoryStore::new().with_insert_failure("duplicate key value"),
        history.clone(),
    );

    let result = run(&pipeline, "small.csv", SMALL_FILE);

    assert!(!result.success);
    assert!(result.inserted_data.is_empty());
    assert_eq!(result.processed_rows, 1);
    assert_eq!(result.skipped_rows, 2);
    assert_eq!(
        result.error_messages(),
        vec!["Database insert failed: duplicate key value"]
    );

    let entry = &history.list(None).unwrap()[0];
    assert_eq!(entry.processed_rows, 0);
    assert_eq!(entry.error_rows, 2);
    assert_eq!(entry.processing_status, ProcessingStatus::Error);
    let details = entry.error_details.as_ref().unwrap();
    assert_eq!(details.errors.len(), 1);
}

#[test]
fn history_failure_is_only_a_warning() {
    let history = Arc::new(MemoryStore::new().with_history_failure("disk full"));
    let pipeline = pipeline_with(MemoryStore::new(), history);

    let result = run(&pipeline, "small.csv", SMALL_FILE);

    assert!(result.success);
    assert_eq!(result.processed_rows, 1);
    assert_eq!(
        result.warnings,
        vec!["Could not record upload history: disk full"]
    );
}

#[test]
fn undecodable_upload_is_reported_as_unexpected() {
    let history = Arc::new(MemoryStore::new());
    let pipeline = pipeline_with(MemoryStore::new(), history.clone())
        .with_options(PipelineOptions::new().with_uploaded_by("ops"));
    let analysis = pipeline.analyze(SMALL_FILE.as_bytes()).unwrap();
    let rules = pipeline.rules(&analysis);
    let utf16 = Upload::new("utf16.csv", vec![0xFF, 0xFE, b't', 0]);

    let result = pipeline.process(&utf16, rules.as_slice(), &analysis);

    assert!(!result.success);
    assert_eq!(result.skipped_rows, analysis.total_rows);
    assert!(matches!(
        result.errors.as_slice(),
        [ProcessingIssue::Unexpected { .. }]
    ));
    assert!(
        result.error_messages()[0].starts_with("Unexpected processing failure: ")
    );

    let entry = &history.list(None).unwrap()[0];
    assert_eq!(entry.processed_rows, 0);
    assert_eq!(entry.quality_score, Some(0.0));
    assert_eq!(entry.uploaded_by.as_deref(), Some("ops"));
    assert_eq!(entry.processing_status, ProcessingStatus::Error);
}

#[test]
fn history_can_be_disabled() {
    let history = Arc::new(MemoryStore::new());
    let pipeline = pipeline_with(MemoryStore::new(), history.clone())
        .with_options(PipelineOptions::new().with_history(false));

    run(&pipeline, "small.csv", SMALL_FILE);

    assert!(history.list(None).unwrap().is_empty());
}

#[test]
fn processing_report_text() {
    let pipeline = Pipeline::in_memory();
    let result = run(&pipeline, "small.csv", SMALL_FILE);

    insta::assert_snapshot!(result.report("2024-01-05T12:00:00.000Z"), @r"
    CSV PROCESSING REPORT
    =====================

    Completed successfully: YES
    Processed rows: 1
    Skipped rows: 1
    Errors: 0
    Warnings: 0

    ERRORS:

    WARNINGS:

    INSERTED DATA:
    1 incident(s) added to the database.

    Processed at: 2024-01-05T12:00:00.000Z
    ");
}

fn csv_rows() -> impl Strategy<Value = Vec<(&'static str, &'static str, &'static str)>> {
    prop::collection::vec(
        (
            prop::sample::select(vec!["Vol", "Agression", ""]),
            prop::sample::select(vec!["Dakar", "Thies", ""]),
            prop::sample::select(vec!["2024-01-05", "05/01/2024 10:30", "bad", ""]),
        ),
        1..25,
    )
}

proptest! {
    #![proptest_config(Config::with_cases(64))]
    #[test]
    fn row_counts_stay_ordered(rows in csv_rows()) {
        let mut text = String::from("type,lieu,date\n");
        for (kind, place, date) in &rows {
            text.push_str(&format!("{kind},{place},{date}\n"));
        }
        let pipeline = Pipeline::in_memory();
        let analysis = pipeline.analyze(text.as_bytes()).unwrap();
        prop_assert_eq!(analysis.total_rows, rows.len());

        let rules = pipeline.rules(&analysis);
        let result = pipeline.process(&Upload::new("p.csv", text.clone()), rules.as_slice(), &analysis);

        prop_assert!(result.inserted_rows() <= result.processed_rows);
        prop_assert!(result.processed_rows <= analysis.total_rows);
        prop_assert_eq!(result.processed_rows + result.skipped_rows, analysis.total_rows);
        prop_assert_eq!(result.success, result.inserted_rows() > 0);
    }
}
