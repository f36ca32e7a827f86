//! Row processor: applies mapping rules to every data row of a table.
//!
//! Each row ends in exactly one [`RowOutcome`]. A row missing a required value
//! is skipped silently; a row whose value fails its validator is skipped and
//! reported. Neither stops the batch.

use tracing::{debug, info, info_span};

use incident_map::transformation_for;
use incident_model::{
    CsvAnalysis, MappingRule, ProcessingIssue, REQUIRED_TARGETS, RawTable, SchemaConfig,
    TargetField, TargetRecord, Transformation, Validator,
};

use crate::transforms::apply_transformation;
use crate::validators::passes;

/// Ragged-row warnings reported per table.
pub const MAX_PARSE_WARNINGS: usize = 5;

/// Outcome of processing one data row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Imported(TargetRecord),
    /// A required value was empty.
    Skipped { line: u64 },
    /// A validator rejected `value` for `field`.
    Failed {
        line: u64,
        field: TargetField,
        value: String,
    },
}

impl RowOutcome {
    pub fn line(&self) -> u64 {
        match self {
            Self::Imported(record) => record.line,
            Self::Skipped { line } | Self::Failed { line, .. } => *line,
        }
    }
}

/// Aggregated outcomes of one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowBatch {
    pub records: Vec<TargetRecord>,
    pub skipped: usize,
    pub issues: Vec<ProcessingIssue>,
    pub warnings: Vec<String>,
}

impl RowBatch {
    /// A batch that never touched a row because required targets are unmapped.
    pub fn aborted(missing: Vec<TargetField>, total_rows: usize) -> Self {
        Self {
            records: Vec::new(),
            skipped: total_rows,
            issues: vec![ProcessingIssue::StructuralAbort { missing }],
            warnings: Vec::new(),
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| matches!(issue, ProcessingIssue::StructuralAbort { .. }))
    }

    pub fn processed(&self) -> usize {
        self.records.len()
    }

    fn push(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Imported(record) => self.records.push(record),
            RowOutcome::Skipped { .. } => self.skipped += 1,
            RowOutcome::Failed { line, field, value } => {
                self.skipped += 1;
                self.issues
                    .push(ProcessingIssue::RowValidation { line, field, value });
            }
        }
    }
}

/// Required targets that no rule maps from a column of `analysis`, in schema order.
///
/// A rule naming a column the file does not have covers nothing.
pub fn missing_required_targets(
    rules: &[MappingRule],
    analysis: &CsvAnalysis,
) -> Vec<TargetField> {
    REQUIRED_TARGETS
        .into_iter()
        .filter(|target| {
            !rules.iter().any(|rule| {
                rule.target_field == Some(*target) && analysis.has_column(&rule.csv_column)
            })
        })
        .collect()
}

fn unplanned_required_targets(plan: &[ColumnPlan]) -> Vec<TargetField> {
    REQUIRED_TARGETS
        .into_iter()
        .filter(|target| !plan.iter().any(|column| column.field == *target))
        .collect()
}

/// A rule resolved against the table, with its effective defaults.
#[derive(Debug, Clone, Copy)]
struct ColumnPlan {
    index: usize,
    field: TargetField,
    required: bool,
    transformation: Option<Transformation>,
    validator: Option<Validator>,
}

fn plan_rules(
    table: &RawTable,
    rules: &[MappingRule],
    schema: &SchemaConfig,
    warnings: &mut Vec<String>,
) -> Vec<ColumnPlan> {
    let mut plan = Vec::with_capacity(rules.len());
    for rule in rules {
        let Some(field) = rule.target_field else {
            continue;
        };
        let Some(index) = table.column_index(&rule.csv_column) else {
            warnings.push(format!(
                "Column '{}' not found in file; mapping to {field} ignored",
                rule.csv_column
            ));
            continue;
        };
        plan.push(ColumnPlan {
            index,
            field,
            required: rule.required || schema.is_required(field),
            transformation: rule
                .transformation
                .or_else(|| transformation_for(schema, field)),
            validator: rule.validator.or_else(|| schema.default_validator(field)),
        });
    }
    plan
}

fn process_row(table: &RawTable, row: usize, plan: &[ColumnPlan]) -> RowOutcome {
    let line = table.line_of(row);
    let mut record = TargetRecord::new(line);
    let mut complete = true;

    for column in plan {
        let raw = table.cell(row, column.index).unwrap_or("").trim();
        if raw.is_empty() {
            if column.required {
                complete = false;
            }
            continue;
        }
        let value = apply_transformation(column.transformation, raw);
        if let Some(validator) = column.validator
            && !passes(validator, &value)
        {
            debug!(line, field = %column.field, %validator, "row failed validation");
            return RowOutcome::Failed {
                line,
                field: column.field,
                value: value.to_string(),
            };
        }
        record.set(column.field, value);
    }

    if complete {
        RowOutcome::Imported(record)
    } else {
        RowOutcome::Skipped { line }
    }
}

fn ragged_warnings(table: &RawTable) -> impl Iterator<Item = String> + '_ {
    table.ragged.iter().take(MAX_PARSE_WARNINGS).map(move |row| {
        format!(
            "Parsing: line {} has {} field(s), expected {}",
            row.line,
            row.fields,
            table.column_count()
        )
    })
}

/// Applies `rules` to every data row of `table`.
///
/// Aborts without touching a row when a required target is not mapped from a
/// column of the table.
pub fn process_rows(
    table: &RawTable,
    rules: &[MappingRule],
    analysis: &CsvAnalysis,
    schema: &SchemaConfig,
) -> RowBatch {
    let span = info_span!("process_rows", rows = table.row_count());
    let _guard = span.enter();

    let mut warnings: Vec<String> = ragged_warnings(table).collect();
    let plan = plan_rules(table, rules, schema, &mut warnings);
    let mut missing = missing_required_targets(rules, analysis);
    if missing.is_empty() {
        missing = unplanned_required_targets(&plan);
    }
    if !missing.is_empty() {
        info!(missing = ?missing, "required targets are not mapped");
        return RowBatch::aborted(missing, table.row_count());
    }

    let mut batch = RowBatch {
        warnings,
        ..RowBatch::default()
    };

    for row in 0..table.row_count() {
        batch.push(process_row(table, row, &plan));
    }

    info!(
        processed = batch.records.len(),
        skipped = batch.skipped,
        failed = batch.issues.len(),
        "rows processed"
    );
    batch
}
