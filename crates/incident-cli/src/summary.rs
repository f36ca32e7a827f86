use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use incident_core::RunOutcome;
use incident_map::MappingRules;
use incident_model::{
    CsvAnalysis, ProcessingStatus, SchemaConfig, UploadHistoryEntry, UploadStats,
    format_timestamp,
};

use incident_cli::import::ImportRun;

pub fn print_analysis(analysis: &CsvAnalysis, rules: &MappingRules) {
    println!(
        "Rows: {}  Encoding: {}  Delimiter: {:?}  Headers: {}",
        analysis.total_rows,
        analysis.encoding,
        analysis.delimiter,
        if analysis.has_headers { "yes" } else { "no" }
    );
    println!("Quality score: {:.1}/100", analysis.quality_score);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Confidence"),
        header_cell("Suggested"),
        header_cell("Examples"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for column in &analysis.columns {
        let examples = column.examples().join(", ");
        table.add_row(vec![
            Cell::new(&column.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(column.inferred_type),
            Cell::new(format!("{:.2}", column.confidence)),
            match column.suggested_mapping {
                Some(field) => Cell::new(field).fg(Color::Green),
                None => dim_cell("-"),
            },
            if examples.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(examples)
            },
        ]);
    }
    println!("{table}");

    if !analysis.issues.is_empty() {
        println!();
        println!("Issues:");
        for issue in &analysis.issues {
            println!("- {issue}");
        }
    }
    println!();
    print_rules(rules);
}

pub fn print_rules(rules: &MappingRules) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Target"),
        header_cell("Transformation"),
        header_cell("Required"),
        header_cell("Validator"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Center);
    for rule in rules.iter() {
        table.add_row(vec![
            Cell::new(&rule.csv_column),
            optional_cell(rule.target_field),
            optional_cell(rule.transformation),
            if rule.required {
                Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
            } else {
                dim_cell("-")
            },
            optional_cell(rule.validator),
        ]);
    }
    println!("Mapping rules:");
    println!("{table}");
}

pub fn print_import(run: &ImportRun) {
    let result = &run.result;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Outcome"),
        header_cell("Total"),
        header_cell("Processed"),
        header_cell("Inserted"),
        header_cell("Skipped"),
        header_cell("Errors"),
        header_cell("Warnings"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..7 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        outcome_cell(run.outcome),
        Cell::new(run.analysis.total_rows),
        Cell::new(result.processed_rows),
        Cell::new(result.inserted_rows()).add_attribute(Attribute::Bold),
        count_cell(result.skipped_rows, Color::Yellow),
        count_cell(result.errors.len(), Color::Red),
        count_cell(result.warnings.len(), Color::Yellow),
    ]);
    println!("{table}");
    println!();
    println!("{}", result.report(&format_timestamp(&chrono::Utc::now())));
}

pub fn print_history(entries: &[UploadHistoryEntry]) {
    if entries.is_empty() {
        println!("No uploads recorded.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("File"),
        header_cell("Uploaded"),
        header_cell("Status"),
        header_cell("Rows"),
        header_cell("Imported"),
        header_cell("Errors"),
        header_cell("Quality"),
        header_cell("Time (ms)"),
        header_cell("By"),
    ]);
    apply_table_style(&mut table);
    for index in [0, 4, 5, 6, 7, 8] {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for entry in entries {
        table.add_row(vec![
            Cell::new(entry.id),
            Cell::new(&entry.filename),
            Cell::new(entry.upload_date.format("%Y-%m-%d %H:%M:%S")),
            status_cell(entry.processing_status),
            Cell::new(entry.total_rows),
            Cell::new(entry.processed_rows),
            count_cell(entry.error_rows, Color::Red),
            entry
                .quality_score
                .map_or_else(|| dim_cell("-"), |score| Cell::new(format!("{score:.1}"))),
            Cell::new(entry.processing_time_ms),
            Cell::new(entry.uploaded_by.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
}

pub fn print_stats(stats: &UploadStats) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Uploads"), Cell::new(stats.total_uploads)]);
    table.add_row(vec![
        Cell::new("Rows imported"),
        Cell::new(stats.total_rows_processed),
    ]);
    table.add_row(vec![
        Cell::new("Success rate"),
        Cell::new(format!("{:.1}%", stats.success_rate)),
    ]);
    table.add_row(vec![
        Cell::new("Average quality"),
        Cell::new(format!("{:.1}", stats.average_quality_score)),
    ]);
    table.add_row(vec![
        Cell::new("Last upload"),
        stats.last_upload_date.map_or_else(
            || dim_cell("-"),
            |date| Cell::new(date.format("%Y-%m-%d %H:%M:%S")),
        ),
    ]);
    println!("{table}");
    if !stats.recent_uploads.is_empty() {
        println!();
        println!("Recent uploads:");
        print_history(&stats.recent_uploads);
    }
}

pub fn print_fields(schema: &SchemaConfig) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Type"),
        header_cell("Required"),
        header_cell("Aliases"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    for spec in schema.fields() {
        table.add_row(vec![
            Cell::new(spec.field)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(spec.field.storage_type()),
            if schema.is_required(spec.field) {
                Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
            } else {
                dim_cell("-")
            },
            Cell::new(spec.aliases.join(", ")),
        ]);
    }
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn outcome_cell(outcome: RunOutcome) -> Cell {
    let color = match outcome {
        RunOutcome::Success => Color::Green,
        RunOutcome::Partial => Color::Yellow,
        RunOutcome::Failed => Color::Red,
    };
    Cell::new(outcome.as_str().to_uppercase())
        .fg(color)
        .add_attribute(Attribute::Bold)
}

fn status_cell(status: ProcessingStatus) -> Cell {
    match status {
        ProcessingStatus::Success => Cell::new(status).fg(Color::Green),
        ProcessingStatus::Partial => Cell::new(status).fg(Color::Yellow),
        ProcessingStatus::Error => Cell::new(status).fg(Color::Red),
        ProcessingStatus::Pending => dim_cell(status),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn optional_cell<T: ToString>(value: Option<T>) -> Cell {
    value.map_or_else(|| dim_cell("-"), Cell::new)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
