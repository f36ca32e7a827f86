use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{info, trace};

use incident_cli::import::{
    ImportRequest, ImportRun, import_file, load_schema, read_upload, resolve_rules,
};
use incident_cli::logging::redact_value;
use incident_core::{Pipeline, PipelineOptions, RunOutcome};
use incident_store::{HistoryStore, JsonlStore, MemoryStore};

use crate::cli::{AnalyzeArgs, HistoryCommand, ImportArgs, StoreArgs};
use crate::summary::{print_analysis, print_fields, print_history, print_import, print_stats};

pub fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    let schema = load_schema(args.schema.aliases.as_deref())?;
    let pipeline = Pipeline::with_store(Arc::new(schema), Arc::new(MemoryStore::new()))
        .with_options(PipelineOptions::new().with_history(false));

    let upload = read_upload(&args.file)?;
    let analysis = pipeline
        .analyze(&upload.bytes)
        .with_context(|| format!("analyze {}", args.file.display()))?;
    for column in &analysis.columns {
        for sample in &column.samples {
            trace!(column = %column.name, sample = redact_value(sample), "sampled value");
        }
    }
    let rules = resolve_rules(&pipeline, &analysis, None, &[])?;

    if args.json {
        let out = json!({ "analysis": analysis, "rules": rules.as_slice() });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_analysis(&analysis, &rules);
    }
    Ok(())
}

/// Runs an import. Returns the run so the caller can pick the exit code.
pub fn run_import(args: &ImportArgs) -> Result<ImportRun> {
    let request = ImportRequest {
        file: args.file.clone(),
        store_dir: args.store.store_dir.clone(),
        rules_file: args.rules.clone(),
        overrides: args.overrides.clone(),
        aliases: args.schema.aliases.clone(),
        uploaded_by: args.uploaded_by.clone(),
        record_history: !args.no_history,
    };
    let run = import_file(&request)?;
    if args.json {
        let out = json!({
            "outcome": run.outcome,
            "result": run.result,
            "rules": run.rules.as_slice(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_import(&run);
    }
    Ok(run)
}

pub fn import_failed(run: &ImportRun) -> bool {
    run.outcome == RunOutcome::Failed
}

fn open_store(args: &StoreArgs) -> Result<JsonlStore> {
    JsonlStore::open(&args.store_dir)
        .with_context(|| format!("open store {}", args.store_dir.display()))
}

pub fn run_history(command: &HistoryCommand) -> Result<()> {
    match command {
        HistoryCommand::List { store, limit, json } => {
            let entries = open_store(store)?
                .list(Some(*limit))
                .context("list upload history")?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print_history(&entries);
            }
        }
        HistoryCommand::Stats { store, json } => {
            let stats = open_store(store)?.stats().context("compute upload stats")?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_stats(&stats);
            }
        }
        HistoryCommand::Delete { store, id } => {
            open_store(store)?
                .delete(*id)
                .with_context(|| format!("delete upload {id}"))?;
            info!(id, "upload deleted");
            println!("Deleted upload {id}.");
        }
        HistoryCommand::Cleanup { store, keep } => {
            let removed = open_store(store)?
                .cleanup(*keep)
                .context("clean up upload history")?;
            info!(removed, keep, "history cleaned up");
            println!("Removed {removed} upload(s), kept the newest {keep}.");
        }
    }
    Ok(())
}

pub fn run_fields() -> Result<()> {
    print_fields(&load_schema(None)?);
    Ok(())
}
