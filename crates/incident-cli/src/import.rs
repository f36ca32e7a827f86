//! File-level import flow shared by the `analyze` and `import` commands.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info_span};

use incident_core::{Pipeline, PipelineOptions, RunOutcome, Upload};
use incident_map::MappingRules;
use incident_model::{CsvAnalysis, ProcessingResult, SchemaConfig, TargetField};
use incident_store::JsonlStore;

/// Loads the default schema, extended with an optional alias file.
pub fn load_schema(aliases: Option<&Path>) -> Result<SchemaConfig> {
    let schema = SchemaConfig::incidents();
    let Some(path) = aliases else {
        return Ok(schema);
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("read alias file {}", path.display()))?;
    let extra: BTreeMap<TargetField, Vec<String>> = serde_json::from_str(&text)
        .with_context(|| format!("parse alias file {}", path.display()))?;
    debug!(fields = extra.len(), "loaded extra aliases");
    Ok(schema.with_extra_aliases(
        extra
            .into_iter()
            .flat_map(|(field, aliases)| aliases.into_iter().map(move |alias| (field, alias))),
    ))
}

/// Reads a file into an [`Upload`] named after its file name.
pub fn read_upload(path: &Path) -> Result<Upload> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let filename = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
    Ok(Upload::new(filename, bytes))
}

/// Generated rules, replaced by a rules file if given, then overridden per column.
pub fn resolve_rules(
    pipeline: &Pipeline,
    analysis: &CsvAnalysis,
    rules_file: Option<&Path>,
    overrides: &[String],
) -> Result<MappingRules> {
    let mut rules = match rules_file {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("read rules file {}", path.display()))?;
            MappingRules::from_json(&json, analysis)
                .with_context(|| format!("load rules file {}", path.display()))?
        }
        None => pipeline.rules(analysis),
    };
    for raw in overrides {
        let rule = rules
            .apply_override(pipeline.schema(), raw)
            .with_context(|| format!("apply mapping override '{raw}'"))?;
        debug!(column = %rule.csv_column, target = ?rule.target_field, "mapping overridden");
    }
    Ok(rules)
}

/// Inputs of one `import` run.
#[derive(Debug, Clone, Default)]
pub struct ImportRequest {
    pub file: PathBuf,
    pub store_dir: PathBuf,
    pub rules_file: Option<PathBuf>,
    pub overrides: Vec<String>,
    pub aliases: Option<PathBuf>,
    pub uploaded_by: Option<String>,
    pub record_history: bool,
}

#[derive(Debug, Clone)]
pub struct ImportRun {
    pub analysis: CsvAnalysis,
    pub rules: MappingRules,
    pub result: ProcessingResult,
    pub outcome: RunOutcome,
}

/// Opens a pipeline over the JSON-lines store in `store_dir`.
pub fn open_pipeline(
    store_dir: &Path,
    schema: SchemaConfig,
    options: PipelineOptions,
) -> Result<Pipeline> {
    let store = JsonlStore::open(store_dir)
        .with_context(|| format!("open store {}", store_dir.display()))?;
    Ok(Pipeline::with_store(Arc::new(schema), Arc::new(store)).with_options(options))
}

pub fn import_file(request: &ImportRequest) -> Result<ImportRun> {
    let span = info_span!("import", file = %request.file.display());
    let _guard = span.enter();

    let schema = load_schema(request.aliases.as_deref())?;
    let mut options = PipelineOptions::new().with_history(request.record_history);
    if let Some(name) = &request.uploaded_by {
        options = options.with_uploaded_by(name.clone());
    }
    let pipeline = open_pipeline(&request.store_dir, schema, options)?;

    let upload = read_upload(&request.file)?;
    let analysis = pipeline
        .analyze(&upload.bytes)
        .with_context(|| format!("analyze {}", request.file.display()))?;
    let rules = resolve_rules(
        &pipeline,
        &analysis,
        request.rules_file.as_deref(),
        &request.overrides,
    )?;

    let result = pipeline.process(&upload, rules.as_slice(), &analysis);
    let outcome = RunOutcome::classify(&result);
    Ok(ImportRun {
        analysis,
        rules,
        result,
        outcome,
    })
}
