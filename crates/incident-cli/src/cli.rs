//! CLI argument definitions for `incident-import`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use incident_store::{DEFAULT_HISTORY_LIMIT, DEFAULT_KEEP_RECORDS};

#[derive(Parser)]
#[command(
    name = "incident-import",
    version,
    about = "Analyze and import incident CSV files",
    long_about = "Analyze loosely structured incident CSV files, map their columns onto the \
                  incident schema, and import the valid rows.\n\n\
                  Every import is recorded in an upload history kept next to the data."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow cell values in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Profile a CSV file and show the generated mapping rules.
    Analyze(AnalyzeArgs),

    /// Analyze, map and import a CSV file into the store.
    Import(ImportArgs),

    /// Inspect or maintain the upload history.
    #[command(subcommand)]
    History(HistoryCommand),

    /// List the target schema fields and their aliases.
    Fields,
}

#[derive(Args)]
pub struct SchemaArgs {
    /// JSON file with extra column aliases per field, e.g. {"location": ["ville"]}.
    #[arg(long = "aliases", value_name = "FILE")]
    pub aliases: Option<PathBuf>,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// CSV file to analyze.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the analysis and rules as JSON.
    #[arg(long = "json")]
    pub json: bool,

    #[command(flatten)]
    pub schema: SchemaArgs,
}

#[derive(Args)]
pub struct ImportArgs {
    /// CSV file to import.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// JSON mapping rules to use instead of the generated ones.
    #[arg(long = "rules", value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Override one mapping, e.g. --map ville=location or --map notes=none.
    #[arg(long = "map", value_name = "COLUMN=FIELD")]
    pub overrides: Vec<String>,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Name recorded as the uploader.
    #[arg(long = "uploaded-by", value_name = "NAME")]
    pub uploaded_by: Option<String>,

    /// Do not write an upload history entry.
    #[arg(long = "no-history")]
    pub no_history: bool,

    /// Print the processing result as JSON.
    #[arg(long = "json")]
    pub json: bool,

    #[command(flatten)]
    pub schema: SchemaArgs,
}

#[derive(Args)]
pub struct StoreArgs {
    /// Directory holding incidents.jsonl and uploads.jsonl.
    #[arg(long = "store-dir", value_name = "DIR", default_value = "incident-data")]
    pub store_dir: PathBuf,
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// List uploads, newest first.
    List {
        #[command(flatten)]
        store: StoreArgs,

        /// Maximum number of entries.
        #[arg(long = "limit", default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,

        /// Print entries as JSON.
        #[arg(long = "json")]
        json: bool,
    },

    /// Aggregate statistics over all uploads.
    Stats {
        #[command(flatten)]
        store: StoreArgs,

        /// Print statistics as JSON.
        #[arg(long = "json")]
        json: bool,
    },

    /// Delete one upload entry.
    Delete {
        #[command(flatten)]
        store: StoreArgs,

        #[arg(value_name = "ID")]
        id: u64,
    },

    /// Delete all but the newest entries.
    Cleanup {
        #[command(flatten)]
        store: StoreArgs,

        /// Entries to keep.
        #[arg(long = "keep", default_value_t = DEFAULT_KEEP_RECORDS)]
        keep: usize,
    },
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
