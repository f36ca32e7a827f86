//! CSV ingestion for incident imports.
//!
//! - [`decode`](decode::decode) turns uploaded bytes into text
//! - [`sniff`] guesses the delimiter and whether the first line is a header
//! - [`read_table`] parses the text into a [`RawTable`](incident_model::RawTable)
//! - [`analyze`] profiles every column and scores the file against the schema

#![deny(unsafe_code)]

pub mod analyzer;
pub mod decode;
pub mod detect;
mod error;
pub mod reader;
pub mod sniff;

pub use analyzer::{
    AnalyzeOptions, Ingested, MIN_REPRESENTATIVE_ROWS, analyze, analyze_table, ingest,
    ingest_with, quality_score,
};
pub use decode::{Decoded, decode};
pub use error::{IngestError, Result};
pub use reader::read_table;
pub use sniff::{detect_delimiter, detect_headers};
