//! Incident import pipeline.
//!
//! [`Pipeline::analyze`] profiles an upload; [`Pipeline::process`] maps,
//! validates and stores it and records the run in the upload history.

#![deny(unsafe_code)]

pub mod options;
pub mod pipeline;
pub mod state;

pub use options::{ANONYMOUS_UPLOADER, PipelineOptions};
pub use pipeline::{Pipeline, Upload};
pub use state::{RunOutcome, RunState};
