#![deny(unsafe_code)]

pub mod datetime;
pub mod processor;
pub mod transforms;
pub mod validators;

pub use datetime::parse_date;
pub use processor::{RowBatch, RowOutcome, missing_required_targets, process_rows};
pub use transforms::{
    apply_transformation, normalize_severity, normalize_status, parse_float, parse_int,
};
pub use validators::passes;
