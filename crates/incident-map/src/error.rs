//! Error types for mapping operations.

use std::fmt;

/// Errors from mapping operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// Column not present in the analysed file.
    ColumnNotFound(String),
    /// Name that is not a target schema field.
    UnknownField(String),
    /// Override not of the form `COLUMN=FIELD`.
    InvalidOverride(String),
    /// Rules document that could not be read.
    InvalidRules(String),
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnNotFound(c) => write!(f, "Column not found: {c}"),
            Self::UnknownField(v) => write!(f, "Unknown target field: {v}"),
            Self::InvalidOverride(o) => {
                write!(f, "Invalid mapping override '{o}', expected COLUMN=FIELD")
            }
            Self::InvalidRules(m) => write!(f, "Invalid mapping rules: {m}"),
        }
    }
}

impl std::error::Error for MappingError {}
