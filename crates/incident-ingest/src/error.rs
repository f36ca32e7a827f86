//! Error types for CSV ingestion.

use thiserror::Error;

/// Errors that can occur while reading an uploaded file.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The file has no content besides whitespace.
    #[error("CSV input is empty")]
    EmptyInput,

    /// The file starts with a byte-order mark for an encoding we do not read.
    #[error("unsupported encoding: {encoding}")]
    UnsupportedEncoding { encoding: &'static str },

    /// The CSV reader rejected the content.
    #[error("failed to parse CSV: {message}")]
    CsvParse { message: String },
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        Self::CsvParse {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::UnsupportedEncoding {
            encoding: "UTF-16 LE",
        };
        assert_eq!(err.to_string(), "unsupported encoding: UTF-16 LE");
    }
}
