use serde::{Deserialize, Serialize};

use incident_ingest::AnalyzeOptions;

/// Name recorded in history when the caller does not identify itself.
pub const ANONYMOUS_UPLOADER: &str = "anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOptions {
    pub uploaded_by: String,
    /// Write an upload history entry after every run.
    pub record_history: bool,
    pub preview_rows: usize,
    pub sample_rows: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        let analyze = AnalyzeOptions::default();
        Self {
            uploaded_by: ANONYMOUS_UPLOADER.to_string(),
            record_history: true,
            preview_rows: analyze.preview_rows,
            sample_rows: analyze.sample_rows,
        }
    }
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_uploaded_by(mut self, uploaded_by: impl Into<String>) -> Self {
        let uploaded_by = uploaded_by.into();
        if !uploaded_by.trim().is_empty() {
            self.uploaded_by = uploaded_by;
        }
        self
    }

    pub fn with_history(mut self, record_history: bool) -> Self {
        self.record_history = record_history;
        self
    }

    pub fn with_preview_rows(mut self, preview_rows: usize) -> Self {
        self.preview_rows = preview_rows;
        self
    }

    pub fn with_sample_rows(mut self, sample_rows: usize) -> Self {
        self.sample_rows = sample_rows;
        self
    }

    pub fn analyze_options(&self) -> AnalyzeOptions {
        AnalyzeOptions {
            sample_rows: self.sample_rows,
            preview_rows: self.preview_rows,
            ..AnalyzeOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_uploader_keeps_default() {
        let options = PipelineOptions::new().with_uploaded_by("  ");
        assert_eq!(options.uploaded_by, ANONYMOUS_UPLOADER);
        let options = options.with_uploaded_by("ops").with_sample_rows(3);
        assert_eq!(options.uploaded_by, "ops");
        assert_eq!(options.analyze_options().sample_rows, 3);
        assert_eq!(options.analyze_options().max_samples, 10);
    }
}
