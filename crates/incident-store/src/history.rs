//! History recorder and statistics.

use tracing::{debug, warn};

use incident_model::{ProcessingStatus, UploadHistoryEntry, UploadRecord, UploadStats};

use crate::store::HistoryStore;

/// Entries shown as recent in [`UploadStats`].
pub const RECENT_UPLOADS: usize = 5;

/// Records a run summary. Returns a warning instead of failing.
pub fn record_run(store: &dyn HistoryStore, record: UploadRecord) -> Option<String> {
    let filename = record.filename.clone();
    match store.record(record) {
        Ok(entry) => {
            debug!(
                id = entry.id,
                file = %filename,
                status = %entry.processing_status,
                "upload recorded"
            );
            None
        }
        Err(e) => {
            warn!(file = %filename, error = %e, "could not record upload history");
            Some(format!("Could not record upload history: {e}"))
        }
    }
}

/// Aggregates statistics over `entries`, which must be newest first.
pub fn upload_stats(entries: &[UploadHistoryEntry]) -> UploadStats {
    if entries.is_empty() {
        return UploadStats::default();
    }

    let total_uploads = entries.len();
    let successes = entries
        .iter()
        .filter(|entry| entry.processing_status == ProcessingStatus::Success)
        .count();
    let scores: Vec<f64> = entries
        .iter()
        .filter_map(|entry| entry.quality_score)
        .collect();
    let average_quality_score = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };

    UploadStats {
        total_uploads,
        total_rows_processed: entries.iter().map(|entry| entry.processed_rows).sum(),
        success_rate: successes as f64 / total_uploads as f64 * 100.0,
        average_quality_score,
        recent_uploads: entries.iter().take(RECENT_UPLOADS).cloned().collect(),
        last_upload_date: entries.first().map(|entry| entry.upload_date),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn entry(id: u64, processed: usize, errors: usize, score: Option<f64>) -> UploadHistoryEntry {
        UploadRecord {
            filename: format!("{id}.csv"),
            file_size: 1,
            total_rows: processed + errors,
            processed_rows: processed,
            error_rows: errors,
            quality_score: score,
            error_details: None,
            mapping_rules: Vec::new(),
            processing_time_ms: 0,
            uploaded_by: None,
        }
        .into_entry(id, Utc::now() - Duration::minutes(id as i64))
    }

    #[test]
    fn empty_history_has_zero_stats() {
        let stats = upload_stats(&[]);
        assert_eq!(stats.total_uploads, 0);
        assert!(stats.last_upload_date.is_none());
    }

    #[test]
    fn stats_over_mixed_runs() {
        let entries: Vec<_> = (1..=6)
            .map(|id| {
                if id % 2 == 0 {
                    entry(id, 4, 0, Some(90.0))
                } else {
                    entry(id, 1, 1, None)
                }
            })
            .collect();
        let stats = upload_stats(&entries);
        assert_eq!(stats.total_uploads, 6);
        assert_eq!(stats.total_rows_processed, 15);
        assert_eq!(stats.success_rate, 50.0);
        assert_eq!(stats.average_quality_score, 90.0);
        assert_eq!(stats.recent_uploads.len(), RECENT_UPLOADS);
        assert_eq!(stats.last_upload_date, Some(entries[0].upload_date));
    }
}
