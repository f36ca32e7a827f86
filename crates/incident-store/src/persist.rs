//! Persistence adapter: normalizes records and bulk-inserts them.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use incident_model::{
    FieldValue, IMPORT_SOURCE, IncidentRow, ProcessingIssue, StoredIncident, TargetField,
    TargetRecord,
};
use incident_transform::{parse_date, parse_float, parse_int};

use crate::store::IncidentStore;

pub const DEFAULT_INCIDENT_TYPE: &str = "Incident";
pub const DEFAULT_LOCATION: &str = "Unspecified";

/// What the store accepted, plus the failure if it refused the batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistOutcome {
    pub inserted: Vec<StoredIncident>,
    pub error: Option<ProcessingIssue>,
}

impl PersistOutcome {
    pub fn inserted_rows(&self) -> usize {
        self.inserted.len()
    }
}

fn float_of(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Float(value) => Some(*value),
        FieldValue::Integer(value) => Some(*value as f64),
        FieldValue::Text(text) => parse_float(text),
        FieldValue::Timestamp(_) => None,
    }
}

fn int_of(value: &FieldValue) -> Option<i64> {
    match value {
        FieldValue::Integer(value) => Some(*value),
        FieldValue::Float(value) => Some(value.trunc() as i64),
        FieldValue::Text(text) => parse_int(text),
        FieldValue::Timestamp(_) => None,
    }
}

fn date_of(value: &FieldValue) -> Option<DateTime<Utc>> {
    match value {
        FieldValue::Timestamp(value) => Some(*value),
        FieldValue::Text(text) => parse_date(text),
        FieldValue::Float(_) | FieldValue::Integer(_) => None,
    }
}

/// Maps a record onto the incident table columns, filling defaults.
pub fn normalize_record(record: &TargetRecord, now: DateTime<Utc>) -> IncidentRow {
    IncidentRow {
        incident_type: record
            .text(TargetField::IncidentType)
            .unwrap_or_else(|| DEFAULT_INCIDENT_TYPE.to_string()),
        location: record
            .text(TargetField::Location)
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        date_occurred: record
            .get(TargetField::DateOccurred)
            .and_then(date_of)
            .unwrap_or(now),
        description: record.text(TargetField::Description),
        status: record
            .text(TargetField::Status)
            .unwrap_or_else(|| record.status.clone()),
        severity: record.text(TargetField::Severity),
        latitude: record.get(TargetField::Latitude).and_then(float_of),
        longitude: record.get(TargetField::Longitude).and_then(float_of),
        agent_name: record.text(TargetField::AgentName),
        victim_count: record
            .get(TargetField::VictimCount)
            .and_then(int_of)
            .unwrap_or(0),
        suspect_description: record.text(TargetField::SuspectDescription),
        source: IMPORT_SOURCE.to_string(),
    }
}

/// Normalizes `records` and stores them in one batch.
///
/// An empty batch never reaches the store. A refused batch stores nothing and
/// yields a [`ProcessingIssue::Persistence`].
pub fn persist(store: &dyn IncidentStore, records: &[TargetRecord]) -> PersistOutcome {
    if records.is_empty() {
        debug!("no records to persist");
        return PersistOutcome::default();
    }

    let now = Utc::now();
    let rows: Vec<IncidentRow> = records
        .iter()
        .map(|record| normalize_record(record, now))
        .collect();

    match store.insert_batch(&rows) {
        Ok(inserted) => {
            info!(rows = rows.len(), inserted = inserted.len(), "batch stored");
            PersistOutcome {
                inserted,
                error: None,
            }
        }
        Err(e) => {
            warn!(rows = rows.len(), error = %e, "batch insert failed");
            PersistOutcome {
                inserted: Vec::new(),
                error: Some(ProcessingIssue::Persistence {
                    message: e.to_string(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn defaults_fill_missing_columns() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let row = normalize_record(&TargetRecord::new(2), now);
        assert_eq!(row.incident_type, DEFAULT_INCIDENT_TYPE);
        assert_eq!(row.location, DEFAULT_LOCATION);
        assert_eq!(row.date_occurred, now);
        assert_eq!(row.status, "imported");
        assert_eq!(row.victim_count, 0);
        assert_eq!(row.source, IMPORT_SOURCE);
        assert!(row.description.is_none());
        assert!(row.latitude.is_none());
    }

    #[test]
    fn text_values_are_coerced() {
        let now = Utc::now();
        let mut record = TargetRecord::new(3);
        record.set(TargetField::Latitude, FieldValue::Text("14,69".into()));
        record.set(TargetField::VictimCount, FieldValue::Float(2.7));
        record.set(TargetField::Status, FieldValue::Text("open".into()));
        record.set(TargetField::Description, FieldValue::Text("  ".into()));
        let row = normalize_record(&record, now);
        assert_eq!(row.latitude, Some(14.69));
        assert_eq!(row.victim_count, 2);
        assert_eq!(row.status, "open");
        assert!(row.description.is_none());
    }
}
