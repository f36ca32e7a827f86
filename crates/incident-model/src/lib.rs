pub mod analysis;
pub mod error;
pub mod history;
pub mod record;
pub mod result;
pub mod rule;
pub mod schema;
pub mod table;

pub use analysis::{AnalysisIssue, ColumnProfile, CsvAnalysis, InferredType};
pub use error::{Result, SchemaError};
pub use history::{
    ErrorDetails, ProcessingStatus, UploadHistoryEntry, UploadRecord, UploadStats, UploadUpdate,
};
pub use record::{FieldValue, IncidentRow, StoredIncident, TargetRecord, format_timestamp};
pub use result::{ProcessingIssue, ProcessingResult};
pub use rule::{MappingRule, Transformation, Validator};
pub use schema::{
    DEFAULT_STATUS, FieldSpec, IMPORT_SOURCE, REQUIRED_TARGETS, SchemaConfig, TargetField,
};
pub use table::{RaggedRow, RawTable};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_issue_messages() {
        let abort = ProcessingIssue::StructuralAbort {
            missing: vec![TargetField::Location, TargetField::DateOccurred],
        };
        assert_eq!(
            abort.to_string(),
            "Required fields are not mapped: location, date_occurred"
        );
        let row = ProcessingIssue::RowValidation {
            line: 4,
            field: TargetField::Latitude,
            value: "not-a-number".to_string(),
        };
        assert_eq!(
            row.to_string(),
            "Line 4: invalid value for latitude: not-a-number"
        );
        assert!(row.is_row_scoped());
    }

    #[test]
    fn mapping_rule_serializes_with_transformation_ids() {
        let rule = MappingRule {
            csv_column: "date".to_string(),
            target_field: Some(TargetField::DateOccurred),
            transformation: Some(Transformation::ParseDate),
            required: true,
            validator: Some(Validator::ValidDate),
        };
        let json = serde_json::to_value(&rule).expect("serialize rule");
        assert_eq!(json["target_field"], "date_occurred");
        assert_eq!(json["transformation"], "parseDate");
        assert_eq!(json["validator"], "valid_date");

        let minimal: MappingRule =
            serde_json::from_str(r#"{"csv_column":"notes"}"#).expect("deserialize rule");
        assert_eq!(minimal, MappingRule::unmapped("notes"));
    }

    #[test]
    fn timestamps_serialize_with_milliseconds() {
        let value = FieldValue::Timestamp(
            chrono::DateTime::parse_from_rfc3339("2024-01-05T00:00:00Z")
                .unwrap()
                .with_timezone(&chrono::Utc),
        );
        let json = serde_json::to_value(&value).expect("serialize value");
        assert_eq!(json["kind"], "Timestamp");
        assert_eq!(json["value"], "2024-01-05T00:00:00.000Z");
    }
}
