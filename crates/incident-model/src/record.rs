//! Mapped records and their storage shape.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{DEFAULT_STATUS, TargetField};

/// Formats a timestamp as ISO-8601 UTC with millisecond precision.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Serde adapter writing timestamps with [`format_timestamp`].
pub mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|value| value.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// A transformed cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum FieldValue {
    Text(String),
    Float(f64),
    Integer(i64),
    Timestamp(#[serde(with = "iso_millis")] DateTime<Utc>),
}

impl FieldValue {
    /// Numeric view; text is parsed leniently.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Integer(value) => Some(*value as f64),
            Self::Text(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            Self::Timestamp(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            other => other.as_f64().map(|value| value.trunc() as i64),
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Float(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Timestamp(value) => f.write_str(&format_timestamp(value)),
        }
    }
}

/// One source row mapped into the target schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRecord {
    /// Source line the record came from.
    pub line: u64,
    pub status: String,
    pub values: BTreeMap<TargetField, FieldValue>,
}

impl TargetRecord {
    pub fn new(line: u64) -> Self {
        Self {
            line,
            status: DEFAULT_STATUS.to_string(),
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, field: TargetField) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    pub fn set(&mut self, field: TargetField, value: FieldValue) {
        self.values.insert(field, value);
    }

    pub fn text(&self, field: TargetField) -> Option<String> {
        self.get(field)
            .map(ToString::to_string)
            .filter(|text| !text.trim().is_empty())
    }
}

/// A record normalized to the incident table columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRow {
    pub incident_type: String,
    pub location: String,
    #[serde(with = "iso_millis")]
    pub date_occurred: DateTime<Utc>,
    pub description: Option<String>,
    pub status: String,
    pub severity: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub agent_name: Option<String>,
    pub victim_count: i64,
    pub suspect_description: Option<String>,
    pub source: String,
}

impl IncidentRow {
    /// Column constraints enforced by the incident table.
    pub fn constraint_violation(&self) -> Option<String> {
        if self.incident_type.trim().is_empty() {
            return Some("incident_type must not be empty".to_string());
        }
        if self.location.trim().is_empty() {
            return Some("location must not be empty".to_string());
        }
        if let Some(lat) = self.latitude
            && !(-90.0..=90.0).contains(&lat)
        {
            return Some(format!("latitude {lat} out of range"));
        }
        if let Some(lng) = self.longitude
            && !(-180.0..=180.0).contains(&lng)
        {
            return Some(format!("longitude {lng} out of range"));
        }
        if self.victim_count < 0 {
            return Some(format!("victim_count {} is negative", self.victim_count));
        }
        None
    }
}

/// An incident as returned by the store after insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredIncident {
    pub id: u64,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub row: IncidentRow,
}
