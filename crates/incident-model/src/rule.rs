//! Per-column mapping rules.

use std::fmt;

use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer, Serialize};

use crate::schema::TargetField;

/// Transformation applied to a trimmed, non-empty source value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transformation {
    #[serde(rename = "parseDate")]
    ParseDate,
    #[serde(rename = "parseFloat")]
    ParseFloat,
    #[serde(rename = "parseInt")]
    ParseInt,
    #[serde(rename = "normalizeSeverity")]
    NormalizeSeverity,
    #[serde(rename = "normalizeStatus")]
    NormalizeStatus,
}

impl Transformation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ParseDate => "parseDate",
            Self::ParseFloat => "parseFloat",
            Self::ParseInt => "parseInt",
            Self::NormalizeSeverity => "normalizeSeverity",
            Self::NormalizeStatus => "normalizeStatus",
        }
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Predicate checked against a transformed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validator {
    /// Numeric and within [-90, 90].
    LatitudeRange,
    /// Numeric and within [-180, 180].
    LongitudeRange,
    /// Parses as a date.
    ValidDate,
    /// Numeric and >= 0.
    NonNegative,
}

impl Validator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LatitudeRange => "latitude_range",
            Self::LongitudeRange => "longitude_range",
            Self::ValidDate => "valid_date",
            Self::NonNegative => "non_negative",
        }
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instruction for one source column.
///
/// `target_field == None` leaves the column unmapped but still editable. On
/// input, an empty string reads as `None` for the optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRule {
    pub csv_column: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub target_field: Option<TargetField>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub transformation: Option<Transformation>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub validator: Option<Validator>,
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            T::deserialize(raw.trim().to_string().into_deserializer()).map(Some)
        }
        _ => Ok(None),
    }
}

impl MappingRule {
    /// An unmapped rule for `csv_column`.
    pub fn unmapped(csv_column: impl Into<String>) -> Self {
        Self {
            csv_column: csv_column.into(),
            target_field: None,
            transformation: None,
            required: false,
            validator: None,
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.target_field.is_some()
    }
}
