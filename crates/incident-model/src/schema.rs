//! Fixed incident target schema.
//!
//! The target schema is closed: every imported row must land in one of the
//! [`TargetField`] columns. What *is* configurable is how source columns are
//! recognised (aliases) and which transformation and validator each field uses
//! by default, bundled in an immutable [`SchemaConfig`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::rule::{Transformation, Validator};

/// Value written to the `source` column of every imported incident.
pub const IMPORT_SOURCE: &str = "csv_import";

/// Default `status` of an imported incident.
pub const DEFAULT_STATUS: &str = "imported";

/// Target fields that every rule set must cover before processing starts.
pub const REQUIRED_TARGETS: [TargetField; 3] = [
    TargetField::IncidentType,
    TargetField::Location,
    TargetField::DateOccurred,
];

/// A column of the incident table that CSV data can be mapped onto.
///
/// Declaration order is the schema order used for alias matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetField {
    IncidentType,
    Location,
    DateOccurred,
    Description,
    Status,
    Severity,
    Latitude,
    Longitude,
    AgentName,
    VictimCount,
    SuspectDescription,
}

impl TargetField {
    /// All mappable fields in schema order.
    pub const ALL: [TargetField; 11] = [
        Self::IncidentType,
        Self::Location,
        Self::DateOccurred,
        Self::Description,
        Self::Status,
        Self::Severity,
        Self::Latitude,
        Self::Longitude,
        Self::AgentName,
        Self::VictimCount,
        Self::SuspectDescription,
    ];

    /// Storage column name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IncidentType => "incident_type",
            Self::Location => "location",
            Self::DateOccurred => "date_occurred",
            Self::Description => "description",
            Self::Status => "status",
            Self::Severity => "severity",
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
            Self::AgentName => "agent_name",
            Self::VictimCount => "victim_count",
            Self::SuspectDescription => "suspect_description",
        }
    }

    /// Storage type, as documented for the incident table.
    pub fn storage_type(self) -> &'static str {
        match self {
            Self::DateOccurred => "timestamp",
            Self::Latitude | Self::Longitude => "float",
            Self::VictimCount => "integer",
            _ => "text",
        }
    }

    /// True for members of the fixed required-target set.
    pub fn is_required(self) -> bool {
        REQUIRED_TARGETS.contains(&self)
    }
}

impl fmt::Display for TargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetField {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| SchemaError::UnknownField(needle.to_string()))
    }
}

/// Recognition and processing defaults for one target field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field: TargetField,
    pub required: bool,
    /// Lowercase column-name aliases, in priority order.
    pub aliases: Vec<String>,
    pub transformation: Option<Transformation>,
    pub validator: Option<Validator>,
}

impl FieldSpec {
    fn new(field: TargetField, aliases: &[&str]) -> Self {
        Self {
            field,
            required: field.is_required(),
            aliases: aliases.iter().map(|alias| alias.to_lowercase()).collect(),
            transformation: None,
            validator: None,
        }
    }

    fn with_transformation(mut self, transformation: Transformation) -> Self {
        self.transformation = Some(transformation);
        self
    }

    fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }
}

/// Immutable alias table and transformation/validator registry.
///
/// Built once and shared by reference (or `Arc`) between runs; nothing in the
/// pipeline mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    fields: Vec<FieldSpec>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self::incidents()
    }
}

impl SchemaConfig {
    /// The built-in incident schema with its French/English alias table.
    pub fn incidents() -> Self {
        use TargetField as F;
        let fields = vec![
            FieldSpec::new(
                F::IncidentType,
                &["type", "crime_type", "incident", "nature", "delit"],
            ),
            FieldSpec::new(
                F::Location,
                &["lieu", "zone", "quartier", "address", "adresse", "position"],
            ),
            FieldSpec::new(
                F::DateOccurred,
                &["date", "time", "datetime", "timestamp", "heure", "moment"],
            )
            .with_transformation(Transformation::ParseDate)
            .with_validator(Validator::ValidDate),
            FieldSpec::new(
                F::Description,
                &["detail", "commentaire", "note", "description", "details"],
            ),
            FieldSpec::new(F::Status, &["statut", "etat", "state", "situation"]),
            FieldSpec::new(
                F::Severity,
                &["gravite", "priorite", "level", "niveau", "importance"],
            ),
            FieldSpec::new(F::Latitude, &["lat", "y", "coord_y"])
                .with_transformation(Transformation::ParseFloat)
                .with_validator(Validator::LatitudeRange),
            FieldSpec::new(F::Longitude, &["lng", "lon", "x", "coord_x"])
                .with_transformation(Transformation::ParseFloat)
                .with_validator(Validator::LongitudeRange),
            FieldSpec::new(
                F::AgentName,
                &["agent", "officier", "responsable", "enqueteur"],
            ),
            FieldSpec::new(F::VictimCount, &["victimes", "nb_victimes", "victims"])
                .with_transformation(Transformation::ParseInt)
                .with_validator(Validator::NonNegative),
            FieldSpec::new(F::SuspectDescription, &["suspect", "auteur", "prevenu"]),
        ];
        Self { fields }
    }

    /// Returns a copy with additional aliases appended per field.
    ///
    /// Aliases are lowercased and de-duplicated; existing aliases keep priority.
    pub fn with_extra_aliases<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (TargetField, S)>,
        S: AsRef<str>,
    {
        for (field, alias) in extra {
            let alias = alias.as_ref().trim().to_lowercase();
            if alias.is_empty() {
                continue;
            }
            if let Some(spec) = self.fields.iter_mut().find(|spec| spec.field == field)
                && !spec.aliases.contains(&alias)
            {
                spec.aliases.push(alias);
            }
        }
        self
    }

    /// Field specs in schema order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn spec(&self, field: TargetField) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.field == field)
    }

    /// True if the field is inherently required or in [`REQUIRED_TARGETS`].
    pub fn is_required(&self, field: TargetField) -> bool {
        field.is_required() || self.spec(field).is_some_and(|spec| spec.required)
    }

    pub fn required_fields(&self) -> Vec<TargetField> {
        TargetField::ALL
            .into_iter()
            .filter(|field| self.is_required(*field))
            .collect()
    }

    pub fn default_transformation(&self, field: TargetField) -> Option<Transformation> {
        self.spec(field).and_then(|spec| spec.transformation)
    }

    pub fn default_validator(&self, field: TargetField) -> Option<Validator> {
        self.spec(field).and_then(|spec| spec.validator)
    }
}
