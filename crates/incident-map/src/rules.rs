//! Mapping rule generation and editing.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use incident_model::{CsvAnalysis, MappingRule, SchemaConfig, TargetField, Transformation};

use crate::error::MappingError;

/// Transformation for a column mapped onto `target`.
///
/// The target field decides: coordinates are always parsed as floats, the
/// occurrence date always as a date, whatever the sampled type looked like.
pub fn transformation_for(schema: &SchemaConfig, target: TargetField) -> Option<Transformation> {
    schema.default_transformation(target)
}

/// Builds the rule for `column` mapped onto `target`, with schema defaults.
pub fn rule_for(
    schema: &SchemaConfig,
    column: &str,
    target: Option<TargetField>,
) -> MappingRule {
    match target {
        Some(field) => MappingRule {
            csv_column: column.to_string(),
            target_field: Some(field),
            transformation: transformation_for(schema, field),
            required: schema.is_required(field),
            validator: schema.default_validator(field),
        },
        None => MappingRule::unmapped(column),
    }
}

/// One rule per analysed column, mapped or not, in column order.
pub fn generate_mapping_rules(analysis: &CsvAnalysis, schema: &SchemaConfig) -> Vec<MappingRule> {
    let rules: Vec<MappingRule> = analysis
        .columns
        .iter()
        .map(|column| rule_for(schema, &column.name, column.suggested_mapping))
        .collect();
    debug!(
        columns = rules.len(),
        mapped = rules.iter().filter(|rule| rule.is_mapped()).count(),
        "generated mapping rules"
    );
    rules
}

/// Rules whose column does not exist in the analysis.
pub fn validate_rules(rules: &[MappingRule], analysis: &CsvAnalysis) -> Vec<MappingError> {
    rules
        .iter()
        .filter(|rule| !analysis.has_column(&rule.csv_column))
        .map(|rule| MappingError::ColumnNotFound(rule.csv_column.clone()))
        .collect()
}

/// Parses a `COLUMN=FIELD` override. An empty field or `none` clears the mapping.
pub fn parse_override(raw: &str) -> Result<(String, Option<TargetField>), MappingError> {
    let (column, field) = raw
        .split_once('=')
        .ok_or_else(|| MappingError::InvalidOverride(raw.to_string()))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(MappingError::InvalidOverride(raw.to_string()));
    }
    let field = field.trim();
    if field.is_empty() || field.eq_ignore_ascii_case("none") {
        return Ok((column.to_string(), None));
    }
    let target = field
        .parse::<TargetField>()
        .map_err(|_| MappingError::UnknownField(field.to_string()))?;
    Ok((column.to_string(), Some(target)))
}

/// Editable rule set bound to the columns of one analysis.
///
/// Every rule refers to an analysed column; edits addressing any other column
/// fail with [`MappingError::ColumnNotFound`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRules {
    rules: Vec<MappingRule>,
}

impl MappingRules {
    pub fn generate(analysis: &CsvAnalysis, schema: &SchemaConfig) -> Self {
        Self {
            rules: generate_mapping_rules(analysis, schema),
        }
    }

    /// Adopts externally edited rules after checking them against `analysis`.
    ///
    /// Columns without a rule get an unmapped one, so the set stays complete.
    pub fn from_rules(
        rules: Vec<MappingRule>,
        analysis: &CsvAnalysis,
    ) -> Result<Self, MappingError> {
        if let Some(err) = validate_rules(&rules, analysis).into_iter().next() {
            return Err(err);
        }
        // A later rule for the same column replaces an earlier one.
        let mut by_column: BTreeMap<String, MappingRule> = rules
            .into_iter()
            .map(|rule| (rule.csv_column.clone(), rule))
            .collect();
        let mut ordered = Vec::with_capacity(analysis.columns.len());
        for column in &analysis.columns {
            let rule = by_column
                .remove(&column.name)
                .unwrap_or_else(|| MappingRule::unmapped(&column.name));
            ordered.push(rule);
        }
        Ok(Self { rules: ordered })
    }

    /// Parses a JSON array of rules and adopts it.
    pub fn from_json(json: &str, analysis: &CsvAnalysis) -> Result<Self, MappingError> {
        let rules: Vec<MappingRule> =
            serde_json::from_str(json).map_err(|err| MappingError::InvalidRules(err.to_string()))?;
        Self::from_rules(rules, analysis)
    }

    pub fn as_slice(&self) -> &[MappingRule] {
        &self.rules
    }

    pub fn into_vec(self) -> Vec<MappingRule> {
        self.rules
    }

    pub fn iter(&self) -> impl Iterator<Item = &MappingRule> {
        self.rules.iter()
    }

    pub fn get(&self, column: &str) -> Option<&MappingRule> {
        self.rules.iter().find(|rule| rule.csv_column == column)
    }

    fn position(&self, column: &str) -> Result<usize, MappingError> {
        self.rules
            .iter()
            .position(|rule| rule.csv_column == column)
            .ok_or_else(|| MappingError::ColumnNotFound(column.to_string()))
    }

    /// Retargets a column, re-deriving transformation, required flag and validator.
    pub fn set_target(
        &mut self,
        schema: &SchemaConfig,
        column: &str,
        target: Option<TargetField>,
    ) -> Result<&MappingRule, MappingError> {
        let idx = self.position(column)?;
        self.rules[idx] = rule_for(schema, column, target);
        debug!(column, target = ?target, "retargeted column");
        Ok(&self.rules[idx])
    }

    pub fn clear(&mut self, column: &str) -> Result<(), MappingError> {
        let idx = self.position(column)?;
        self.rules[idx] = MappingRule::unmapped(column);
        Ok(())
    }

    /// Overrides the transformation of a column without touching its target.
    pub fn set_transformation(
        &mut self,
        column: &str,
        transformation: Option<Transformation>,
    ) -> Result<(), MappingError> {
        let idx = self.position(column)?;
        self.rules[idx].transformation = transformation;
        Ok(())
    }

    pub fn set_required(&mut self, column: &str, required: bool) -> Result<(), MappingError> {
        let idx = self.position(column)?;
        self.rules[idx].required = required;
        Ok(())
    }

    /// Applies a `COLUMN=FIELD` override.
    pub fn apply_override(
        &mut self,
        schema: &SchemaConfig,
        raw: &str,
    ) -> Result<&MappingRule, MappingError> {
        let (column, target) = parse_override(raw)?;
        self.set_target(schema, &column, target)
    }

    /// Distinct target fields currently mapped.
    pub fn mapped_targets(&self) -> BTreeSet<TargetField> {
        self.rules
            .iter()
            .filter_map(|rule| rule.target_field)
            .collect()
    }
}

impl AsRef<[MappingRule]> for MappingRules {
    fn as_ref(&self) -> &[MappingRule] {
        &self.rules
    }
}
