//! Column-name to target-field suggestion.
//!
//! Matching runs in two passes over the schema in field order:
//!
//! 1. exact: the normalized column name equals a field name or one of its aliases;
//! 2. containment: an alias occurs inside the column name. Aliases shorter than
//!    [`MIN_SUBSTRING_ALIAS`] characters (`x`, `y`) only match as a whole token,
//!    so `city` is not taken for a latitude column.
//!
//! The first hit wins.

use incident_model::{SchemaConfig, TargetField};

/// Shortest alias that may match as a plain substring.
pub const MIN_SUBSTRING_ALIAS: usize = 3;

/// Lowercases and trims a column name for matching.
pub fn normalize_column(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn tokens(name: &str) -> impl Iterator<Item = &str> {
    name.split(['_', ' ', '-', '.'])
        .filter(|token| !token.is_empty())
}

fn alias_matches(name: &str, alias: &str) -> bool {
    if alias.chars().count() < MIN_SUBSTRING_ALIAS {
        tokens(name).any(|token| token == alias)
    } else {
        name.contains(alias)
    }
}

/// Suggests the target field for a source column, if any alias matches.
pub fn suggest_mapping(schema: &SchemaConfig, column_name: &str) -> Option<TargetField> {
    let name = normalize_column(column_name);
    if name.is_empty() {
        return None;
    }

    let exact = schema.fields().iter().find(|spec| {
        spec.field.as_str() == name || spec.aliases.iter().any(|alias| *alias == name)
    });
    if let Some(spec) = exact {
        return Some(spec.field);
    }

    schema
        .fields()
        .iter()
        .find(|spec| spec.aliases.iter().any(|alias| alias_matches(&name, alias)))
        .map(|spec| spec.field)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggest(name: &str) -> Option<TargetField> {
        suggest_mapping(&SchemaConfig::incidents(), name)
    }

    #[test]
    fn matches_french_and_english_aliases() {
        assert_eq!(suggest("type"), Some(TargetField::IncidentType));
        assert_eq!(suggest("Lieu"), Some(TargetField::Location));
        assert_eq!(suggest(" date "), Some(TargetField::DateOccurred));
        assert_eq!(suggest("gravite"), Some(TargetField::Severity));
        assert_eq!(suggest("nb_victimes"), Some(TargetField::VictimCount));
    }

    #[test]
    fn exact_field_names_win_over_substrings() {
        assert_eq!(suggest("date_occurred"), Some(TargetField::DateOccurred));
        assert_eq!(suggest("suspect_description"), Some(TargetField::SuspectDescription));
        assert_eq!(suggest("incident_type"), Some(TargetField::IncidentType));
    }

    #[test]
    fn containment_follows_schema_order() {
        assert_eq!(suggest("crime_type_code"), Some(TargetField::IncidentType));
        assert_eq!(suggest("latitude"), Some(TargetField::Latitude));
        assert_eq!(suggest("longitude"), Some(TargetField::Longitude));
        assert_eq!(suggest("date_heure"), Some(TargetField::DateOccurred));
    }

    #[test]
    fn short_aliases_need_a_whole_token() {
        assert_eq!(suggest("x"), Some(TargetField::Longitude));
        assert_eq!(suggest("coord y"), Some(TargetField::Latitude));
        assert_eq!(suggest("city"), None);
        assert_eq!(suggest("weapon"), None);
        assert_eq!(suggest(""), None);
    }

    #[test]
    fn extra_aliases_participate() {
        let schema =
            SchemaConfig::incidents().with_extra_aliases([(TargetField::Location, "commune")]);
        assert_eq!(
            suggest_mapping(&schema, "Commune_Nom"),
            Some(TargetField::Location)
        );
    }
}
