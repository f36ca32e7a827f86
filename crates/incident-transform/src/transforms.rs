//! Value transformations.
//!
//! A transformation never fails: when the input does not fit, the trimmed raw
//! text is kept and the validator decides what happens to the row.

use incident_model::{FieldValue, Transformation};

use crate::datetime::parse_date;

/// Applies `transformation` to a source value. `None` keeps the text.
pub fn apply_transformation(transformation: Option<Transformation>, raw: &str) -> FieldValue {
    let value = raw.trim();
    let text = || FieldValue::Text(value.to_string());
    match transformation {
        None => text(),
        Some(Transformation::ParseDate) => {
            parse_date(value).map_or_else(text, FieldValue::Timestamp)
        }
        Some(Transformation::ParseFloat) => parse_float(value).map_or_else(text, FieldValue::Float),
        Some(Transformation::ParseInt) => parse_int(value).map_or_else(text, FieldValue::Integer),
        Some(Transformation::NormalizeSeverity) => {
            FieldValue::Text(normalize_severity(value).to_string())
        }
        Some(Transformation::NormalizeStatus) => {
            FieldValue::Text(normalize_status(value).to_string())
        }
    }
}

/// Parses a finite float; a lone decimal comma is accepted (`14,69`).
pub fn parse_float(value: &str) -> Option<f64> {
    let value = value.trim();
    let parsed = value.parse::<f64>().ok().or_else(|| {
        if value.contains(',') && !value.contains('.') {
            value.replacen(',', ".", 1).parse::<f64>().ok()
        } else {
            None
        }
    })?;
    parsed.is_finite().then_some(parsed)
}

/// Parses an integer, truncating a fractional value towards zero.
pub fn parse_int(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(parsed) = value.parse::<i64>() {
        return Some(parsed);
    }
    let parsed = parse_float(value)?.trunc();
    if parsed < i64::MIN as f64 || parsed > i64::MAX as f64 {
        return None;
    }
    Some(parsed as i64)
}

/// Maps a free-text or 1-5 score severity onto `low|medium|high|critical`.
pub fn normalize_severity(value: &str) -> &'static str {
    if let Some(score) = parse_float(value) {
        return if score <= 2.0 {
            "low"
        } else if score <= 3.0 {
            "medium"
        } else if score <= 4.0 {
            "high"
        } else {
            "critical"
        };
    }
    let lower = value.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|needle| lower.contains(needle));
    if has(&["faible", "low", "bas"]) {
        "low"
    } else if has(&["moyen", "medium", "moderate"]) {
        "medium"
    } else if has(&["élevé", "eleve", "high", "haut"]) {
        "high"
    } else if has(&["critique", "critical", "urgent"]) {
        "critical"
    } else {
        "medium"
    }
}

/// Maps a free-text status onto `open|investigating|resolved|closed`.
pub fn normalize_status(value: &str) -> &'static str {
    let lower = value.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|needle| lower.contains(needle));
    if has(&["ouvert", "open", "nouveau"]) {
        "open"
    } else if has(&["enquete", "enquête", "investigating", "en cours"]) {
        "investigating"
    } else if has(&["resolu", "résolu", "resolved", "ferme", "fermé"]) {
        "resolved"
    } else if has(&["classe", "classé", "closed", "termine", "terminé"]) {
        "closed"
    } else {
        "open"
    }
}
