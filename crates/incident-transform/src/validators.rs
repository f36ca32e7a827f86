use incident_model::{FieldValue, Validator};

use crate::datetime::parse_date;

/// Checks a transformed value against `validator`.
pub fn passes(validator: Validator, value: &FieldValue) -> bool {
    match validator {
        Validator::LatitudeRange => value
            .as_f64()
            .is_some_and(|lat| (-90.0..=90.0).contains(&lat)),
        Validator::LongitudeRange => value
            .as_f64()
            .is_some_and(|lng| (-180.0..=180.0).contains(&lng)),
        Validator::ValidDate => match value {
            FieldValue::Timestamp(_) => true,
            FieldValue::Text(text) => parse_date(text).is_some(),
            FieldValue::Float(_) | FieldValue::Integer(_) => false,
        },
        Validator::NonNegative => value.as_f64().is_some_and(|count| count >= 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_are_inclusive() {
        assert!(passes(Validator::LatitudeRange, &FieldValue::Float(90.0)));
        assert!(!passes(Validator::LatitudeRange, &FieldValue::Float(90.01)));
        assert!(passes(Validator::LongitudeRange, &FieldValue::Float(-180.0)));
        assert!(!passes(
            Validator::LatitudeRange,
            &FieldValue::Text("not-a-number".into())
        ));
    }

    #[test]
    fn counts_and_dates() {
        assert!(passes(Validator::NonNegative, &FieldValue::Integer(0)));
        assert!(!passes(Validator::NonNegative, &FieldValue::Integer(-1)));
        assert!(!passes(Validator::ValidDate, &FieldValue::Text("soon".into())));
        assert!(passes(
            Validator::ValidDate,
            &FieldValue::Text("2024-01-05".into())
        ));
    }
}
