//! Value type detectors used for column profiling.

use std::sync::LazyLock;

use regex::Regex;

use incident_model::InferredType;
use incident_transform::parse_date;

static COORDINATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+\.\d+$").expect("Invalid coordinate regex"));

/// Minimum share of samples for each inferred type, with the confidence it yields.
pub const NUMBER_THRESHOLD: (f64, f64) = (0.8, 0.8);
pub const DATE_THRESHOLD: (f64, f64) = (0.6, 0.9);
pub const COORDINATE_THRESHOLD: (f64, f64) = (0.7, 0.85);

pub fn is_numeric(value: &str) -> bool {
    value
        .trim()
        .parse::<f64>()
        .is_ok_and(|number| number.is_finite())
}

pub fn is_date(value: &str) -> bool {
    parse_date(value).is_some()
}

/// Decimal number with a fractional part, e.g. `14.6928`.
pub fn is_coordinate(value: &str) -> bool {
    COORDINATE_REGEX.is_match(value.trim())
}

/// Infers a column type from non-blank samples.
///
/// Later checks override earlier ones: coordinates beat dates, dates beat numbers.
pub fn infer_type(samples: &[String]) -> (InferredType, f64) {
    if samples.is_empty() {
        return (InferredType::String, 0.0);
    }
    let total = samples.len() as f64;
    let share = |detector: fn(&str) -> bool| {
        samples.iter().filter(|value| detector(value)).count() as f64 / total
    };

    let mut inferred = (InferredType::String, 0.0);
    if share(is_numeric) >= NUMBER_THRESHOLD.0 {
        inferred = (InferredType::Number, NUMBER_THRESHOLD.1);
    }
    if share(is_date) >= DATE_THRESHOLD.0 {
        inferred = (InferredType::Date, DATE_THRESHOLD.1);
    }
    if share(is_coordinate) >= COORDINATE_THRESHOLD.0 {
        inferred = (InferredType::Coordinates, COORDINATE_THRESHOLD.1);
    }
    inferred
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    #[test]
    fn detectors() {
        assert!(is_numeric(" 42 "));
        assert!(is_numeric("-3.5e2"));
        assert!(!is_numeric("NaN"));
        assert!(is_coordinate("-17.4467"));
        assert!(!is_coordinate("17"));
        assert!(is_date("05/01/2024"));
        assert!(!is_date("Dakar"));
    }

    #[test]
    fn later_types_override_earlier_ones() {
        assert_eq!(
            infer_type(&samples(&["14.69", "14.70", "14.71"])),
            (InferredType::Coordinates, 0.85)
        );
        assert_eq!(
            infer_type(&samples(&["1", "2", "3", "4", "x"])),
            (InferredType::Number, 0.8)
        );
        assert_eq!(
            infer_type(&samples(&["2024-01-05", "2024-01-06", "03/10/2024", "n/a", "?"])),
            (InferredType::Date, 0.9)
        );
        assert_eq!(
            infer_type(&samples(&["Vol", "Rixe"])),
            (InferredType::String, 0.0)
        );
        assert_eq!(infer_type(&[]), (InferredType::String, 0.0));
    }
}
