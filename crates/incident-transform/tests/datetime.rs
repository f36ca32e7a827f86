//! Tests for tolerant date parsing.

use chrono::{Datelike, NaiveDate};
use incident_model::format_timestamp;
use incident_transform::parse_date;
use proptest::prelude::*;
use proptest::test_runner::Config;

#[test]
fn common_forms_agree_on_the_day() {
    for raw in ["2024-10-03", "03/10/2024", "03-10-2024 14:30"] {
        let parsed = parse_date(raw).unwrap_or_else(|| panic!("{raw} should parse"));
        assert_eq!(
            parsed.date_naive(),
            NaiveDate::from_ymd_opt(2024, 10, 3).unwrap(),
            "{raw}"
        );
    }
}

#[test]
fn timestamps_format_with_milliseconds() {
    let parsed = parse_date("2024-01-05T08:15:30.25Z").unwrap();
    assert_eq!(format_timestamp(&parsed), "2024-01-05T08:15:30.250Z");
}

proptest! {
    #![proptest_config(Config::with_cases(128))]
    #[test]
    fn day_first_matches_iso(year in 2000_i32..2099, month in 1_u32..=12, day in 1_u32..=28) {
        let day_first = parse_date(&format!("{day:02}/{month:02}/{year}")).expect("day-first");
        let iso = parse_date(&format!("{year}-{month:02}-{day:02}")).expect("iso");
        prop_assert_eq!(day_first, iso);
        prop_assert_eq!(iso.year(), year);
    }
}
