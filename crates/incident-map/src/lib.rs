#![deny(unsafe_code)]

mod error;
pub mod rules;
pub mod suggest;

pub use error::MappingError;
pub use rules::{
    MappingRules, generate_mapping_rules, parse_override, rule_for, transformation_for,
    validate_rules,
};
pub use suggest::{normalize_column, suggest_mapping};
