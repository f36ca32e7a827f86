use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unknown target field: {0}")]
    UnknownField(String),
    #[error("invalid schema configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
