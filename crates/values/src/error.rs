//! Schema construction errors.

use {crate::path::ValuePath, thiserror::Error};

/// A schema that cannot be represented as a config file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("empty value path")]
    EmptyPath,
    #[error("empty segment in value path {0:?}")]
    EmptySegment(String),
    #[error("duplicate schema path {0}")]
    DuplicatePath(ValuePath),
    #[error("schema path {value} collides with the folder prefix of {nested}")]
    PathConflict { value: ValuePath, nested: ValuePath },
}
