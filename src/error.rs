//! Error types returned by the builder, the statement layer and QRM.

use thiserror::Error;

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while building, serializing or executing a statement.
#[derive(Error, Debug)]
pub enum Error {
    /// A statement is structurally incomplete (e.g. a set operation with
    /// fewer than two branches).
    #[error("statement cannot be serialized: {0}")]
    Serialization(String),

    /// A single-record destination was given an empty result set.
    #[error("query returned no rows")]
    NoRows,

    /// A result column's value could not be assigned into the destination
    /// field.
    #[error("column {column:?} cannot be assigned to field of type {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
    },

    /// Surfaced verbatim from the database handle.
    #[error("driver error: {0}")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Malformed column name, ambiguous field match, or a destination shape
    /// QRM cannot interpret.
    #[error("mapping error: {0}")]
    Mapping(String),
}

impl Error {
    pub fn driver(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Driver(Box::new(err))
    }

    pub fn mapping(msg: impl Into<String>) -> Self {
        Self::Mapping(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}
