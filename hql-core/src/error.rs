//! Error types for hql-core.
//!
//! Minimal error types without any I/O or configuration dependencies.

use thiserror::Error;

/// HQL error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HqlError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid sort: {0}")]
    InvalidSort(String),

    #[error("Malformed query tree: {0}")]
    MalformedTree(String),
}

/// Result type for HQL operations
pub type HqlResult<T> = Result<T, HqlError>;

impl serde::Serialize for HqlError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
