//! Top-level error type.

use rust_xlsxwriter::XlsxError;
use thiserror::Error;

/// Errors raised while planning or writing a table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Record type is not an aggregate with named fields.
    #[error("not struct type: {0}")]
    NotStructType(&'static str),

    /// Predicate name resolves to neither an instance method nor a registry entry.
    #[error("unknown predicate method: '{0}'")]
    UnknownPredicate(String),

    /// Predicate cannot be called with the field value.
    #[error("invalid predicate method '{name}': {reason}")]
    InvalidPredicate {
        /// Predicate name.
        name: String,
        /// Why the call was rejected.
        reason: String,
    },

    /// Malformed cell reference or coordinate out of sheet bounds.
    #[error("invalid cell: {0}")]
    InvalidCell(String),

    /// Output sink failure.
    #[error("sink error: {0}")]
    Sink(String),
}

impl From<XlsxError> for TableError {
    fn from(err: XlsxError) -> Self {
        Self::Sink(format!("xlsx write error: {err}"))
    }
}

/// Crate result alias.
pub type Result<T, E = TableError> = std::result::Result<T, E>;
