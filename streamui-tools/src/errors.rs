//! Catalog validation errors.

use thiserror::Error;

/// A problem with the fixed tool catalog found at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Two entries share a name.
    #[error("Duplicate catalog tool name: {0}")]
    DuplicateName(String),

    /// A name does not map back to its entry.
    #[error("Catalog tool name does not round-trip: {0}")]
    NameMismatch(String),

    /// A parameter schema is not an object schema.
    #[error("Catalog tool '{0}' has a non-object parameter schema")]
    InvalidSchema(String),
}

/// Result type for catalog checks.
pub type CatalogResult<T> = Result<T, CatalogError>;
