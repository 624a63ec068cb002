//! Error types for registry operations

use std::fmt;

/// Result type alias for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors that can occur while obtaining the connector list
///
/// Every variant is fatal for an aggregation cycle: without a registry there
/// is nothing to report on.
#[derive(Debug)]
pub enum RegistryError {
    /// The connector list could not be loaded at all
    Unavailable(String),

    /// The catalog was read but could not be parsed
    InvalidCatalog(String),

    /// Two descriptors share the same id
    DuplicateId(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Unavailable(msg) => write!(f, "connector registry unavailable: {}", msg),
            RegistryError::InvalidCatalog(msg) => {
                write!(f, "invalid connector catalog: {}", msg)
            }
            RegistryError::DuplicateId(id) => {
                write!(f, "duplicate connector id in registry: {}", id)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::InvalidCatalog(err.to_string())
    }
}

impl From<toml::de::Error> for RegistryError {
    fn from(err: toml::de::Error) -> Self {
        RegistryError::InvalidCatalog(err.to_string())
    }
}
