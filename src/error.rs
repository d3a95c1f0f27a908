//! Unified error types for the character service.

use thiserror::Error;

/// Unified error type for the character service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Prometheus recorder could not be installed.
    #[error("metrics error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the character catalog operations.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Backing store is missing, unreadable or malformed.
    #[error("character data unavailable at {path}: {reason}")]
    DataUnavailable {
        /// Path of the backing store.
        path: String,
        /// What went wrong while reading or parsing it.
        reason: String,
    },

    /// Backing store parsed but holds no characters.
    #[error("character catalog is empty")]
    EmptyCatalog,

    /// No character with the requested id.
    #[error("character {id} not found")]
    NotFound {
        /// The requested id, as given by the caller.
        id: String,
    },
}

impl CatalogError {
    /// Whether the error is the caller's miss rather than a server fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ServiceError>;
