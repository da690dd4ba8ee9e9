//! Error types for doctree loading and assembly

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading doctrees, figure numbers or configuration
#[derive(Error, Debug)]
pub enum CoreError {
    /// Error reading a file
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed doctree or figure-number JSON
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Malformed configuration file
    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    /// No doctree exists for the requested document
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Configuration is well-formed but unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        CoreError::Json {
            path: path.into(),
            source,
        }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
