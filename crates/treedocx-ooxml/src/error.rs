//! Error types for OOXML operations and translation

use thiserror::Error;

/// Errors that can occur while building or translating a document
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// Error reading or writing the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Picture could not be decoded
    #[error("Image error for {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },

    /// Error from doctree loading or assembly
    #[error(transparent)]
    Core(#[from] treedocx_core::CoreError),

    /// Required file not found in archive
    #[error("Required file not found: {0}")]
    MissingFile(String),

    /// Invalid document structure
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),

    /// Template lacks styles the output cannot do without
    #[error("Template is missing required styles: {}", .0.join(", "))]
    MissingStyles(Vec<String>),

    /// Handle does not belong to this document
    #[error("Invalid {kind} handle: {index}")]
    InvalidHandle { kind: &'static str, index: usize },

    /// Merge region overlaps an existing merge or leaves the table
    #[error("Invalid cell span: {0}")]
    InvalidSpan(String),

    /// Node kind without a translation
    #[error("No translation for node kind '{0}'")]
    UnimplementedNode(String),

    /// A node's visit left the translator stacks changed
    #[error("Translator state unbalanced after '{kind}': {detail}")]
    UnbalancedState { kind: String, detail: String },

    /// Cell-producing node outside a table
    #[error("'{0}' found outside of a table")]
    MissingTable(String),
}

/// Result type for OOXML operations
pub type Result<T> = std::result::Result<T, OoxmlError>;
