//! Crate-level error types.

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the presentation synthesis engine.
#[derive(Error, Debug)]
pub enum Error {
    /// OPC package error
    #[error("OPC error: {0}")]
    Opc(#[from] crate::opc::error::OpcError),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// Part not found
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// Invalid content type
    #[error("Invalid content type: expected {expected}, got {got}")]
    InvalidContentType { expected: String, got: String },

    /// Invalid format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Deck assembly failure
    #[error("Assembly error: {0}")]
    Assembly(String),

    /// Completion service failure
    #[error("Completion error: {0}")]
    Completion(String),

    /// Template fetch failure
    #[error("Template fetch error: {0}")]
    TemplateFetch(String),

    /// Blob upload failure
    #[error("Upload error: {0}")]
    Upload(String),

    /// Thumbnail rendering failure
    #[error("Render error: {0}")]
    Render(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}
