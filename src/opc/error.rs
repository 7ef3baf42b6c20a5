//! Error types for OPC package operations.

use thiserror::Error;

/// Result type for OPC operations.
pub type Result<T> = std::result::Result<T, OpcError>;

/// Error types for OPC operations.
#[derive(Error, Debug)]
pub enum OpcError {
    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(String),

    /// Invalid pack URI
    #[error("Invalid pack URI: {0}")]
    InvalidPackUri(String),

    /// Part not found in package
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// Relationship not found
    #[error("Relationship not found: {0}")]
    RelationshipNotFound(String),

    /// Invalid relationship
    #[error("Invalid relationship: {0}")]
    InvalidRelationship(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for OpcError {
    fn from(err: zip::result::ZipError) -> Self {
        OpcError::Zip(err.to_string())
    }
}

impl From<quick_xml::Error> for OpcError {
    fn from(err: quick_xml::Error) -> Self {
        OpcError::Xml(err.to_string())
    }
}
