//! Open Packaging Conventions (OPC) implementation.
//!
//! The container substrate the presentation engine mutates: package
//! structure (parts, relationships), content-type management, and
//! ZIP-based physical packaging. Reading and writing are both supported
//! because deck assembly rewrites parts in place and re-serializes the
//! package.

pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod part;
pub mod rel;

// Re-export commonly used types
pub use error::OpcError;
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use part::Part;
pub use rel::{Relationship, Relationships};
