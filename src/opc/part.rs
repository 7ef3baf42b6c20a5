//! Package parts: the fundamental units of content in an OPC package.

use crate::opc::error::{OpcError, Result};
use crate::opc::packuri::PackURI;
use crate::opc::rel::Relationships;

/// A part within an OPC package.
///
/// Each part has a unique partname, a content type, a binary blob, and may
/// own relationships to other parts. Unlike a read-only parser, the blob is
/// replaceable: deck assembly rewrites part XML in place.
#[derive(Debug, Clone)]
pub struct Part {
    /// The partname (URI) of this part
    partname: PackURI,
    /// The content type of this part
    content_type: String,
    /// The binary content of this part
    blob: Vec<u8>,
    /// Relationships from this part to other parts
    rels: Relationships,
}

impl Part {
    /// Create a new part with no relationships.
    pub fn new(partname: PackURI, content_type: String, blob: Vec<u8>) -> Self {
        let rels = Relationships::new(partname.base_uri().to_string());
        Self { partname, content_type, blob, rels }
    }

    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    #[inline]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[inline]
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    /// Replace the binary content of this part.
    pub fn set_blob(&mut self, blob: Vec<u8>) {
        self.blob = blob;
    }

    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    #[inline]
    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    /// Replace the relationships wholesale (used when cloning a part under
    /// a new partname with the same base URI).
    pub fn set_rels(&mut self, rels: Relationships) {
        self.rels = rels;
    }

    /// Add or reuse a relationship to another part, returning its rId.
    pub fn relate_to(&mut self, target: &PackURI, reltype: &str) -> String {
        let target_ref = target.relative_ref(self.partname.base_uri());
        self.rels.get_or_add(reltype, &target_ref).r_id().to_string()
    }

    /// The target reference for a relationship ID.
    pub fn target_ref(&self, r_id: &str) -> Result<&str> {
        self.rels
            .get(r_id)
            .map(|rel| rel.target_ref())
            .ok_or_else(|| OpcError::RelationshipNotFound(format!("rId: {r_id}")))
    }

    /// The absolute partname a relationship ID points at.
    pub fn target_partname(&self, r_id: &str) -> Result<PackURI> {
        self.rels
            .get(r_id)
            .ok_or_else(|| OpcError::RelationshipNotFound(format!("rId: {r_id}")))?
            .target_partname()
    }
}
