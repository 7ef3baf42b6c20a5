//! Relationship objects for OPC packages.
//!
//! Every part (and the package itself) may own a set of relationships to
//! other parts or to external resources, stored in a sibling `.rels` stream.

use crate::opc::error::{OpcError, Result};
use crate::opc::packuri::PackURI;
use quick_xml::Reader;
use quick_xml::events::Event;

/// Well-known relationship type URIs.
pub mod reltype {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
    pub const THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    pub const EXTENDED_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
}

/// A single relationship from a source part to a target.
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Relationship ID, e.g. "rId1"
    r_id: String,
    /// Relationship type URI
    reltype: String,
    /// Target reference: a relative part reference or an external URL
    target_ref: String,
    /// Base URI for resolving relative references
    base_uri: String,
    /// Whether the target is external to the package
    is_external: bool,
}

impl Relationship {
    pub fn new(
        r_id: String,
        reltype: String,
        target_ref: String,
        base_uri: String,
        is_external: bool,
    ) -> Self {
        Self { r_id, reltype, target_ref, base_uri, is_external }
    }

    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    /// The absolute target partname for an internal relationship.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external {
            return Err(OpcError::InvalidRelationship(
                "external relationship has no target partname".to_string(),
            ));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref)
    }
}

/// Collection of relationships owned by a single source.
///
/// Preserves insertion order so rewritten packages round-trip
/// deterministically.
#[derive(Debug, Clone)]
pub struct Relationships {
    /// Base URI for resolving relative references
    base_uri: String,
    /// Relationships in document order
    rels: Vec<Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new(base_uri: String) -> Self {
        Self { base_uri, rels: Vec::new() }
    }

    /// Parse a relationships collection from `.rels` stream XML.
    pub fn from_xml(base_uri: String, xml: &[u8]) -> Result<Self> {
        let mut rels = Self::new(base_uri);
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut r_id = String::new();
                        let mut reltype = String::new();
                        let mut target = String::new();
                        let mut external = false;
                        for attr in e.attributes().flatten() {
                            let value = String::from_utf8_lossy(&attr.value).into_owned();
                            match attr.key.as_ref() {
                                b"Id" => r_id = value,
                                b"Type" => reltype = value,
                                b"Target" => target = value,
                                b"TargetMode" => external = value == "External",
                                _ => {},
                            }
                        }
                        if !r_id.is_empty() {
                            rels.add_relationship(reltype, target, r_id, external);
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OpcError::Xml(e.to_string())),
                _ => {},
            }
        }

        Ok(rels)
    }

    /// Add a relationship with an explicit rId.
    pub fn add_relationship(
        &mut self,
        reltype: String,
        target_ref: String,
        r_id: String,
        is_external: bool,
    ) {
        self.rels.push(Relationship::new(
            r_id,
            reltype,
            target_ref,
            self.base_uri.clone(),
            is_external,
        ));
    }

    /// Add a relationship of `reltype` to `target_ref`, or return the
    /// existing one. Allocates the next free `rIdN` when adding.
    pub fn get_or_add(&mut self, reltype: &str, target_ref: &str) -> &Relationship {
        if let Some(pos) = self
            .rels
            .iter()
            .position(|r| r.reltype == reltype && r.target_ref == target_ref && !r.is_external)
        {
            return &self.rels[pos];
        }
        let r_id = self.next_rid();
        self.add_relationship(reltype.to_string(), target_ref.to_string(), r_id, false);
        self.rels.last().unwrap()
    }

    /// Next unused relationship ID of the form `rIdN`.
    pub fn next_rid(&self) -> String {
        let mut n = self.rels.len() as u32 + 1;
        loop {
            let candidate = format!("rId{n}");
            if !self.rels.iter().any(|r| r.r_id == candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Look up a relationship by ID.
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.r_id == r_id)
    }

    /// Remove a relationship by ID. Returns true when one was removed.
    pub fn remove(&mut self, r_id: &str) -> bool {
        let before = self.rels.len();
        self.rels.retain(|r| r.r_id != r_id);
        self.rels.len() != before
    }

    /// The first relationship of the given type, if any.
    pub fn rel_of_type(&self, reltype: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.reltype == reltype)
    }

    /// Iterate over relationships in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    /// Serialize to `.rels` stream XML.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.rels.len() * 128);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for rel in &self.rels {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                crate::xmlutil::escape_xml(&rel.r_id),
                crate::xmlutil::escape_xml(&rel.reltype),
                crate::xmlutil::escape_xml(&rel.target_ref),
            ));
            if rel.is_external {
                xml.push_str(r#" TargetMode="External""#);
            }
            xml.push_str("/>");
        }
        xml.push_str("</Relationships>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELS_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn test_parse_rels() {
        let rels = Relationships::from_xml("/ppt/slides".to_string(), RELS_XML).unwrap();
        assert_eq!(rels.len(), 2);

        let layout = rels.get("rId1").unwrap();
        assert!(!layout.is_external());
        assert_eq!(
            layout.target_partname().unwrap().as_str(),
            "/ppt/slideLayouts/slideLayout1.xml"
        );

        let link = rels.get("rId2").unwrap();
        assert!(link.is_external());
        assert!(link.target_partname().is_err());
    }

    #[test]
    fn test_get_or_add_reuses_existing() {
        let mut rels = Relationships::from_xml("/ppt/slides".to_string(), RELS_XML).unwrap();
        let rid = rels.get_or_add(reltype::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml").r_id().to_string();
        assert_eq!(rid, "rId1");
        assert_eq!(rels.len(), 2);

        let rid = rels.get_or_add(reltype::SLIDE_LAYOUT, "../slideLayouts/slideLayout2.xml").r_id().to_string();
        assert_eq!(rid, "rId3");
        assert_eq!(rels.len(), 3);
    }

    #[test]
    fn test_roundtrip() {
        let rels = Relationships::from_xml("/ppt/slides".to_string(), RELS_XML).unwrap();
        let xml = rels.to_xml();
        let reparsed = Relationships::from_xml("/ppt/slides".to_string(), xml.as_bytes()).unwrap();
        assert_eq!(reparsed.len(), rels.len());
        assert!(xml.contains(r#"TargetMode="External""#));
    }
}
