//! Reading and writing OPC packages.
//!
//! `OpcPackage` holds an Open Packaging Conventions package in memory:
//! parts indexed by partname, package-level relationships, and the
//! content-type map needed to serialize everything back into a zip archive.

use crate::opc::constants::content_type as ct;
use crate::opc::error::{OpcError, Result};
use crate::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::opc::part::Part;
use crate::opc::rel::{Relationships, reltype};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// An OPC package held in memory.
///
/// Parts are kept in insertion order so that re-serializing an unchanged
/// package is deterministic.
pub struct OpcPackage {
    /// Package-level relationships (`/_rels/.rels`)
    rels: Relationships,
    /// Parts in document order
    parts: Vec<Part>,
    /// Partname -> index into `parts`
    index: HashMap<String, usize>,
}

impl OpcPackage {
    /// Create a new empty package.
    pub fn new() -> Self {
        Self {
            rels: Relationships::new(PACKAGE_URI.to_string()),
            parts: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Read a package from zip archive bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;

        // First pass: read every member into (membername, blob)
        let mut members: Vec<(String, Vec<u8>)> = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut blob = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut blob)?;
            members.push((name, blob));
        }

        let content_types = members
            .iter()
            .find(|(name, _)| name == "[Content_Types].xml")
            .map(|(_, blob)| ContentTypeMap::from_xml(blob))
            .transpose()?
            .ok_or_else(|| OpcError::PartNotFound("[Content_Types].xml".to_string()))?;

        let mut package = Self::new();

        // Relationship streams are attached to their source part below
        let mut rels_streams: HashMap<String, Vec<u8>> = HashMap::new();

        for (name, blob) in members {
            if name == "[Content_Types].xml" {
                continue;
            }
            if name.ends_with(".rels") {
                rels_streams.insert(format!("/{name}"), blob);
                continue;
            }
            let partname = PackURI::new(format!("/{name}"))?;
            let content_type = content_types.lookup(&partname);
            package.push_part(Part::new(partname, content_type, blob));
        }

        if let Some(blob) = rels_streams.get("/_rels/.rels") {
            package.rels = Relationships::from_xml(PACKAGE_URI.to_string(), blob)?;
        }
        for part in &mut package.parts {
            let rels_uri = part.partname().rels_uri()?;
            if let Some(blob) = rels_streams.get(rels_uri.as_str()) {
                let rels = Relationships::from_xml(part.partname().base_uri().to_string(), blob)?;
                part.set_rels(rels);
            }
        }

        Ok(package)
    }

    /// Package-level relationships.
    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    /// Mutable package-level relationships.
    #[inline]
    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    /// The main document part, located through the officeDocument
    /// relationship of the package.
    pub fn main_part(&self) -> Result<&Part> {
        let rel = self
            .rels
            .rel_of_type(reltype::OFFICE_DOCUMENT)
            .ok_or_else(|| OpcError::PartNotFound("officeDocument relationship".to_string()))?;
        self.part(&rel.target_partname()?)
    }

    /// The partname of the main document part.
    pub fn main_partname(&self) -> Result<PackURI> {
        let rel = self
            .rels
            .rel_of_type(reltype::OFFICE_DOCUMENT)
            .ok_or_else(|| OpcError::PartNotFound("officeDocument relationship".to_string()))?;
        rel.target_partname()
    }

    /// Look up a part by partname.
    pub fn part(&self, partname: &PackURI) -> Result<&Part> {
        self.index
            .get(partname.as_str())
            .map(|&i| &self.parts[i])
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Look up a part mutably by partname.
    pub fn part_mut(&mut self, partname: &PackURI) -> Result<&mut Part> {
        let i = *self
            .index
            .get(partname.as_str())
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))?;
        Ok(&mut self.parts[i])
    }

    /// Whether a part with this partname exists.
    pub fn has_part(&self, partname: &PackURI) -> bool {
        self.index.contains_key(partname.as_str())
    }

    /// Add a part to the package. Replaces any part with the same partname.
    pub fn add_part(&mut self, part: Part) {
        if let Some(&i) = self.index.get(part.partname().as_str()) {
            self.parts[i] = part;
        } else {
            self.push_part(part);
        }
    }

    /// Remove a part by partname. Returns the removed part, if any.
    pub fn remove_part(&mut self, partname: &PackURI) -> Option<Part> {
        let i = self.index.remove(partname.as_str())?;
        let part = self.parts.remove(i);
        // Reindex everything after the removal point
        for (pos, p) in self.parts.iter().enumerate().skip(i) {
            self.index.insert(p.partname().as_str().to_string(), pos);
        }
        Some(part)
    }

    /// Iterate over parts in document order.
    pub fn iter_parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter()
    }

    /// The next free numeric suffix for a partname template such as
    /// `/ppt/slides/slide{}.xml`.
    pub fn next_partname_index(&self, base_uri: &str, stem: &str) -> u32 {
        let mut max = 0;
        for part in &self.parts {
            if part.partname().base_uri() == base_uri
                && part.partname().filename().starts_with(stem)
                && let Some(idx) = part.partname().idx()
            {
                max = max.max(idx);
            }
        }
        max + 1
    }

    /// Serialize the package into zip archive bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        // [Content_Types].xml first, as convention has it
        let cti = ContentTypeMap::from_package(self);
        writer.start_file(&CONTENT_TYPES_URI[1..], options)?;
        writer.write_all(cti.to_xml().as_bytes())?;

        // Package relationships
        writer.start_file("_rels/.rels", options)?;
        writer.write_all(self.rels.to_xml().as_bytes())?;

        // Parts and their relationships
        for part in &self.parts {
            writer.start_file(part.partname().membername(), options)?;
            writer.write_all(part.blob())?;

            if !part.rels().is_empty() {
                let rels_uri = part.partname().rels_uri()?;
                writer.start_file(rels_uri.membername(), options)?;
                writer.write_all(part.rels().to_xml().as_bytes())?;
            }
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }

    fn push_part(&mut self, part: Part) {
        self.index.insert(part.partname().as_str().to_string(), self.parts.len());
        self.parts.push(part);
    }
}

impl Default for OpcPackage {
    fn default() -> Self {
        Self::new()
    }
}

/// The `[Content_Types].xml` map: Default entries by extension and
/// Override entries by partname.
struct ContentTypeMap {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypeMap {
    fn new() -> Self {
        let mut defaults = HashMap::new();
        defaults.insert("rels".to_string(), ct::OPC_RELATIONSHIPS.to_string());
        defaults.insert("xml".to_string(), ct::XML.to_string());
        Self { defaults, overrides: HashMap::new() }
    }

    fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut map = Self { defaults: HashMap::new(), overrides: HashMap::new() };
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                    b"Default" => {
                        let mut ext = String::new();
                        let mut content_type = String::new();
                        for attr in e.attributes().flatten() {
                            let value = String::from_utf8_lossy(&attr.value).into_owned();
                            match attr.key.as_ref() {
                                b"Extension" => ext = value.to_ascii_lowercase(),
                                b"ContentType" => content_type = value,
                                _ => {},
                            }
                        }
                        map.defaults.insert(ext, content_type);
                    },
                    b"Override" => {
                        let mut partname = String::new();
                        let mut content_type = String::new();
                        for attr in e.attributes().flatten() {
                            let value = String::from_utf8_lossy(&attr.value).into_owned();
                            match attr.key.as_ref() {
                                b"PartName" => partname = value,
                                b"ContentType" => content_type = value,
                                _ => {},
                            }
                        }
                        map.overrides.insert(partname, content_type);
                    },
                    _ => {},
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OpcError::Xml(e.to_string())),
                _ => {},
            }
        }

        Ok(map)
    }

    fn from_package(package: &OpcPackage) -> Self {
        let mut map = Self::new();
        for part in package.iter_parts() {
            map.add_content_type(part.partname(), part.content_type());
        }
        map
    }

    fn lookup(&self, partname: &PackURI) -> String {
        if let Some(ct) = self.overrides.get(partname.as_str()) {
            return ct.clone();
        }
        self.defaults
            .get(&partname.ext().to_ascii_lowercase())
            .cloned()
            .unwrap_or_else(|| "application/octet-stream".to_string())
    }

    fn add_content_type(&mut self, partname: &PackURI, content_type: &str) {
        let ext = partname.ext().to_ascii_lowercase();
        if Self::is_default_content_type(&ext, content_type) {
            self.defaults.insert(ext, content_type.to_string());
        } else {
            self.overrides.insert(partname.to_string(), content_type.to_string());
        }
    }

    fn is_default_content_type(ext: &str, content_type: &str) -> bool {
        matches!(
            (ext, content_type),
            ("rels", ct::OPC_RELATIONSHIPS)
                | ("xml", ct::XML)
                | ("png", "image/png")
                | ("jpg", "image/jpeg")
                | ("jpeg", "image/jpeg")
                | ("gif", "image/gif")
                | ("emf", "image/x-emf")
                | ("wmf", "image/x-wmf")
        )
    }

    fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(4096);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );

        let mut exts: Vec<_> = self.defaults.keys().collect();
        exts.sort();
        for ext in exts {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                crate::xmlutil::escape_xml(ext),
                crate::xmlutil::escape_xml(&self.defaults[ext]),
            ));
        }

        let mut partnames: Vec<_> = self.overrides.keys().collect();
        partnames.sort();
        for partname in partnames {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                crate::xmlutil::escape_xml(partname),
                crate::xmlutil::escape_xml(&self.overrides[partname]),
            ));
        }

        xml.push_str("</Types>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_package() -> OpcPackage {
        let mut package = OpcPackage::new();
        let partname = PackURI::new("/ppt/presentation.xml").unwrap();
        package.add_part(Part::new(
            partname.clone(),
            ct::PML_PRESENTATION_MAIN.to_string(),
            b"<p:presentation/>".to_vec(),
        ));
        package.rels_mut().add_relationship(
            reltype::OFFICE_DOCUMENT.to_string(),
            "ppt/presentation.xml".to_string(),
            "rId1".to_string(),
            false,
        );
        package
    }

    #[test]
    fn test_roundtrip() {
        let package = minimal_package();
        let bytes = package.to_bytes().unwrap();

        let reread = OpcPackage::from_bytes(&bytes).unwrap();
        let main = reread.main_part().unwrap();
        assert_eq!(main.partname().as_str(), "/ppt/presentation.xml");
        assert_eq!(main.content_type(), ct::PML_PRESENTATION_MAIN);
        assert_eq!(main.blob(), b"<p:presentation/>");
    }

    #[test]
    fn test_remove_part_reindexes() {
        let mut package = minimal_package();
        let extra = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        package.add_part(Part::new(extra.clone(), ct::PML_SLIDE.to_string(), Vec::new()));

        let first = PackURI::new("/ppt/presentation.xml").unwrap();
        assert!(package.remove_part(&first).is_some());
        assert!(package.part(&extra).is_ok());
        assert!(package.part(&first).is_err());
    }

    #[test]
    fn test_next_partname_index() {
        let mut package = minimal_package();
        assert_eq!(package.next_partname_index("/ppt/slides", "slide"), 1);

        let slide = PackURI::new("/ppt/slides/slide7.xml").unwrap();
        package.add_part(Part::new(slide, ct::PML_SLIDE.to_string(), Vec::new()));
        assert_eq!(package.next_partname_index("/ppt/slides", "slide"), 8);
    }
}
