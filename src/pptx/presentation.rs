//! The presentation part: dimensions, slide and master lists, and the
//! slide-list mutations deck assembly relies on.

use crate::error::{Error, Result};
use crate::opc::constants::content_type as ct;
use crate::opc::rel::reltype;
use crate::opc::{OpcPackage, PackURI, Part, Relationships};
use crate::pptx::xmlrw;
use quick_xml::Reader;
use quick_xml::events::Event;

/// English Metric Units per pixel at 96 dpi.
pub const EMU_PER_PX: i64 = 9525;

/// Read-side view over the main presentation part.
///
/// Not intended to be constructed directly; use `Package::presentation()`.
pub struct Presentation<'a> {
    /// The main presentation part
    part: &'a Part,
    /// The containing package, for resolving related parts
    package: &'a OpcPackage,
}

impl<'a> Presentation<'a> {
    pub(crate) fn open(package: &'a OpcPackage) -> Result<Self> {
        let part = package
            .main_part()
            .map_err(|e| Error::PartNotFound(format!("main presentation part: {e}")))?;
        Ok(Self { part, package })
    }

    /// Slide dimensions in pixels, from `<p:sldSz>`. `None` when the
    /// element is absent.
    pub fn page_size(&self) -> Result<Option<(u32, u32)>> {
        let mut reader = Reader::from_reader(self.part.blob());
        reader.config_mut().trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    if e.local_name().as_ref() == b"sldSz" {
                        let mut cx: i64 = 0;
                        let mut cy: i64 = 0;
                        for attr in e.attributes().flatten() {
                            let value = std::str::from_utf8(&attr.value)
                                .ok()
                                .and_then(|s| s.parse().ok())
                                .unwrap_or(0);
                            match attr.key.as_ref() {
                                b"cx" => cx = value,
                                b"cy" => cy = value,
                                _ => {},
                            }
                        }
                        if cx > 0 && cy > 0 {
                            return Ok(Some((
                                (cx / EMU_PER_PX) as u32,
                                (cy / EMU_PER_PX) as u32,
                            )));
                        }
                        return Ok(None);
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(e.to_string())),
                _ => {},
            }
        }

        Ok(None)
    }

    /// Relationship IDs of all slides, in presentation order.
    pub fn slide_rids(&self) -> Result<Vec<String>> {
        rids_of(self.part.blob(), b"sldId")
    }

    /// Relationship IDs of all slide masters.
    pub fn master_rids(&self) -> Result<Vec<String>> {
        rids_of(self.part.blob(), b"sldMasterId")
    }

    /// Partnames of all slides, in presentation order.
    pub fn slide_partnames(&self) -> Result<Vec<PackURI>> {
        self.slide_rids()?
            .iter()
            .map(|rid| Ok(self.part.target_partname(rid)?))
            .collect()
    }

    /// Partnames of all slide masters.
    pub fn master_partnames(&self) -> Result<Vec<PackURI>> {
        self.master_rids()?
            .iter()
            .map(|rid| Ok(self.part.target_partname(rid)?))
            .collect()
    }

    /// The underlying presentation part.
    #[inline]
    pub fn part(&self) -> &'a Part {
        self.part
    }

    /// The containing package.
    #[inline]
    pub fn package(&self) -> &'a OpcPackage {
        self.package
    }
}

/// Collect `r:id` attributes of the named list-entry element, in document
/// order.
fn rids_of(xml: &[u8], element: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut rids = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == element {
                    for attr in e.attributes().flatten() {
                        if attr.key.local_name().as_ref() == b"id"
                            && attr.key.as_ref() != b"id"
                        {
                            // r:id (namespaced); the bare id attribute is the
                            // slide id number, not a relationship
                            let rid = std::str::from_utf8(&attr.value)
                                .map_err(|e| Error::Xml(e.to_string()))?;
                            if rid.starts_with("rId") {
                                rids.push(rid.to_string());
                            }
                        }
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {},
        }
    }

    Ok(rids)
}

/// Remove every slide from the package: the `<p:sldId>` entries, the
/// presentation-part relationships, and the slide parts themselves.
///
/// Returns the removed slide partnames in their original order.
pub fn remove_all_slides(opc: &mut OpcPackage) -> Result<Vec<PackURI>> {
    let pres_partname = opc.main_partname().map_err(Error::Opc)?;

    let (rids, partnames) = {
        let pres = Presentation::open(opc)?;
        let rids = pres.slide_rids()?;
        let partnames = pres.slide_partnames()?;
        (rids, partnames)
    };

    for partname in &partnames {
        opc.remove_part(partname);
    }

    let pres_part = opc.part_mut(&pres_partname)?;
    for rid in &rids {
        pres_part.rels_mut().remove(rid);
    }
    let cleared = clear_slide_id_list(pres_part.blob())?;
    pres_part.set_blob(cleared);

    Ok(partnames)
}

/// Append a slide built from XML and relationships, wiring up the part,
/// the presentation relationship, and the `<p:sldId>` entry.
///
/// Returns the new slide's partname.
pub fn append_slide(
    opc: &mut OpcPackage,
    slide_xml: Vec<u8>,
    rels: Relationships,
) -> Result<PackURI> {
    let pres_partname = opc.main_partname().map_err(Error::Opc)?;

    let index = opc.next_partname_index("/ppt/slides", "slide");
    let partname = PackURI::new(format!("/ppt/slides/slide{index}.xml")).map_err(Error::Opc)?;

    let mut part = Part::new(partname.clone(), ct::PML_SLIDE.to_string(), slide_xml);
    part.set_rels(rels);
    opc.add_part(part);

    let pres_part = opc.part_mut(&pres_partname)?;
    let rid = pres_part.relate_to(&partname, reltype::SLIDE);
    let slide_id = next_slide_id(pres_part.blob())?;
    let appended = append_slide_id(pres_part.blob(), slide_id, &rid)?;
    pres_part.set_blob(appended);

    Ok(partname)
}

/// Slide ids must be unique and at least 256.
fn next_slide_id(xml: &[u8]) -> Result<u32> {
    let mut reader = Reader::from_reader(xml);
    let mut max = 255;
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"sldId" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"id"
                            && let Some(id) = std::str::from_utf8(&attr.value)
                                .ok()
                                .and_then(|s| s.parse::<u32>().ok())
                        {
                            max = max.max(id);
                        }
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {},
        }
    }
    Ok(max + 1)
}

/// Rewrite presentation XML with an emptied `<p:sldIdLst/>`.
fn clear_slide_id_list(xml: &[u8]) -> Result<Vec<u8>> {
    rewrite_slide_id_list(xml, None)
}

/// Rewrite presentation XML with one `<p:sldId>` appended to the list.
fn append_slide_id(xml: &[u8], slide_id: u32, rid: &str) -> Result<Vec<u8>> {
    let entry = format!(
        r#"<p:sldId id="{slide_id}" r:id="{}"/>"#,
        crate::xmlutil::escape_xml(rid)
    );
    rewrite_slide_id_list(xml, Some(entry.as_bytes()))
}

/// Stream the presentation XML through, either emptying the slide-id list
/// (`append = None`) or appending one entry to it. Creates the list after
/// the master list when the document has none.
fn rewrite_slide_id_list(xml: &[u8], append: Option<&[u8]>) -> Result<Vec<u8>> {
    // The list element is seen after the master list in stream order, so
    // whether to synthesize one must be known up front
    let has_list = memchr::memmem::find(xml, b"sldIdLst").is_some();

    let mut reader = Reader::from_reader(xml);
    let mut out = Vec::with_capacity(xml.len() + 64);
    let mut in_list = false;

    loop {
        match reader.read_event() {
            Ok(Event::Decl(_)) => {
                out.extend_from_slice(
                    br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                );
            },
            Ok(Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"sldIdLst" {
                    in_list = true;
                    xmlrw::push_start(&mut out, e);
                } else if in_list && append.is_none() {
                    // Skip entries wholesale while clearing
                    let mut depth = 1;
                    loop {
                        match reader.read_event() {
                            Ok(Event::Start(_)) => depth += 1,
                            Ok(Event::End(_)) => {
                                depth -= 1;
                                if depth == 0 {
                                    break;
                                }
                            },
                            Ok(Event::Eof) => {
                                return Err(Error::Xml("unterminated sldId entry".to_string()));
                            },
                            Err(e) => return Err(Error::Xml(e.to_string())),
                            _ => {},
                        }
                    }
                } else {
                    xmlrw::push_start(&mut out, e);
                }
            },
            Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"sldIdLst" {
                    // Expand the empty element so content can be carried
                    xmlrw::push_start(&mut out, e);
                    if let Some(entry) = append {
                        out.extend_from_slice(entry);
                    }
                    out.extend_from_slice(b"</p:sldIdLst>");
                } else if in_list && append.is_none() {
                    // Dropped while clearing
                } else {
                    xmlrw::push_empty(&mut out, e);
                }
            },
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"sldIdLst" {
                    in_list = false;
                    if let Some(entry) = append {
                        out.extend_from_slice(entry);
                    }
                    xmlrw::push_end(&mut out, e);
                } else if e.local_name().as_ref() == b"sldMasterIdLst" && !has_list {
                    // No slide list in the document: create it here so
                    // element order stays schema-valid
                    xmlrw::push_end(&mut out, e);
                    out.extend_from_slice(b"<p:sldIdLst>");
                    if let Some(entry) = append {
                        out.extend_from_slice(entry);
                    }
                    out.extend_from_slice(b"</p:sldIdLst>");
                } else {
                    xmlrw::push_end(&mut out, e);
                }
            },
            Ok(Event::Text(ref e)) => {
                if !in_list {
                    xmlrw::push_text(&mut out, e);
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {},
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRES_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst><p:sldSz cx="12192000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#;

    #[test]
    fn test_rids_of() {
        assert_eq!(rids_of(PRES_XML, b"sldId").unwrap(), vec!["rId2", "rId3"]);
        assert_eq!(rids_of(PRES_XML, b"sldMasterId").unwrap(), vec!["rId1"]);
    }

    #[test]
    fn test_clear_slide_id_list() {
        let cleared = clear_slide_id_list(PRES_XML).unwrap();
        assert_eq!(rids_of(&cleared, b"sldId").unwrap(), Vec::<String>::new());
        // Master list and slide size survive
        assert_eq!(rids_of(&cleared, b"sldMasterId").unwrap(), vec!["rId1"]);
        let text = String::from_utf8(cleared).unwrap();
        assert!(text.contains("sldSz"));
    }

    #[test]
    fn test_append_slide_id() {
        let cleared = clear_slide_id_list(PRES_XML).unwrap();
        let next = next_slide_id(&cleared).unwrap();
        assert_eq!(next, 256);

        let appended = append_slide_id(&cleared, next, "rId9").unwrap();
        assert_eq!(rids_of(&appended, b"sldId").unwrap(), vec!["rId9"]);
        assert_eq!(next_slide_id(&appended).unwrap(), 257);
    }

    #[test]
    fn test_next_slide_id_counts_existing() {
        assert_eq!(next_slide_id(PRES_XML).unwrap(), 258);
    }
}
