//! Slide, slide layout, and slide master XML accessors.

use crate::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};

/// The layout vocabulary the engine matches content plans against.
///
/// Parsed from the `type` attribute of `<p:sldLayout>`; the closed set is
/// what slide construction actually dispatches on, anything else is carried
/// through as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutRole {
    /// Cover layout ("title")
    Title,
    /// Title plus content body ("obj", "tx", "txAndObj" and friends)
    TitleAndContent,
    /// Title only ("titleOnly")
    TitleOnly,
    /// Section header ("secHead")
    SectionHeader,
    /// Blank ("blank")
    Blank,
    /// Any other layout type attribute value
    Other(String),
}

impl LayoutRole {
    /// Parse from the `<p:sldLayout type="...">` attribute value.
    pub fn from_type_attr(value: &str) -> Self {
        match value {
            "title" | "ctrTitle" => LayoutRole::Title,
            "obj" | "tx" | "txAndObj" | "objAndTx" | "twoObj" | "objTx" => {
                LayoutRole::TitleAndContent
            },
            "titleOnly" => LayoutRole::TitleOnly,
            "secHead" => LayoutRole::SectionHeader,
            "blank" => LayoutRole::Blank,
            other => LayoutRole::Other(other.to_string()),
        }
    }

    /// The uppercase name used in prompts and content plans.
    pub fn as_plan_str(&self) -> &str {
        match self {
            LayoutRole::Title => "TITLE",
            LayoutRole::TitleAndContent => "TITLE_AND_CONTENT",
            LayoutRole::TitleOnly => "TITLE_ONLY",
            LayoutRole::SectionHeader => "SECTION_HEADER",
            LayoutRole::Blank => "BLANK",
            LayoutRole::Other(s) => s,
        }
    }

    /// Case-insensitive match against a plan string such as
    /// "TITLE_AND_CONTENT".
    pub fn matches(&self, plan: &str) -> bool {
        self.as_plan_str().eq_ignore_ascii_case(plan)
    }
}

/// The `name` attribute of the `<p:cSld>` element, used by slides, layouts
/// and masters alike.
pub fn csld_name(xml: &[u8]) -> Result<String> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"cSld" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"name" {
                            let name = std::str::from_utf8(&attr.value)
                                .map_err(|e| Error::Xml(e.to_string()))?;
                            return Ok(crate::xmlutil::unescape_xml(name));
                        }
                    }
                    return Ok(String::new());
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {},
        }
    }

    Ok(String::new())
}

/// The layout role of a layout part, from `<p:sldLayout type="...">`.
/// Layouts without a type attribute have no role.
pub fn layout_role(xml: &[u8]) -> Result<Option<LayoutRole>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"sldLayout" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"type" {
                            let value = std::str::from_utf8(&attr.value)
                                .map_err(|e| Error::Xml(e.to_string()))?;
                            return Ok(Some(LayoutRole::from_type_attr(value)));
                        }
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

/// Relationship IDs of the layouts declared in a master's
/// `<p:sldLayoutIdLst>`.
pub fn master_layout_rids(xml: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut rids = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"sldLayoutId" {
                    for attr in e.attributes().flatten() {
                        if attr.key.local_name().as_ref() == b"id" && attr.key.as_ref() != b"id" {
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

/// Extract all text content from `<a:t>` elements, newline-separated.
pub fn extract_text(xml: &[u8]) -> Result<String> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut text = String::new();
    let mut in_text_element = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_element = true;
                }
            },
            Ok(Event::Text(ref e)) if in_text_element => {
                let t = std::str::from_utf8(e.as_ref()).map_err(|e| Error::Xml(e.to_string()))?;
                if !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
                text.push_str(&crate::xmlutil::unescape_xml(t));
            },
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_element = false;
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {},
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_role_vocabulary() {
        assert_eq!(LayoutRole::from_type_attr("title"), LayoutRole::Title);
        assert_eq!(LayoutRole::from_type_attr("obj"), LayoutRole::TitleAndContent);
        assert_eq!(LayoutRole::from_type_attr("titleOnly"), LayoutRole::TitleOnly);
        assert_eq!(
            LayoutRole::from_type_attr("vertTx"),
            LayoutRole::Other("vertTx".to_string())
        );

        assert!(LayoutRole::Title.matches("title"));
        assert!(LayoutRole::TitleAndContent.matches("TITLE_AND_CONTENT"));
        assert!(!LayoutRole::TitleOnly.matches("TITLE"));
    }

    #[test]
    fn test_csld_name_and_role() {
        let xml = br#"<p:sldLayout xmlns:p="ns" type="obj"><p:cSld name="Title and Content"/></p:sldLayout>"#;
        assert_eq!(csld_name(xml).unwrap(), "Title and Content");
        assert_eq!(layout_role(xml).unwrap(), Some(LayoutRole::TitleAndContent));
    }

    #[test]
    fn test_extract_text() {
        let xml = br#"<p:sld><p:sp><a:t>Hello</a:t></p:sp><p:sp><a:t>World &amp; more</a:t></p:sp></p:sld>"#;
        assert_eq!(extract_text(xml).unwrap(), "Hello\nWorld & more");
    }
}
