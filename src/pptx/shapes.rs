//! Shape-level analysis of slide XML.
//!
//! Shapes are modeled as a closed set of kinds; only group shapes contain
//! other shapes. Text shapes are extracted as raw `<p:sp>` subtrees in
//! document order — an event scan sees shapes nested inside `<p:grpSp>`
//! the same way it sees top-level ones, which is exactly the recursive
//! descent the engine needs.

use crate::error::{Error, Result};
use crate::pptx::xmlrw;
use quick_xml::Reader;
use quick_xml::events::Event;

/// Shape kind enumeration over the presentation drawing vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// A text shape (p:sp)
    Text,
    /// A picture shape (p:pic)
    Picture,
    /// A graphic frame containing a table or chart (p:graphicFrame)
    GraphicFrame,
    /// A group shape (p:grpSp)
    Group,
    /// A connector shape (p:cxnSp)
    Connector,
    /// Unknown or unsupported shape type
    Unknown,
}

impl ShapeKind {
    /// Classify an element local name.
    pub fn from_tag(tag: &[u8]) -> Self {
        match tag {
            b"sp" => ShapeKind::Text,
            b"pic" => ShapeKind::Picture,
            b"graphicFrame" => ShapeKind::GraphicFrame,
            b"grpSp" => ShapeKind::Group,
            b"cxnSp" => ShapeKind::Connector,
            _ => ShapeKind::Unknown,
        }
    }
}

/// A text shape extracted from slide XML.
///
/// Holds the complete `<p:sp>` subtree and its document-order index among
/// all text shapes of the slide (groups included).
#[derive(Debug, Clone)]
pub struct TextShape {
    /// Raw XML bytes of the `<p:sp>` subtree
    xml: Vec<u8>,
    /// Document-order index among the slide's text shapes
    index: usize,
}

impl TextShape {
    /// Wrap a standalone `<p:sp>` subtree for analysis.
    pub fn from_sp_xml(xml: Vec<u8>) -> Self {
        Self { xml, index: 0 }
    }

    #[inline]
    pub fn xml(&self) -> &[u8] {
        &self.xml
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The placeholder role from `<p:ph type="...">`, e.g. "title",
    /// "ctrTitle", "subTitle", "body". A `<p:ph>` with no type attribute
    /// is a body placeholder.
    pub fn placeholder_role(&self) -> Option<String> {
        let mut reader = Reader::from_reader(&self.xml[..]);
        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    if e.local_name().as_ref() == b"ph" {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"type" {
                                return std::str::from_utf8(&attr.value)
                                    .ok()
                                    .map(|s| s.to_string());
                            }
                        }
                        return Some("body".to_string());
                    }
                },
                Ok(Event::Eof) => break,
                Err(_) => break,
                _ => {},
            }
        }
        None
    }

    /// Whether this shape is a title placeholder ("title" or "ctrTitle").
    pub fn is_title_placeholder(&self) -> bool {
        matches!(self.placeholder_role().as_deref(), Some("title") | Some("ctrTitle"))
    }

    /// Whether this shape is a subtitle placeholder.
    pub fn is_subtitle_placeholder(&self) -> bool {
        matches!(self.placeholder_role().as_deref(), Some("subTitle"))
    }

    /// Whether this shape is a body placeholder.
    pub fn is_body_placeholder(&self) -> bool {
        matches!(self.placeholder_role().as_deref(), Some("body"))
    }

    /// All text of the shape: runs concatenated within a paragraph,
    /// paragraphs joined with newlines. Tokens split across adjacent runs
    /// of one paragraph therefore still read as contiguous text.
    pub fn text(&self) -> Result<String> {
        Ok(self.paragraph_texts()?.join("\n"))
    }

    /// The text of each paragraph, in document order.
    pub fn paragraph_texts(&self) -> Result<Vec<String>> {
        let mut reader = Reader::from_reader(&self.xml[..]);
        let mut paragraphs = Vec::new();
        let mut current: Option<String> = None;
        let mut in_text = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"p" => current = Some(String::new()),
                    b"t" => in_text = true,
                    _ => {},
                },
                Ok(Event::Text(ref e)) if in_text => {
                    if let Some(para) = current.as_mut() {
                        let raw = std::str::from_utf8(e.as_ref())
                            .map_err(|e| Error::Xml(e.to_string()))?;
                        para.push_str(&crate::xmlutil::unescape_xml(raw));
                    }
                },
                Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                    b"p" => {
                        if let Some(para) = current.take() {
                            paragraphs.push(para);
                        }
                    },
                    b"t" => in_text = false,
                    _ => {},
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(e.to_string())),
                _ => {},
            }
        }

        Ok(paragraphs)
    }

    /// Whether any paragraph carries explicit bullet formatting
    /// (`<a:buChar>` or `<a:buAutoNum>` in its properties).
    pub fn has_bulleted_paragraph(&self) -> bool {
        let mut reader = Reader::from_reader(&self.xml[..]);
        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let name = e.local_name();
                    if name.as_ref() == b"buChar" || name.as_ref() == b"buAutoNum" {
                        return true;
                    }
                },
                Ok(Event::Eof) => break,
                Err(_) => break,
                _ => {},
            }
        }
        false
    }

    /// The shape's position and extent in EMUs, from `<a:off>`/`<a:ext>`,
    /// when present.
    pub fn frame(&self) -> Option<(i64, i64, i64, i64)> {
        let mut reader = Reader::from_reader(&self.xml[..]);
        let (mut x, mut y, mut cx, mut cy) = (None, None, None, None);
        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let name = e.local_name();
                    if name.as_ref() == b"off" {
                        for attr in e.attributes().flatten() {
                            let value = std::str::from_utf8(&attr.value)
                                .ok()
                                .and_then(|s| s.parse().ok());
                            match attr.key.as_ref() {
                                b"x" => x = value,
                                b"y" => y = value,
                                _ => {},
                            }
                        }
                    } else if name.as_ref() == b"ext" {
                        for attr in e.attributes().flatten() {
                            let value = std::str::from_utf8(&attr.value)
                                .ok()
                                .and_then(|s| s.parse().ok());
                            match attr.key.as_ref() {
                                b"cx" => cx = value,
                                b"cy" => cy = value,
                                _ => {},
                            }
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(_) => break,
                _ => {},
            }
        }
        match (x, y, cx, cy) {
            (Some(x), Some(y), Some(cx), Some(cy)) => Some((x, y, cx, cy)),
            _ => None,
        }
    }
}

/// Extract every `<p:sp>` subtree of a slide (or layout) in document
/// order. Shapes inside nested groups are included.
pub fn collect_text_shapes(xml: &[u8]) -> Result<Vec<TextShape>> {
    let mut reader = Reader::from_reader(xml);
    let mut shapes = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if ShapeKind::from_tag(e.local_name().as_ref()) == ShapeKind::Text {
                    let subtree = extract_subtree(&mut reader, e)?;
                    shapes.push(TextShape { xml: subtree, index: shapes.len() });
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {},
        }
    }

    Ok(shapes)
}

/// Re-serialize the subtree whose start tag was just consumed.
pub(crate) fn extract_subtree(
    reader: &mut Reader<&[u8]>,
    start: &quick_xml::events::BytesStart,
) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    xmlrw::push_start(&mut out, start);

    let mut depth = 1;
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                xmlrw::push_start(&mut out, e);
            },
            Ok(Event::End(ref e)) => {
                xmlrw::push_end(&mut out, e);
                depth -= 1;
                if depth == 0 {
                    return Ok(out);
                }
            },
            Ok(Event::Empty(ref e)) => {
                xmlrw::push_empty(&mut out, e);
            },
            Ok(Event::Text(ref e)) => {
                xmlrw::push_text(&mut out, e);
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {},
        }
    }

    Err(Error::Xml("unexpected end of shape XML".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE_XML: &[u8] = br#"<p:sld xmlns:p="p" xmlns:a="a"><p:cSld><p:spTree>
<p:sp><p:nvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:txBody><a:p><a:r><a:t>Heading</a:t></a:r></a:p></p:txBody></p:sp>
<p:grpSp><p:sp><p:nvSpPr><p:nvPr/></p:nvSpPr><p:txBody><a:p><a:pPr><a:buChar char="&#8226;"/></a:pPr><a:r><a:t>Grouped</a:t></a:r></a:p></p:txBody></p:sp></p:grpSp>
<p:pic><p:nvPicPr/></p:pic>
</p:spTree></p:cSld></p:sld>"#;

    #[test]
    fn test_collects_nested_shapes_in_order() {
        let shapes = collect_text_shapes(SLIDE_XML).unwrap();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].text().unwrap(), "Heading");
        assert_eq!(shapes[1].text().unwrap(), "Grouped");
        assert_eq!(shapes[1].index(), 1);
    }

    #[test]
    fn test_placeholder_role() {
        let shapes = collect_text_shapes(SLIDE_XML).unwrap();
        assert_eq!(shapes[0].placeholder_role().as_deref(), Some("title"));
        assert!(shapes[0].is_title_placeholder());
        assert_eq!(shapes[1].placeholder_role(), None);
    }

    #[test]
    fn test_bullet_detection() {
        let shapes = collect_text_shapes(SLIDE_XML).unwrap();
        assert!(!shapes[0].has_bulleted_paragraph());
        assert!(shapes[1].has_bulleted_paragraph());
    }

    #[test]
    fn test_shape_kind() {
        assert_eq!(ShapeKind::from_tag(b"sp"), ShapeKind::Text);
        assert_eq!(ShapeKind::from_tag(b"grpSp"), ShapeKind::Group);
        assert_eq!(ShapeKind::from_tag(b"pic"), ShapeKind::Picture);
        assert_eq!(ShapeKind::from_tag(b"cxnSp"), ShapeKind::Connector);
        assert_eq!(ShapeKind::from_tag(b"weird"), ShapeKind::Unknown);
    }
}
