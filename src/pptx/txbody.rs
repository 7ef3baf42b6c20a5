//! Text-body mutation: the kernel both assembly modes are built on.
//!
//! Three primitives cover everything the engine writes:
//!
//! - [`rebuild_paragraphs`] replaces the paragraph list of one `<p:sp>`
//!   subtree while preserving its non-text structure (`<a:bodyPr>`,
//!   `<a:lstStyle>`, shape properties, placeholder wiring),
//! - [`transform_text_shapes`] splices transformed `<p:sp>` subtrees back
//!   into a slide at their document-order positions,
//! - [`substitute_text_runs`] rewrites run text in place, preserving all
//!   run-level formatting.

use crate::error::{Error, Result};
use crate::pptx::shapes::extract_subtree;
use crate::pptx::xmlrw;
use crate::xmlutil::{escape_xml, unescape_xml};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fmt::Write as FmtWrite;

/// One paragraph to be written into a text body.
#[derive(Debug, Clone)]
pub struct ParagraphSpec {
    /// Paragraph text (a single run)
    pub text: String,
    /// `Some(true)` forces a bullet glyph, `Some(false)` forces none,
    /// `None` inherits the placeholder's own list style
    pub bullet: Option<bool>,
    /// Center the paragraph
    pub align_center: bool,
    /// Font size in hundredths of a point
    pub size: Option<u32>,
    /// Bold run
    pub bold: bool,
}

impl ParagraphSpec {
    /// A plain paragraph with an explicit size.
    pub fn plain(text: impl Into<String>, size: u32) -> Self {
        Self { text: text.into(), bullet: Some(false), align_center: false, size: Some(size), bold: false }
    }

    /// A bulleted paragraph with an explicit size.
    pub fn bulleted(text: impl Into<String>, size: u32) -> Self {
        Self { text: text.into(), bullet: Some(true), align_center: false, size: Some(size), bold: false }
    }

    /// A title paragraph: sized, bold, bullet style inherited.
    pub fn title(text: impl Into<String>, size: u32) -> Self {
        Self { text: text.into(), bullet: None, align_center: false, size: Some(size), bold: true }
    }

    /// A sized paragraph that inherits the placeholder's own list style.
    pub fn inherit(text: impl Into<String>, size: u32) -> Self {
        Self { text: text.into(), bullet: None, align_center: false, size: Some(size), bold: false }
    }

    pub fn centered(mut self) -> Self {
        self.align_center = true;
        self
    }

    /// Render as an `<a:p>` fragment.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(96 + self.text.len());
        xml.push_str("<a:p>");

        let needs_ppr = self.align_center || self.bullet.is_some();
        if needs_ppr {
            xml.push_str("<a:pPr");
            if let Some(true) = self.bullet {
                xml.push_str(r#" marL="285750" indent="-285750""#);
            }
            if self.align_center {
                xml.push_str(r#" algn="ctr""#);
            }
            match self.bullet {
                Some(true) => xml.push_str(r#"><a:buChar char="&#8226;"/></a:pPr>"#),
                Some(false) => xml.push_str("><a:buNone/></a:pPr>"),
                None => xml.push_str("/>"),
            }
        }

        xml.push_str("<a:r><a:rPr lang=\"en-US\"");
        if let Some(size) = self.size {
            let _ = write!(xml, r#" sz="{size}""#);
        }
        if self.bold {
            xml.push_str(r#" b="1""#);
        }
        let _ = write!(xml, r#" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#, escape_xml(&self.text));
        xml
    }
}

/// Replace the paragraph list of an `<p:sp>` subtree.
///
/// `<a:bodyPr>` and `<a:lstStyle>` are carried through; every existing
/// `<a:p>` is dropped and the given paragraphs written in their place. An
/// empty paragraph list clears the body (a text body keeps one empty
/// `<a:p>`, which the format requires).
pub fn rebuild_paragraphs(sp_xml: &[u8], paragraphs: &[ParagraphSpec]) -> Result<Vec<u8>> {
    let mut reader = Reader::from_reader(sp_xml);
    let mut out = Vec::with_capacity(sp_xml.len() + paragraphs.len() * 96);
    let mut in_txbody = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.local_name();
                if name.as_ref() == b"txBody" {
                    in_txbody = true;
                    xmlrw::push_start(&mut out, e);
                } else if in_txbody && name.as_ref() == b"p" {
                    // Drop the original paragraph wholesale
                    skip_subtree(&mut reader)?;
                } else {
                    xmlrw::push_start(&mut out, e);
                }
            },
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"txBody" {
                    in_txbody = false;
                    if paragraphs.is_empty() {
                        out.extend_from_slice(b"<a:p/>");
                    } else {
                        for para in paragraphs {
                            out.extend_from_slice(para.to_xml().as_bytes());
                        }
                    }
                }
                xmlrw::push_end(&mut out, e);
            },
            Ok(Event::Empty(ref e)) => {
                if !(in_txbody && e.local_name().as_ref() == b"p") {
                    xmlrw::push_empty(&mut out, e);
                }
            },
            Ok(Event::Text(ref e)) => xmlrw::push_text(&mut out, e),
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {},
        }
    }

    Ok(out)
}

/// Walk a slide's text shapes in document order, splicing in replacements.
///
/// The callback receives each `<p:sp>` subtree and its index; returning
/// `Some(bytes)` substitutes those bytes for the subtree, `None` keeps the
/// original.
pub fn transform_text_shapes<F>(slide_xml: &[u8], mut f: F) -> Result<Vec<u8>>
where
    F: FnMut(usize, &[u8]) -> Result<Option<Vec<u8>>>,
{
    let mut reader = Reader::from_reader(slide_xml);
    let mut out = Vec::with_capacity(slide_xml.len());
    let mut index = 0;

    loop {
        match reader.read_event() {
            Ok(Event::Decl(_)) => {
                out.extend_from_slice(
                    br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                );
            },
            Ok(Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"sp" {
                    let subtree = extract_subtree(&mut reader, e)?;
                    match f(index, &subtree)? {
                        Some(replacement) => out.extend_from_slice(&replacement),
                        None => out.extend_from_slice(&subtree),
                    }
                    index += 1;
                } else {
                    xmlrw::push_start(&mut out, e);
                }
            },
            Ok(Event::End(ref e)) => xmlrw::push_end(&mut out, e),
            Ok(Event::Empty(ref e)) => xmlrw::push_empty(&mut out, e),
            Ok(Event::Text(ref e)) => xmlrw::push_text(&mut out, e),
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {},
        }
    }

    Ok(out)
}

/// Rewrite the text of every `<a:t>` run in the document.
///
/// The callback gets the unescaped run text; returning `Some(new)` replaces
/// it, `None` leaves the run untouched. Run properties and everything else
/// pass through unchanged.
pub fn substitute_text_runs<F>(xml: &[u8], mut f: F) -> Result<Vec<u8>>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut reader = Reader::from_reader(xml);
    let mut out = Vec::with_capacity(xml.len());
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Decl(_)) => {
                out.extend_from_slice(
                    br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                );
            },
            Ok(Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text = true;
                }
                xmlrw::push_start(&mut out, e);
            },
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text = false;
                }
                xmlrw::push_end(&mut out, e);
            },
            Ok(Event::Empty(ref e)) => xmlrw::push_empty(&mut out, e),
            Ok(Event::Text(ref e)) => {
                if in_text {
                    let raw = std::str::from_utf8(e.as_ref())
                        .map_err(|e| Error::Xml(e.to_string()))?;
                    let text = unescape_xml(raw);
                    match f(&text) {
                        Some(new_text) => out.extend_from_slice(escape_xml(&new_text).as_bytes()),
                        None => xmlrw::push_text(&mut out, e),
                    }
                } else {
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

/// Consume events until the element whose start tag was just read closes.
fn skip_subtree(reader: &mut Reader<&[u8]>) -> Result<()> {
    let mut depth = 1;
    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            },
            Ok(Event::Eof) => return Err(Error::Xml("unterminated element".to_string())),
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {},
        }
    }
}
