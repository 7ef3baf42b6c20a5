//! Verbatim event re-serialization helpers.
//!
//! The mutation passes in this crate stream a part's XML with `quick-xml`
//! and write untouched events back out byte-for-byte. Attribute values and
//! text are carried in their original (still-escaped) form, so copying them
//! through verbatim preserves the document exactly.

use quick_xml::events::{BytesEnd, BytesStart, BytesText};

/// Append a start tag with its attributes.
pub fn push_start(out: &mut Vec<u8>, e: &BytesStart) {
    out.push(b'<');
    out.extend_from_slice(e.name().as_ref());
    for attr in e.attributes().flatten() {
        out.push(b' ');
        out.extend_from_slice(attr.key.as_ref());
        out.extend_from_slice(b"=\"");
        out.extend_from_slice(&attr.value);
        out.push(b'"');
    }
    out.push(b'>');
}

/// Append a self-closing tag with its attributes.
pub fn push_empty(out: &mut Vec<u8>, e: &BytesStart) {
    out.push(b'<');
    out.extend_from_slice(e.name().as_ref());
    for attr in e.attributes().flatten() {
        out.push(b' ');
        out.extend_from_slice(attr.key.as_ref());
        out.extend_from_slice(b"=\"");
        out.extend_from_slice(&attr.value);
        out.push(b'"');
    }
    out.extend_from_slice(b"/>");
}

/// Append an end tag.
pub fn push_end(out: &mut Vec<u8>, e: &BytesEnd) {
    out.extend_from_slice(b"</");
    out.extend_from_slice(e.name().as_ref());
    out.push(b'>');
}

/// Append a text node in its original escaped form.
pub fn push_text(out: &mut Vec<u8>, e: &BytesText) {
    out.extend_from_slice(e.as_ref());
}
