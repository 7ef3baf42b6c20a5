//! The PackURI value type: part names within an OPC package.
//!
//! Part names always begin with a forward slash and use forward slashes as
//! separators, per the Open Packaging Conventions specification.

use crate::opc::error::{OpcError, Result};

/// The pseudo-partname of the package itself.
pub const PACKAGE_URI: &str = "/";

/// The partname of the content types stream.
pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";

/// A part name within an OPC package, e.g. `/ppt/slides/slide1.xml`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackURI {
    uri: String,
}

impl PackURI {
    /// Create a new PackURI from a string.
    ///
    /// Fails when the string does not begin with a forward slash.
    pub fn new<S: Into<String>>(uri: S) -> Result<Self> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(OpcError::InvalidPackUri(format!(
                "partname must begin with slash, got '{uri}'"
            )));
        }
        Ok(PackURI { uri })
    }

    /// Resolve a relative reference (like `../slideLayouts/slideLayout1.xml`)
    /// against a base URI (like `/ppt/slides`) into an absolute PackURI.
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self> {
        let mut segments: Vec<&str> = base_uri.split('/').filter(|s| !s.is_empty()).collect();
        for seg in relative_ref.split('/') {
            match seg {
                "" | "." => {},
                ".." => {
                    segments.pop();
                },
                other => segments.push(other),
            }
        }
        Self::new(format!("/{}", segments.join("/")))
    }

    /// The directory portion, e.g. `/ppt/slides` for `/ppt/slides/slide1.xml`.
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// The filename portion, e.g. `slide1.xml`.
    pub fn filename(&self) -> &str {
        match self.uri.rfind('/') {
            Some(pos) => &self.uri[pos + 1..],
            None => "",
        }
    }

    /// The extension without the leading period, e.g. `xml`.
    pub fn ext(&self) -> &str {
        match self.filename().rfind('.') {
            Some(pos) => &self.filename()[pos + 1..],
            None => "",
        }
    }

    /// The numeric suffix for tuple partnames, e.g. `21` for
    /// `/ppt/slides/slide21.xml`; `None` for singleton partnames.
    pub fn idx(&self) -> Option<u32> {
        let stem = match self.filename().rfind('.') {
            Some(pos) => &self.filename()[..pos],
            None => self.filename(),
        };
        let digits = stem.trim_end_matches(|c: char| !c.is_ascii_digit());
        let start = digits.rfind(|c: char| !c.is_ascii_digit()).map_or(0, |p| p + 1);
        if start == 0 || start >= digits.len() {
            return None;
        }
        digits[start..].parse().ok()
    }

    /// The zip membername: the URI with its leading slash stripped.
    pub fn membername(&self) -> &str {
        if self.uri == PACKAGE_URI { "" } else { &self.uri[1..] }
    }

    /// The partname of the `.rels` stream for this part, e.g.
    /// `/ppt/slides/_rels/slide1.xml.rels`.
    pub fn rels_uri(&self) -> Result<PackURI> {
        if self.uri == PACKAGE_URI {
            return PackURI::new("/_rels/.rels");
        }
        PackURI::new(format!("{}/_rels/{}.rels", self.base_uri(), self.filename()))
    }

    /// The relative reference from `base_uri` to this partname, e.g.
    /// `../slideLayouts/slideLayout1.xml` from `/ppt/slides`.
    pub fn relative_ref(&self, base_uri: &str) -> String {
        if base_uri == "/" {
            return self.membername().to_string();
        }
        let from: Vec<&str> = base_uri.split('/').filter(|s| !s.is_empty()).collect();
        let to: Vec<&str> = self.uri.split('/').filter(|s| !s.is_empty()).collect();
        let common = from.iter().zip(to.iter()).take_while(|(a, b)| a == b).count();

        let mut result = String::new();
        for _ in common..from.len() {
            result.push_str("../");
        }
        for (i, part) in to.iter().enumerate().skip(common) {
            if i > common {
                result.push('/');
            }
            result.push_str(part);
        }
        result
    }

    /// The full partname as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.uri
    }
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_relative_uri() {
        assert!(PackURI::new("ppt/presentation.xml").is_err());
    }

    #[test]
    fn test_components() {
        let uri = PackURI::new("/ppt/slides/slide21.xml").unwrap();
        assert_eq!(uri.base_uri(), "/ppt/slides");
        assert_eq!(uri.filename(), "slide21.xml");
        assert_eq!(uri.ext(), "xml");
        assert_eq!(uri.idx(), Some(21));
        assert_eq!(uri.membername(), "ppt/slides/slide21.xml");
    }

    #[test]
    fn test_from_rel_ref() {
        let uri = PackURI::from_rel_ref("/ppt/slides", "../slideLayouts/slideLayout1.xml").unwrap();
        assert_eq!(uri.as_str(), "/ppt/slideLayouts/slideLayout1.xml");

        let uri = PackURI::from_rel_ref("/", "ppt/presentation.xml").unwrap();
        assert_eq!(uri.as_str(), "/ppt/presentation.xml");
    }

    #[test]
    fn test_rels_uri() {
        let uri = PackURI::new("/ppt/presentation.xml").unwrap();
        assert_eq!(uri.rels_uri().unwrap().as_str(), "/ppt/_rels/presentation.xml.rels");

        let pkg = PackURI::new(PACKAGE_URI).unwrap();
        assert_eq!(pkg.rels_uri().unwrap().as_str(), "/_rels/.rels");
    }

    #[test]
    fn test_relative_ref() {
        let uri = PackURI::new("/ppt/slideLayouts/slideLayout1.xml").unwrap();
        assert_eq!(uri.relative_ref("/ppt/slides"), "../slideLayouts/slideLayout1.xml");
        assert_eq!(uri.relative_ref("/"), "ppt/slideLayouts/slideLayout1.xml");
        assert_eq!(uri.relative_ref("/ppt"), "slideLayouts/slideLayout1.xml");
    }
}
