//! Package implementation for PowerPoint presentations.

use crate::error::{Error, Result};
use crate::opc::OpcPackage;
use crate::opc::constants::content_type as ct;
use crate::pptx::presentation::Presentation;

/// A PowerPoint (.pptx) package.
///
/// This is the main entry point for working with presentation containers.
/// It wraps an OPC package and provides PowerPoint-specific functionality,
/// both reading and mutating.
pub struct Package {
    /// The underlying OPC package
    opc: OpcPackage,
}

impl Package {
    /// Open a .pptx package from archive bytes.
    ///
    /// Verifies that the main part carries a presentation content type
    /// (regular or macro-enabled).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let opc = OpcPackage::from_bytes(bytes)?;

        let main_part = opc
            .main_part()
            .map_err(|e| Error::PartNotFound(format!("main presentation part: {e}")))?;

        let content_type = main_part.content_type();
        if content_type != ct::PML_PRESENTATION_MAIN && content_type != ct::PML_PRES_MACRO_MAIN {
            return Err(Error::InvalidContentType {
                expected: format!("{} or {}", ct::PML_PRESENTATION_MAIN, ct::PML_PRES_MACRO_MAIN),
                got: content_type.to_string(),
            });
        }

        Ok(Self { opc })
    }

    /// Wrap an already-built OPC package without a content-type check.
    ///
    /// Used for scaffolded blank decks, which are constructed part by part.
    pub(crate) fn from_opc(opc: OpcPackage) -> Self {
        Self { opc }
    }

    /// Get the main presentation.
    pub fn presentation(&self) -> Result<Presentation<'_>> {
        Presentation::open(&self.opc)
    }

    /// Get the underlying OPC package.
    #[inline]
    pub fn opc(&self) -> &OpcPackage {
        &self.opc
    }

    /// Get mutable access to the underlying OPC package.
    #[inline]
    pub fn opc_mut(&mut self) -> &mut OpcPackage {
        &mut self.opc
    }

    /// Serialize the package into .pptx archive bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.opc.to_bytes()?)
    }
}
