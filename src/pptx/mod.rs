//! PowerPoint (.pptx) presentation handling.
//!
//! Built on the OPC layer, this module provides the presentation-specific
//! parts the synthesis engine reads and mutates: the presentation part
//! (dimensions, slide list), slides, layouts and masters, shape-level
//! analysis, text-body rewriting, and the blank-deck scaffold.

pub mod package;
pub mod presentation;
pub mod scaffold;
pub mod shapes;
pub mod slide;
pub mod txbody;
pub(crate) mod xmlrw;

pub use package::Package;
pub use presentation::Presentation;
pub use shapes::{ShapeKind, TextShape};
pub use slide::LayoutRole;
