//! # Tool Crib FreeCAD format codec
//!
//! Persists `Library`/`Tool`/`Shape` entities in the directory layout
//! the host application's Path workbench uses:
//!
//! ```text
//! <base>/Bit/<tool-id>.fctb        one JSON document per tool
//! <base>/Library/<lib-id>.fctl     one JSON document per library
//! <base>/Shape/<name>.fcstd        one template archive per shape
//! <base>/Shape/<name>.svg          companion rendered preview
//! ```
//!
//! The format is adversarial to round-trip fidelity: numbers are
//! stored as locale-dependent, unit-bearing strings; tool ids are not
//! unique across libraries and must be reconciled per library; and the
//! set of serializable parameters is determined by the tool's shape
//! template. This crate reproduces all of those behaviors.

pub mod document;
pub mod serializer;
pub mod template;

pub use serializer::FcSerializer;
pub use template::{PropertyDescriptor, TemplateProperty};

/// Subdirectory holding tool documents
pub const TOOL_DIR: &str = "Bit";
/// Subdirectory holding library documents
pub const LIBRARY_DIR: &str = "Library";
/// Subdirectory holding shape template archives
pub const SHAPE_DIR: &str = "Shape";

/// Extension of tool documents
pub const TOOL_EXT: &str = "fctb";
/// Extension of library documents
pub const LIBRARY_EXT: &str = "fctl";
/// Extension of shape template archives
pub const SHAPE_EXT: &str = "fcstd";
/// Extension of the rendered shape preview
pub const SVG_EXT: &str = "svg";
