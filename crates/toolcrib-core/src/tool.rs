//! Cutting tool definitions
//!
//! A tool is a named instance of a shape template. Tool identity is a
//! store-wide unique string id, independent of any library the tool
//! appears in; equality and hashing follow the id, never the label.

use crate::shape::Shape;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Tool identifier. Host-written files may use arbitrary file stems as
/// ids, so this is an opaque string rather than a parsed UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ToolId(pub String);

impl ToolId {
    /// Mint a fresh unique id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ToolId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ToolId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A named cutting tool referencing exactly one shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    id: ToolId,
    label: String,
    shape: Shape,
    /// Not every tool is file-based.
    filename: Option<PathBuf>,
    /// The host format's numeric tool id within the library this tool
    /// was loaded from. Set by deserialization only.
    pocket: Option<u32>,
}

impl Tool {
    /// File format version written into tool documents
    pub const API_VERSION: u32 = 1;

    /// Create a tool with a freshly generated id
    pub fn new(label: impl Into<String>, shape: Shape) -> Self {
        Self::with_id(ToolId::generate(), label, shape)
    }

    /// Create a tool with a caller-supplied id
    pub fn with_id(id: ToolId, label: impl Into<String>, shape: Shape) -> Self {
        Self {
            id,
            label: label.into(),
            shape,
            filename: None,
            pocket: None,
        }
    }

    /// The tool's identity
    pub fn id(&self) -> &ToolId {
        &self.id
    }

    /// Human-readable label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Rename the tool. Identity is unaffected.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// The shape template this tool is an instance of
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Mutable access to the shape, for parameter edits
    pub fn shape_mut(&mut self) -> &mut Shape {
        &mut self.shape
    }

    /// The backing file, if the tool was loaded from one
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Record the backing file
    pub fn set_filename(&mut self, filename: impl Into<PathBuf>) {
        self.filename = Some(filename.into());
    }

    /// The host-format numeric id this tool had in the library it was
    /// deserialized from
    pub fn pocket(&self) -> Option<u32> {
        self.pocket
    }

    /// Stamp the host-format numeric id (set by the codec on decode)
    pub fn set_pocket(&mut self, pocket: u32) {
        self.pocket = Some(pocket);
    }
}

impl PartialEq for Tool {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Tool {}

impl Hash for Tool {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\" \"{}\"", self.id, self.label, self.shape.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_equality() {
        let a = Tool::with_id("t-1".into(), "3mm Endmill", Shape::new("endmill"));
        let mut b = Tool::with_id("t-1".into(), "3mm Endmill", Shape::new("endmill"));
        let c = Tool::with_id("t-2".into(), "3mm Endmill", Shape::new("endmill"));

        assert_eq!(a, b);
        assert_ne!(a, c);

        // Identity is stable across renames.
        b.set_label("3mm Upcut Endmill");
        assert_eq!(a, b);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = Tool::new("Drill", Shape::new("drill"));
        let b = Tool::new("Drill", Shape::new("drill"));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_pocket_unset_by_default() {
        let tool = Tool::new("Probe", Shape::new("probe"));
        assert!(tool.pocket().is_none());
    }
}
