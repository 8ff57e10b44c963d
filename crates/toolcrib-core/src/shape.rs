//! Tool shape templates
//!
//! A shape describes the geometric template a tool is cut from and the
//! named parameters a tool of that template may carry. Shapes are
//! either builtin (shipped with the host application, identified by
//! name alone) or backed by a template file in the store.

use crate::units::Quantity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Shape names reserved for the host application's builtin templates.
/// Builtin shapes are never written to the store and are reconstructed
/// by name alone.
pub static RESERVED_SHAPES: &[&str] = &[
    "ballend",
    "bullnose",
    "chamfer",
    "drill",
    "endmill",
    "probe",
    "slittingsaw",
    "thread-mill",
    "v-bit",
];

/// A single typed tool parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    /// Whole-number parameter (flute count, pocket index)
    Integer(i64),
    /// Plain real-number parameter
    Real(f64),
    /// Free-text parameter (material, spindle direction)
    Text(String),
    /// Unit-bearing parameter (lengths, angles)
    Quantity(Quantity),
}

impl ParamValue {
    /// Numeric magnitude if the value carries one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Real(v) => Some(*v),
            Self::Quantity(q) => Some(q.value),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{}", v),
            Self::Real(v) => write!(f, "{}", v),
            Self::Text(v) => write!(f, "{}", v),
            Self::Quantity(q) => write!(f, "{}", q),
        }
    }
}

/// A tool geometry template with its current parameter values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    name: String,
    label: String,
    filename: Option<PathBuf>,
    params: BTreeMap<String, ParamValue>,
    #[serde(skip)]
    svg: Option<Vec<u8>>,
}

impl Shape {
    /// Create a shape identified by name alone (builtin or not yet
    /// backed by a file)
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            filename: None,
            params: BTreeMap::new(),
            svg: None,
        }
    }

    /// Create a shape backed by a template file
    pub fn from_file(name: impl Into<String>, filename: impl Into<PathBuf>) -> Self {
        let mut shape = Self::new(name);
        shape.filename = Some(filename.into());
        shape
    }

    /// The shape name (unique within the store's shape directory)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Set the human-readable label
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// The backing template file. Builtin shapes never have one.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Whether this shape is one of the host's builtin templates
    pub fn is_builtin(&self) -> bool {
        RESERVED_SHAPES.contains(&self.name.as_str())
    }

    /// Set a parameter value
    pub fn set_param(&mut self, name: impl Into<String>, value: ParamValue) {
        self.params.insert(name.into(), value);
    }

    /// Look up a parameter value
    pub fn get_param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Iterate over all parameters in name order
    pub fn params(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Attach the rendered preview image
    pub fn set_svg(&mut self, svg: Vec<u8>) {
        self.svg = Some(svg);
    }

    /// The rendered preview image, if one was loaded or attached
    pub fn svg(&self) -> Option<&[u8]> {
        self.svg.as_deref()
    }
}
