//! The FreeCAD toolbit store codec
//!
//! The host format is unfortunately a mess:
//! - numbers are locale-dependent, e.g. decimal separator
//! - numbers are represented as strings in the JSON, with units
//! - numbers follow the precision settings of the user interface
//! - tool ids are not unique across libraries
//!
//! `FcSerializer` reproduces all of these behaviors so the files it
//! writes are interchangeable with files the host application writes.

use crate::document;
use crate::template::{builtin_properties, TemplateProperty};
use crate::{LIBRARY_DIR, LIBRARY_EXT, SHAPE_DIR, SHAPE_EXT, SVG_EXT, TOOL_DIR, TOOL_EXT};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use toolcrib_core::error::{Result, StoreError};
use toolcrib_core::library::{Library, LibraryId};
use toolcrib_core::shape::{ParamValue, Shape, RESERVED_SHAPES};
use toolcrib_core::tool::{Tool, ToolId};
use toolcrib_core::traits::LibraryStore;
use tracing::{debug, warn};

/// On-disk library document. Field order matches the host's
/// sorted-key output.
#[derive(Debug, Serialize, Deserialize)]
struct LibraryDocument {
    tools: Vec<ToolRef>,
    version: u32,
}

/// One tool reference within a library document. `nr` is the host
/// format's legacy numeric tool id, unique only within this library.
#[derive(Debug, Serialize, Deserialize)]
struct ToolRef {
    nr: u32,
    path: String,
}

/// On-disk tool document. Field order matches the host's sorted-key
/// output.
#[derive(Debug, Serialize, Deserialize)]
struct ToolDocument {
    attribute: BTreeMap<String, String>,
    name: String,
    parameter: BTreeMap<String, String>,
    shape: String,
    version: u32,
}

/// Codec between the entity model and a host-format directory tree
#[derive(Debug, Clone)]
pub struct FcSerializer {
    path: PathBuf,
    tool_path: PathBuf,
    lib_path: PathBuf,
    shape_path: PathBuf,
}

impl FcSerializer {
    /// Open (and if needed lay out) a store rooted at `path`. Fails if
    /// `path` exists and is not a directory; subdirectory creation is
    /// idempotent.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.exists() && !path.is_dir() {
            return Err(StoreError::NotADirectory(path).into());
        }
        let serializer = Self {
            tool_path: path.join(TOOL_DIR),
            lib_path: path.join(LIBRARY_DIR),
            shape_path: path.join(SHAPE_DIR),
            path,
        };
        for subdir in [
            &serializer.tool_path,
            &serializer.lib_path,
            &serializer.shape_path,
        ] {
            fs::create_dir_all(subdir).map_err(StoreError::Io)?;
        }
        debug!(path = ?serializer.path, "initialized tool store");
        Ok(serializer)
    }

    /// The store's base path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tool_filename_from_id(&self, id: &ToolId) -> PathBuf {
        self.tool_path.join(format!("{}.{}", id, TOOL_EXT))
    }

    fn library_filename_from_id(&self, id: &LibraryId) -> PathBuf {
        self.lib_path.join(format!("{}.{}", id, LIBRARY_EXT))
    }

    fn shape_filename_from_name(&self, name: &str) -> PathBuf {
        self.shape_path.join(format!("{}.{}", name, SHAPE_EXT))
    }

    fn svg_filename_from_name(&self, name: &str) -> PathBuf {
        self.shape_path.join(format!("{}.{}", name, SVG_EXT))
    }

    /// Resolve a name from a path stored inside a document. Only the
    /// file stem is trusted; directories and extensions in the stored
    /// string are discarded to guard against traversal and extension
    /// drift.
    fn name_from_filename(path: &str) -> String {
        Path::new(path)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn stems_with_ext(dir: &Path, ext: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(StoreError::Io)? {
            let path = entry.map_err(StoreError::Io)?.path();
            if path.extension().is_some_and(|e| e == ext) {
                if let Some(stem) = path.file_stem() {
                    names.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Ids of all libraries currently in the store
    pub fn library_ids(&self) -> Result<Vec<LibraryId>> {
        Ok(Self::stems_with_ext(&self.lib_path, LIBRARY_EXT)?
            .into_iter()
            .map(LibraryId)
            .collect())
    }

    /// Ids of all tools currently in the store
    pub fn tool_ids(&self) -> Result<Vec<ToolId>> {
        Ok(Self::stems_with_ext(&self.tool_path, TOOL_EXT)?
            .into_iter()
            .map(ToolId)
            .collect())
    }

    /// Names of all shape templates currently in the store
    pub fn shape_names(&self) -> Result<Vec<String>> {
        Self::stems_with_ext(&self.shape_path, SHAPE_EXT)
    }

    fn remove_library_by_id(&self, id: &LibraryId) -> Result<()> {
        debug!(%id, "removing stale library file");
        fs::remove_file(self.library_filename_from_id(id)).map_err(StoreError::Io)?;
        Ok(())
    }

    /// The ordered parameter schema of a shape's template, independent
    /// of the values any tool currently carries.
    fn shape_schema(&self, shape: &Shape) -> Result<Vec<TemplateProperty>> {
        if shape.is_builtin() {
            return builtin_properties(shape.name())
                .ok_or_else(|| StoreError::ShapeNotFound(shape.name().to_string()).into());
        }
        let filename = match shape.filename() {
            Some(filename) => filename.to_path_buf(),
            None => self.shape_filename_from_name(shape.name()),
        };
        if !filename.is_file() {
            return Err(StoreError::MissingTemplate(shape.name().to_string()).into());
        }
        Ok(document::read_template(&filename)?)
    }

    /// Full-replace sync: write every given library, then delete any
    /// stored library whose id is not among them. Tool and shape files
    /// are never garbage-collected; an unused file is cheaper than a
    /// wrongly deleted one.
    pub fn serialize_libraries(&self, libraries: &[Library]) -> Result<()> {
        let mut existing: HashSet<LibraryId> = self.library_ids()?.into_iter().collect();
        for library in libraries {
            self.serialize_library(library)?;
            existing.remove(library.id());
        }
        for id in existing {
            self.remove_library_by_id(&id)?;
        }
        Ok(())
    }

    /// Load every library in the store
    pub fn deserialize_libraries(&self) -> Result<Vec<Library>> {
        self.library_ids()?
            .iter()
            .map(|id| self.deserialize_library(id))
            .collect()
    }

    /// Write one library document plus a tool document for every tool
    /// it references.
    ///
    /// The `nr` written for each tool is the host format's legacy tool
    /// id: ids recorded by a previous deserialize of this library are
    /// reused unchanged, and tools without one get fresh ids counted
    /// up from one past the highest recorded id. Tool ids are not
    /// unique across libraries, so this bookkeeping is per library.
    pub fn serialize_library(&self, library: &Library) -> Result<()> {
        let mut next_tool_id = library
            .fc_tool_ids()
            .and_then(|ids| ids.values().max().copied())
            .map_or(1, |max| max + 1);

        let mut tools = Vec::new();
        for tool in library.tools() {
            let nr = match library.fc_tool_id_of(tool.id()) {
                Some(nr) => nr,
                None => {
                    let nr = next_tool_id;
                    next_tool_id += 1;
                    nr
                }
            };
            let tool_filename = self.tool_filename_from_id(tool.id());
            tools.push(ToolRef {
                nr,
                path: tool_filename
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            });
            self.serialize_tool(tool)?;
        }

        let doc = LibraryDocument {
            tools,
            version: Library::API_VERSION,
        };
        let filename = self.library_filename_from_id(library.id());
        let content = serde_json::to_string_pretty(&doc).map_err(StoreError::Json)?;
        fs::write(filename, content).map_err(StoreError::Io)?;
        Ok(())
    }

    /// Load one library. Tools that cannot be read are skipped with a
    /// warning; a library referencing one corrupt tool still loads its
    /// remaining tools. A malformed library document propagates.
    pub fn deserialize_library(&self, id: &LibraryId) -> Result<Library> {
        let filename = self.library_filename_from_id(id);
        let content = fs::read_to_string(&filename).map_err(StoreError::Io)?;
        let doc: LibraryDocument = serde_json::from_str(&content).map_err(StoreError::Json)?;

        let mut library = Library::with_id(id.clone(), id.as_str());
        for tool_ref in doc.tools {
            let tool_id = ToolId(Self::name_from_filename(&tool_ref.path));
            match self.deserialize_tool(&tool_id) {
                Ok(mut tool) => {
                    tool.set_pocket(tool_ref.nr);
                    library.record_fc_tool_id(tool.id().clone(), tool_ref.nr);
                    library.add_tool(tool);
                }
                Err(err) => {
                    warn!(path = %tool_ref.path, error = %err, "skipping unreadable tool");
                }
            }
        }
        Ok(library)
    }

    /// Write one tool document.
    ///
    /// The set of serializable parameters comes from the shape's
    /// template, not from the tool: integer properties default to
    /// `"0"`, unset float/text properties are omitted so they decode
    /// back as unset, and unit-bearing properties go through the
    /// quantity display string with the host UI's comma decimal
    /// separator. Parameters outside the schema are written verbatim.
    pub fn serialize_tool(&self, tool: &Tool) -> Result<()> {
        let shape = tool.shape();
        // The template must be on disk before it can be introspected;
        // builtin shapes are never written.
        self.serialize_shape(shape)?;
        let schema = self.shape_schema(shape)?;

        let mut parameter = BTreeMap::new();
        for prop in &schema {
            let value = shape.get_param(&prop.name).or(prop.default.as_ref());
            if let Some(encoded) = prop.descriptor.encode(value) {
                parameter.insert(prop.name.clone(), encoded);
            }
        }
        let covered: HashSet<&str> = schema.iter().map(|p| p.name.as_str()).collect();
        for (name, value) in shape.params() {
            if !covered.contains(name) {
                parameter.insert(name.to_string(), value.to_string());
            }
        }

        let doc = ToolDocument {
            attribute: BTreeMap::new(),
            name: tool.label().to_string(),
            parameter,
            shape: format!("{}.{}", shape.name(), SHAPE_EXT),
            version: Tool::API_VERSION,
        };
        let filename = self.tool_filename_from_id(tool.id());
        let content = serde_json::to_string_pretty(&doc).map_err(StoreError::Json)?;
        fs::write(filename, content).map_err(StoreError::Io)?;
        Ok(())
    }

    /// Load every tool in the store
    pub fn deserialize_tools(&self) -> Result<Vec<Tool>> {
        self.tool_ids()?
            .iter()
            .map(|id| self.deserialize_tool(id))
            .collect()
    }

    /// Load one tool document, rebuilding its shape and converting
    /// every schema parameter back to the internal representation.
    /// Parameters the schema does not enumerate are preserved as
    /// opaque text. A parameter that fails to parse is an error here;
    /// the library-level decode downgrades it per tool.
    pub fn deserialize_tool(&self, id: &ToolId) -> Result<Tool> {
        let filename = self.tool_filename_from_id(id);
        let content = fs::read_to_string(&filename).map_err(StoreError::Io)?;
        let doc: ToolDocument = serde_json::from_str(&content).map_err(StoreError::Json)?;

        let shape_name = Self::name_from_filename(&doc.shape);
        let mut shape = self.deserialize_shape(&shape_name)?;
        let schema = self.shape_schema(&shape)?;

        let mut parameter = doc.parameter;
        for prop in &schema {
            if let Some(raw) = parameter.remove(&prop.name) {
                let value = prop.descriptor.decode(&prop.name, &raw)?;
                shape.set_param(prop.name.clone(), value);
            }
        }
        // Whatever the schema did not claim is kept as-is.
        for (name, raw) in parameter {
            shape.set_param(name, ParamValue::Text(raw));
        }

        let mut tool = Tool::with_id(id.clone(), doc.name, shape);
        tool.set_filename(filename);
        Ok(tool)
    }

    /// Load every shape template in the store
    pub fn deserialize_shapes(&self) -> Result<Vec<Shape>> {
        self.shape_names()?
            .iter()
            .map(|name| self.deserialize_shape(name))
            .collect()
    }

    /// Write one shape template archive plus its rendered preview.
    /// Builtin shapes never touch disk.
    pub fn serialize_shape(&self, shape: &Shape) -> Result<()> {
        if shape.is_builtin() {
            return Ok(());
        }
        let filename = self.shape_filename_from_name(shape.name());
        document::write_template(&filename, shape)?;

        let svg_filename = self.svg_filename_from_name(shape.name());
        match shape.svg() {
            Some(svg) => fs::write(svg_filename, svg).map_err(StoreError::Io)?,
            None => fs::write(svg_filename, document::render_preview(shape))
                .map_err(StoreError::Io)?,
        }
        Ok(())
    }

    /// Load one shape template. Reserved names reconstruct the builtin
    /// shape without touching disk; file-backed shapes read their
    /// template defaults and, when present, the companion preview.
    pub fn deserialize_shape(&self, name: &str) -> Result<Shape> {
        if RESERVED_SHAPES.contains(&name) {
            return Ok(Shape::new(name));
        }

        let filename = self.shape_filename_from_name(name);
        if !filename.is_file() {
            return Err(StoreError::ShapeNotFound(name.to_string()).into());
        }
        let mut shape = Shape::from_file(name, &filename);
        for prop in document::read_template(&filename)? {
            if let Some(default) = prop.default {
                shape.set_param(prop.name, default);
            }
        }

        // The preview is optional; its absence is not an error.
        let svg_filename = self.svg_filename_from_name(name);
        if svg_filename.is_file() {
            shape.set_svg(fs::read(svg_filename).map_err(StoreError::Io)?);
        }
        Ok(shape)
    }
}

impl LibraryStore for FcSerializer {
    fn serialize_library(&self, library: &Library) -> Result<()> {
        FcSerializer::serialize_library(self, library)
    }

    fn deserialize_library(&self, id: &LibraryId) -> Result<Library> {
        FcSerializer::deserialize_library(self, id)
    }

    fn serialize_libraries(&self, libraries: &[Library]) -> Result<()> {
        FcSerializer::serialize_libraries(self, libraries)
    }

    fn deserialize_libraries(&self) -> Result<Vec<Library>> {
        FcSerializer::deserialize_libraries(self)
    }

    fn serialize_tool(&self, tool: &Tool) -> Result<()> {
        FcSerializer::serialize_tool(self, tool)
    }

    fn deserialize_tool(&self, id: &ToolId) -> Result<Tool> {
        FcSerializer::deserialize_tool(self, id)
    }

    fn deserialize_tools(&self) -> Result<Vec<Tool>> {
        FcSerializer::deserialize_tools(self)
    }

    fn serialize_shape(&self, shape: &Shape) -> Result<()> {
        FcSerializer::serialize_shape(self, shape)
    }

    fn deserialize_shape(&self, name: &str) -> Result<Shape> {
        FcSerializer::deserialize_shape(self, name)
    }

    fn deserialize_shapes(&self) -> Result<Vec<Shape>> {
        FcSerializer::deserialize_shapes(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_from_filename_strips_dirs_and_ext() {
        assert_eq!(FcSerializer::name_from_filename("tool-1.fctb"), "tool-1");
        assert_eq!(
            FcSerializer::name_from_filename("../../etc/passwd.fctb"),
            "passwd"
        );
        assert_eq!(FcSerializer::name_from_filename("endmill.fcstd"), "endmill");
    }

    #[test]
    fn test_new_rejects_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocked = dir.path().join("store");
        fs::write(&blocked, b"not a directory").unwrap();
        assert!(FcSerializer::new(&blocked).is_err());
    }

    #[test]
    fn test_new_creates_subdirectories_idempotently() {
        let dir = tempfile::tempdir().unwrap();
        FcSerializer::new(dir.path()).unwrap();
        let serializer = FcSerializer::new(dir.path()).unwrap();
        assert!(dir.path().join(TOOL_DIR).is_dir());
        assert!(dir.path().join(LIBRARY_DIR).is_dir());
        assert!(dir.path().join(SHAPE_DIR).is_dir());
        assert!(serializer.library_ids().unwrap().is_empty());
    }
}
