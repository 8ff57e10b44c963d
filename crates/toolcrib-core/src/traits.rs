//! Store abstraction the entity model delegates persistence to.
//!
//! Keeps `Library`/`Tool`/`Shape` decoupled from any particular file
//! format; a codec implements this trait per host format.

use crate::error::Result;
use crate::library::{Library, LibraryId};
use crate::shape::Shape;
use crate::tool::{Tool, ToolId};

/// Bidirectional mapping between the entity model and a backing store.
pub trait LibraryStore {
    /// Write one library, including every tool it references.
    fn serialize_library(&self, library: &Library) -> Result<()>;

    /// Load one library by id.
    fn deserialize_library(&self, id: &LibraryId) -> Result<Library>;

    /// Full-replace sync: write the given libraries and delete any
    /// stored library not among them.
    fn serialize_libraries(&self, libraries: &[Library]) -> Result<()>;

    /// Load every library in the store.
    fn deserialize_libraries(&self) -> Result<Vec<Library>>;

    /// Write one tool.
    fn serialize_tool(&self, tool: &Tool) -> Result<()>;

    /// Load one tool by id.
    fn deserialize_tool(&self, id: &ToolId) -> Result<Tool>;

    /// Load every tool in the store.
    fn deserialize_tools(&self) -> Result<Vec<Tool>>;

    /// Write one shape template. Builtin shapes are never written.
    fn serialize_shape(&self, shape: &Shape) -> Result<()>;

    /// Load one shape template by name.
    fn deserialize_shape(&self, name: &str) -> Result<Shape>;

    /// Load every shape template in the store.
    fn deserialize_shapes(&self) -> Result<Vec<Shape>>;
}
