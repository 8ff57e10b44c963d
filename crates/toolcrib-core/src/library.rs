//! Tool libraries
//!
//! A library is an ordered, deduplicated collection of tools. Each
//! tool added to a library is assigned a library-local slot number
//! from a monotonic counter that is never reused within a session,
//! even after removals.

use crate::error::Result;
use crate::tool::{Tool, ToolId};
use crate::traits::LibraryStore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use uuid::Uuid;

/// Library identifier, also used as the library's filename stem
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct LibraryId(pub String);

impl LibraryId {
    /// Mint a fresh unique id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LibraryId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for LibraryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LibraryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An ordered collection of tools with library-local numbering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Library {
    id: LibraryId,
    label: String,
    tools: Vec<Tool>,
    /// Slot number to tool identity. Keys come from `tool_no_inc` and
    /// are never handed out twice.
    tool_nos: BTreeMap<u32, ToolId>,
    tool_no_inc: u32,
    /// The numeric ids the host file format associated with each tool,
    /// recorded only when this library was loaded from the host
    /// format. Used to reproduce the host's numbering on re-write;
    /// distinct from `tool_nos`.
    fc_tool_ids: Option<HashMap<ToolId, u32>>,
}

impl Library {
    /// File format version written into library documents
    pub const API_VERSION: u32 = 1;

    /// Create an empty library with a freshly generated id
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_id(LibraryId::generate(), label)
    }

    /// Create an empty library with a caller-supplied id
    pub fn with_id(id: LibraryId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            tools: Vec::new(),
            tool_nos: BTreeMap::new(),
            tool_no_inc: 1,
            fc_tool_ids: None,
        }
    }

    /// The library's identity
    pub fn id(&self) -> &LibraryId {
        &self.id
    }

    /// Human-readable label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Rename the library. Identity is unaffected.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Tools in insertion order (the default display order)
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Number of tools in the library
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the library holds no tools
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// The smallest unused slot number a caller could expect the next
    /// added tool to be near: one past the highest assigned slot, or 1
    /// for an empty library. Pure; does not consume the counter.
    pub fn get_next_tool_no(&self) -> u32 {
        self.tool_nos.keys().next_back().map_or(1, |max| max + 1)
    }

    /// Append a tool and assign it the next slot number. Slot numbers
    /// are always auto-assigned from the internal counter and never
    /// reused, even after removals. Duplicate identities are ignored.
    pub fn add_tool(&mut self, tool: Tool) {
        if self.has_tool(&tool) {
            return;
        }
        self.tool_nos.insert(self.tool_no_inc, tool.id().clone());
        self.tool_no_inc += 1;
        self.tools.push(tool);
    }

    /// Remove a tool by identity from both the ordered sequence and
    /// the slot mapping. Remaining slots are not renumbered. No-op if
    /// the tool is absent.
    pub fn remove_tool(&mut self, tool: &Tool) {
        self.tools.retain(|t| t.id() != tool.id());
        self.tool_nos.retain(|_, id| id != tool.id());
    }

    /// Identity-based membership test
    pub fn has_tool(&self, tool: &Tool) -> bool {
        self.tools.iter().any(|t| t.id() == tool.id())
    }

    /// The slot number assigned to a tool, if it holds one
    pub fn tool_no_of(&self, tool: &Tool) -> Option<u32> {
        self.tool_nos
            .iter()
            .find(|(_, id)| *id == tool.id())
            .map(|(no, _)| *no)
    }

    /// The host-format numeric id recorded for a tool, if this library
    /// was loaded from the host format
    pub fn fc_tool_id_of(&self, id: &ToolId) -> Option<u32> {
        self.fc_tool_ids.as_ref()?.get(id).copied()
    }

    /// All recorded host-format ids. `None` when the library was never
    /// deserialized; behaves the same as an empty mapping on encode.
    pub fn fc_tool_ids(&self) -> Option<&HashMap<ToolId, u32>> {
        self.fc_tool_ids.as_ref()
    }

    /// Record the host-format numeric id observed for a tool (set by
    /// the codec on decode)
    pub fn record_fc_tool_id(&mut self, id: ToolId, nr: u32) {
        self.fc_tool_ids.get_or_insert_with(HashMap::new).insert(id, nr);
    }

    /// Write this library (and its tools) through the given store
    pub fn serialize(&self, store: &impl LibraryStore) -> Result<()> {
        store.serialize_library(self)
    }

    /// Load a library by id through the given store
    pub fn deserialize(store: &impl LibraryStore, id: &LibraryId) -> Result<Library> {
        store.deserialize_library(id)
    }
}

impl PartialEq for Library {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Library {}

impl<'a> IntoIterator for &'a Library {
    type Item = &'a Tool;
    type IntoIter = std::slice::Iter<'a, Tool>;

    fn into_iter(self) -> Self::IntoIter {
        self.tools.iter()
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\"", self.id, self.label)
    }
}
