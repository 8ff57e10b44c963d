//! Error handling for Tool Crib
//!
//! Provides structured error types for the two layers of the crate:
//! - Store errors (directory layout, file I/O, document parsing)
//! - Parameter errors (per-property value conversion)
//!
//! All error types use `thiserror` for ergonomic error handling.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a tool-library store while reading or writing the
/// on-disk representation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The configured base path exists but is not a directory.
    #[error("{0:?} is not a directory")]
    NotADirectory(PathBuf),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error. A whole-document
    /// parse failure is never downgraded to a warning.
    #[error("Document error: {0}")]
    Json(#[from] serde_json::Error),

    /// The shape template archive could not be read or understood.
    #[error("Failed to read shape template {path:?}: {reason}")]
    TemplateRead {
        /// The template file that failed to load.
        path: PathBuf,
        /// Why the template could not be loaded.
        reason: String,
    },

    /// A non-builtin shape carries no backing file to introspect.
    #[error("Shape '{0}' has no template file")]
    MissingTemplate(String),

    /// The requested shape does not exist in the store.
    #[error("Shape not found: {0}")]
    ShapeNotFound(String),
}

/// Errors related to converting a single tool property between its
/// on-disk string form and the internal representation.
#[derive(Error, Debug, Clone)]
pub enum ParamError {
    /// An integer-typed property did not parse as an integer.
    #[error("Invalid integer for '{name}': {value:?}")]
    InvalidInteger {
        /// The property name.
        name: String,
        /// The raw file value.
        value: String,
    },

    /// A real-typed property did not parse as a number.
    #[error("Invalid number for '{name}': {value:?}")]
    InvalidNumber {
        /// The property name.
        name: String,
        /// The raw file value.
        value: String,
    },

    /// A unit-bearing property did not parse as a quantity.
    #[error("Invalid quantity for '{name}': {value:?}")]
    InvalidQuantity {
        /// The property name.
        name: String,
        /// The raw file value.
        value: String,
    },

    /// A unit suffix was not recognized.
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),
}

/// Main error type for Tool Crib
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Property conversion error
    #[error(transparent)]
    Param(#[from] ParamError),
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
