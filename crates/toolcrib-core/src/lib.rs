//! # Tool Crib Core
//!
//! Entity model for machine-tool libraries: shapes, tools, and
//! libraries, plus the unit helpers and error taxonomy shared with the
//! on-disk format codecs.

pub mod error;
pub mod library;
pub mod shape;
pub mod tool;
pub mod traits;
pub mod units;

pub use error::{Error, ParamError, Result, StoreError};
pub use library::{Library, LibraryId};
pub use shape::{ParamValue, Shape, RESERVED_SHAPES};
pub use tool::{Tool, ToolId};
pub use traits::LibraryStore;
pub use units::{Quantity, Unit};
