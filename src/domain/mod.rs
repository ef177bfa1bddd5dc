//! Domain layer: map model, identifiers and hierarchy projection
//!
//! This layer is independent of external concerns (no file system, no CLI, no config loading).

pub mod document;
pub mod error;
pub mod ids;
pub mod walker;

pub use document::{MindMapDocument, MindMapNode, MAP_FILE_NAME};
pub use error::DomainError;
pub use ids::{FixedIdGenerator, IdGenerator, SequentialIdGenerator, UuidGenerator};
pub use walker::{
    sanitize_title, Column, ConvertOptions, HierarchyWalker, OutputRow, RowLayout,
    TraversalContext, WalkSummary, LEAF_MARKER,
};
