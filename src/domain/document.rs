//! MindMeister map document model
//!
//! Only the fields the converter consumes are modelled. Every other key of a
//! MindMeister export (ids, positions, styles, tasks, ...) is ignored.

use std::str::FromStr;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer};

use crate::domain::DomainError;

/// Name of the map member inside a `.mind` archive.
pub const MAP_FILE_NAME: &str = "map.json";

/// One idea of the mind map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MindMapNode {
    /// Visible text; untitled nodes produce no row.
    #[serde(default)]
    pub title: Option<String>,
    /// Ordered child ideas. Absent, `null` and `[]` all mean "leaf".
    #[serde(default, deserialize_with = "null_as_empty")]
    pub children: Vec<MindMapNode>,
}

impl MindMapNode {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            children: Vec::new(),
        }
    }

    pub fn untitled() -> Self {
        Self::default()
    }

    pub fn with_children(mut self, children: Vec<MindMapNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl Drop for MindMapNode {
    // flatten the subtree first so deep chains do not recurse on drop
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<MindMapNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<MindMapNode>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Parsed content of `map.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MindMapDocument {
    pub root: MindMapNode,
}

/// Top level of `map.json`; `root` is optional so its absence is a format error.
#[derive(Deserialize, Default)]
#[serde(default)]
struct RawDocument {
    root: Option<MindMapNode>,
}

impl MindMapDocument {
    /// Parse raw map file bytes.
    ///
    /// Anything that is not JSON (including invalid UTF-8) is
    /// [`DomainError::NotJson`]; JSON without a usable `root` node is
    /// [`DomainError::IncorrectFormat`]. Nesting depth is not limited.
    pub fn from_slice(content: &[u8]) -> Result<Self, DomainError> {
        parse_unbounded::<IgnoredAny>(content).map_err(|source| DomainError::NotJson { source })?;
        let raw: RawDocument = parse_unbounded(content)
            .map_err(|e| DomainError::incorrect_format(format!("invalid map document: {e}")))?;
        let root = raw
            .root
            .ok_or_else(|| DomainError::incorrect_format("missing `root` key"))?;
        Ok(Self { root })
    }
}

impl FromStr for MindMapDocument {
    type Err = DomainError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        Self::from_slice(content.as_bytes())
    }
}

/// Deserialize without serde_json's recursion limit, growing the stack on demand.
fn parse_unbounded<T: DeserializeOwned>(content: &[u8]) -> Result<T, serde_json::Error> {
    let mut deserializer = serde_json::Deserializer::from_slice(content);
    deserializer.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}
