//! Dotted key paths and their resolution to nested mappings.

use crate::error::{YamlError, YamlResult};
use crate::yaml::{node_shape, Mapping};
use rowan::ast::AstNode;
use std::fmt;
use tracing::trace;

/// A dotted key path such as `config.database`.
///
/// The empty path has no segments and refers to the root mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath<'a> {
    segments: Vec<&'a str>,
}

impl<'a> KeyPath<'a> {
    /// Split `path` on `.`.
    ///
    /// Empty segments and list indexing (`items[0]`) are rejected.
    pub fn parse(path: &'a str) -> YamlResult<Self> {
        if path.is_empty() {
            return Ok(Self {
                segments: Vec::new(),
            });
        }
        let segments: Vec<&str> = path.split('.').collect();
        for segment in &segments {
            let reason = if segment.is_empty() {
                "empty path segment"
            } else if segment.contains(|c: char| c == '[' || c == ']') {
                "list indexing is not supported"
            } else {
                continue;
            };
            return Err(YamlError::UnsupportedPath {
                segment: segment.to_string(),
                reason,
            });
        }
        Ok(Self { segments })
    }

    /// The path's segments, in order.
    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }

    /// Whether this is the empty path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Walk from `root` through each segment to the mapping the path names.
    pub fn resolve(&self, root: &Mapping) -> YamlResult<Mapping> {
        let mut current = root.clone();
        for segment in &self.segments {
            trace!(segment, "descending into config key");
            current = step(&current, segment)?;
        }
        Ok(current)
    }
}

impl fmt::Display for KeyPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

fn step(mapping: &Mapping, segment: &str) -> YamlResult<Mapping> {
    let entry = mapping
        .find(segment)
        .ok_or_else(|| YamlError::KeyNotFound(segment.to_string()))?;
    let value = entry.value();
    let found = value.as_ref().map_or("null", node_shape);
    value
        .and_then(Mapping::cast)
        .ok_or_else(|| YamlError::TypeMismatch {
            segment: segment.to_string(),
            found,
        })
}

/// Resolve a dotted `path` starting at `root`.
///
/// The empty path resolves to `root` itself. Each segment must name an entry
/// whose value is a mapping, block or flow; the first entry with a matching
/// key is used.
pub fn resolve(root: &Mapping, path: &str) -> YamlResult<Mapping> {
    KeyPath::parse(path)?.resolve(root)
}
