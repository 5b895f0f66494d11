//! Item paths: the stable identity of a menu item.
//!
//! A path is built from the `value` attributes of an item and its ancestor
//! items, root first, e.g. `/File/Save`. An item carrying a `command`
//! attribute uses that text verbatim instead. Paths, not element ids, are
//! what keybindings persist and what `Selected` events carry.

use crate::tree::{MenuTree, NodeId, NodeKind, ATTR_COMMAND, ATTR_VALUE};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemPath(String);

impl ItemPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last `/`-separated segment (empty for `"/"`).
    pub fn last_segment(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }
}

impl From<&str> for ItemPath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl From<String> for ItemPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the path of `item`.
pub fn path_of(tree: &MenuTree, item: NodeId) -> ItemPath {
    if let Some(command) = tree.attr(item, ATTR_COMMAND).filter(|c| !c.is_empty()) {
        return ItemPath::from(command);
    }

    let mut segments = Vec::new();
    let mut current = tree.closest(item, NodeKind::Item);
    while let Some(node) = current {
        if let Some(value) = tree.attr(node, ATTR_VALUE).filter(|v| !v.is_empty()) {
            segments.push(value);
        }
        current = tree
            .parent(node)
            .and_then(|parent| tree.closest(parent, NodeKind::Item));
    }
    segments.reverse();

    ItemPath(format!("/{}", segments.join("/")))
}

/// Find the first item (document order) whose path is `path`.
pub fn item_at(tree: &MenuTree, path: &ItemPath) -> Option<NodeId> {
    let last = path.last_segment();
    tree.items().into_iter().find(|item| {
        tree.attr(*item, ATTR_VALUE) == Some(last) && path_of(tree, *item) == *path
    })
}
