//! Tree traversal helpers for keyboard navigation.
//!
//! Only item nodes count as siblings; separators, headings and overlay nodes
//! are stepped over. Every helper returns `None` instead of failing when the
//! tree does not have the expected shape.

use crate::tree::{MenuTree, NodeId, NodeKind};

fn sibling_items(tree: &MenuTree, item: NodeId) -> Option<&[NodeId]> {
    let parent = tree.parent(item)?;
    Some(tree.children(parent))
}

/// Next item after `item` among its siblings. With `wrap`, running off the
/// end continues from the first sibling.
pub fn next_sibling(tree: &MenuTree, item: NodeId, wrap: bool) -> Option<NodeId> {
    let siblings = sibling_items(tree, item)?;
    let position = siblings.iter().position(|s| *s == item)?;
    let found = siblings[position + 1..]
        .iter()
        .copied()
        .find(|s| tree.is_item(*s));

    match found {
        Some(next) => Some(next),
        None if wrap => first_sibling(tree, item),
        None => None,
    }
}

/// Previous item before `item` among its siblings. With `wrap`, running off
/// the start continues from the last sibling.
pub fn previous_sibling(tree: &MenuTree, item: NodeId, wrap: bool) -> Option<NodeId> {
    let siblings = sibling_items(tree, item)?;
    let position = siblings.iter().position(|s| *s == item)?;
    let found = siblings[..position]
        .iter()
        .rev()
        .copied()
        .find(|s| tree.is_item(*s));

    match found {
        Some(previous) => Some(previous),
        None if wrap => last_sibling(tree, item),
        None => None,
    }
}

/// First item among the siblings of `item`, never `item` itself.
pub fn first_sibling(tree: &MenuTree, item: NodeId) -> Option<NodeId> {
    sibling_items(tree, item)?
        .iter()
        .copied()
        .find(|s| *s != item && tree.is_item(*s))
}

/// Last item among the siblings of `item`, never `item` itself.
pub fn last_sibling(tree: &MenuTree, item: NodeId) -> Option<NodeId> {
    sibling_items(tree, item)?
        .iter()
        .rev()
        .copied()
        .find(|s| *s != item && tree.is_item(*s))
}

/// The overlay directly owned by `item`, if it is a branch.
pub fn submenu_of(tree: &MenuTree, item: NodeId) -> Option<NodeId> {
    if !tree.is_item(item) {
        return None;
    }
    tree.children(item)
        .iter()
        .copied()
        .find(|child| tree.is_overlay(*child))
}

/// First item, depth first, inside the submenu `item` owns.
pub fn first_child_item(tree: &MenuTree, item: NodeId) -> Option<NodeId> {
    let overlay = submenu_of(tree, item)?;
    tree.descendants(overlay)
        .into_iter()
        .find(|node| tree.is_item(*node))
}

/// Nearest item strictly above `item`.
pub fn parent_item(tree: &MenuTree, item: NodeId) -> Option<NodeId> {
    let parent = tree.parent(item)?;
    tree.closest(parent, NodeKind::Item)
}

/// Outermost item strictly above `item`; `None` for top-level items.
pub fn root_ancestor_item(tree: &MenuTree, item: NodeId) -> Option<NodeId> {
    let mut found = None;
    let mut current = parent_item(tree, item);
    while let Some(ancestor) = current {
        found = Some(ancestor);
        current = parent_item(tree, ancestor);
    }
    found
}

/// Whether `item` sits directly under the menu root.
pub fn is_top_level(tree: &MenuTree, item: NodeId) -> bool {
    tree.parent(item) == Some(tree.root())
}

/// Overlays enclosing `item`, innermost first, stopping at the menu root.
pub fn ancestor_overlays(tree: &MenuTree, item: NodeId) -> Vec<NodeId> {
    let mut overlays = Vec::new();
    let mut current = tree.parent(item);
    while let Some(node) = current {
        if node == tree.root() {
            break;
        }
        if tree.is_overlay(node) {
            overlays.push(node);
        }
        current = tree.parent(node);
    }
    overlays
}
