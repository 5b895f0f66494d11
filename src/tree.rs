//! Menu tree: the node arena every menu algorithm walks.
//!
//! The tree mirrors the markup a menu is written in: a root node, item nodes,
//! submenu nodes nested inside their owning item, and (after mount) overlay
//! nodes wrapping each submenu. Separators and any other decoration are kept
//! as [`NodeKind::Other`] so they occupy a sibling slot but are skipped by
//! navigation.
//!
//! Nodes are never removed; a [`NodeId`] stays valid for the lifetime of the
//! tree. Lookups with an id from another tree return `None` instead of
//! panicking.

use crate::overlay::Overlay;
use std::collections::BTreeMap;

pub const ATTR_ID: &str = "id";
pub const ATTR_VALUE: &str = "value";
pub const ATTR_COMMAND: &str = "command";
pub const ATTR_TAB_INDEX: &str = "tabindex";
pub const ATTR_LABEL: &str = "label";
pub const ATTR_AUTO_OPEN_TIME: &str = "auto-open-time";

/// Index of a node in its [`MenuTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The menu element itself
    Root,
    /// A selectable entry, leaf or branch
    Item,
    /// The child list of a branch item
    Submenu,
    /// Popover wrapping a submenu (created at mount)
    Overlay,
    /// Separators, headings and anything else navigation skips
    Other,
}

/// Visual state the engine maintains on item nodes for the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemMarks {
    /// Item owns a submenu
    pub has_submenu: bool,
    /// Item owns an overlay that is currently open
    pub has_focus: bool,
    /// Rendered shortcut hint; `None` until the callout is created at mount
    pub shortcut_hint: Option<String>,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: BTreeMap<String, String>,
    marks: ItemMarks,
    overlay: Option<Overlay>,
}

impl Node {
    fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            marks: ItemMarks::default(),
            overlay: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MenuTree {
    nodes: Vec<Node>,
    next_object_id: u64,
}

impl Default for MenuTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuTree {
    /// Create a tree holding only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Root, None)],
            next_object_id: 1,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Append a node of `kind` as the last child of `parent`.
    ///
    /// Returns `None` when `parent` does not belong to this tree.
    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.node(parent)?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind, Some(parent)));
        self.nodes[parent.0].children.push(id);
        Some(id)
    }

    /// Append an item with an optional `value` path segment.
    pub fn append_item(&mut self, parent: NodeId, value: Option<&str>) -> Option<NodeId> {
        let id = self.append(parent, NodeKind::Item)?;
        if let Some(value) = value {
            self.set_attr(id, ATTR_VALUE, value);
        }
        Some(id)
    }

    /// Append a submenu to `item`, making it a branch.
    pub fn append_submenu(&mut self, item: NodeId) -> Option<NodeId> {
        if !self.is_item(item) {
            return None;
        }
        self.append(item, NodeKind::Submenu)
    }

    pub fn append_separator(&mut self, parent: NodeId) -> Option<NodeId> {
        self.append(parent, NodeKind::Other)
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(|node| node.kind)
    }

    pub fn is_item(&self, id: NodeId) -> bool {
        self.kind(id) == Some(NodeKind::Item)
    }

    pub fn is_overlay(&self, id: NodeId) -> bool {
        self.kind(id) == Some(NodeKind::Overlay)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    /// Read an attribute. Empty strings are returned as-is.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)?.attributes.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(node) = self.node_mut(id) {
            node.attributes.insert(name.to_string(), value.into());
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(node) = self.node_mut(id) {
            node.attributes.remove(name);
        }
    }

    /// Element id of a node, if one has been set.
    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.attr(id, ATTR_ID).filter(|value| !value.is_empty())
    }

    /// Find a node by element id.
    pub fn find_by_element_id(&self, element_id: &str) -> Option<NodeId> {
        (0..self.nodes.len())
            .map(NodeId)
            .find(|id| self.element_id(*id) == Some(element_id))
    }

    pub fn tab_index(&self, id: NodeId) -> Option<i32> {
        self.attr(id, ATTR_TAB_INDEX)?.trim().parse().ok()
    }

    pub fn marks(&self, id: NodeId) -> Option<&ItemMarks> {
        self.node(id).map(|node| &node.marks)
    }

    pub fn marks_mut(&mut self, id: NodeId) -> Option<&mut ItemMarks> {
        self.node_mut(id).map(|node| &mut node.marks)
    }

    pub fn overlay(&self, id: NodeId) -> Option<&Overlay> {
        self.node(id)?.overlay.as_ref()
    }

    pub fn overlay_mut(&mut self, id: NodeId) -> Option<&mut Overlay> {
        self.node_mut(id)?.overlay.as_mut()
    }

    /// All descendants of `id` in document (depth-first, pre-order) order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Every node of `kind` in document order.
    pub fn select(&self, kind: NodeKind) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|id| self.kind(*id) == Some(kind))
            .collect()
    }

    pub fn items(&self) -> Vec<NodeId> {
        self.select(NodeKind::Item)
    }

    /// Nearest node of `kind` starting at `id` itself and walking up.
    pub fn closest(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.kind(node)? == kind {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// True when `node` is `ancestor` or lies somewhere below it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Open overlays in document order.
    pub fn open_overlays(&self) -> Vec<NodeId> {
        use crate::overlay::Popover;

        self.select(NodeKind::Overlay)
            .into_iter()
            .filter(|id| self.overlay(*id).is_some_and(|overlay| overlay.is_open()))
            .collect()
    }

    /// Highest tab index assigned anywhere in the tree.
    pub fn largest_tab_index(&self) -> Option<i32> {
        (0..self.nodes.len())
            .filter_map(|index| self.tab_index(NodeId(index)))
            .max()
    }

    /// Generate an element id unique within this tree.
    pub fn generate_element_id(&mut self) -> String {
        loop {
            let candidate = format!("menu-node-{}", self.next_object_id);
            self.next_object_id += 1;
            if self.find_by_element_id(&candidate).is_none() {
                return candidate;
            }
        }
    }

    /// Replace `target` in its parent with a new overlay node and move `target`
    /// inside it. Returns the overlay node.
    pub fn wrap_in_overlay(&mut self, target: NodeId, overlay: Overlay) -> Option<NodeId> {
        let parent = self.parent(target)?;
        let position = self.children(parent).iter().position(|c| *c == target)?;

        let wrapper = NodeId(self.nodes.len());
        let mut node = Node::new(NodeKind::Overlay, Some(parent));
        node.children.push(target);
        node.overlay = Some(overlay);
        self.nodes.push(node);

        self.nodes[parent.0].children[position] = wrapper;
        self.nodes[target.0].parent = Some(wrapper);
        Some(wrapper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{AnchorAlignment, Popover};

    fn file_menu() -> (MenuTree, NodeId, NodeId, NodeId) {
        let mut tree = MenuTree::new();
        let root = tree.root();
        let file = tree.append_item(root, Some("File")).unwrap();
        let submenu = tree.append_submenu(file).unwrap();
        let open = tree.append_item(submenu, Some("Open")).unwrap();
        (tree, file, submenu, open)
    }

    #[test]
    fn test_descendants_are_document_order() {
        let (mut tree, file, submenu, open) = file_menu();
        let save = tree.append_item(submenu, Some("Save")).unwrap();
        let edit = tree.append_item(tree.root(), Some("Edit")).unwrap();

        assert_eq!(
            tree.descendants(tree.root()),
            vec![file, submenu, open, save, edit]
        );
        assert_eq!(tree.items(), vec![file, open, save, edit]);
    }

    #[test]
    fn test_closest_and_contains() {
        let (tree, file, submenu, open) = file_menu();
        assert_eq!(tree.closest(open, NodeKind::Submenu), Some(submenu));
        assert_eq!(tree.closest(open, NodeKind::Item), Some(open));
        assert_eq!(tree.closest(submenu, NodeKind::Item), Some(file));
        assert!(tree.contains(file, open));
        assert!(tree.contains(open, open));
        assert!(!tree.contains(open, file));
    }

    #[test]
    fn test_wrap_in_overlay_keeps_position() {
        let (mut tree, file, submenu, open) = file_menu();
        let label = tree.append_separator(file).unwrap();
        tree.set_attr(file, ATTR_ID, "file");

        let overlay = tree
            .wrap_in_overlay(submenu, Overlay::new("file", AnchorAlignment::BelowLeft))
            .unwrap();

        assert_eq!(tree.children(file), &[overlay, label]);
        assert_eq!(tree.parent(submenu), Some(overlay));
        assert_eq!(tree.closest(open, NodeKind::Overlay), Some(overlay));
        assert_eq!(tree.overlay(overlay).unwrap().anchor(), "file");
        assert!(tree.open_overlays().is_empty());

        tree.overlay_mut(overlay).unwrap().toggle_popover(true);
        assert_eq!(tree.open_overlays(), vec![overlay]);
    }

    #[test]
    fn test_generated_ids_skip_existing() {
        let (mut tree, file, _, _) = file_menu();
        tree.set_attr(file, ATTR_ID, "menu-node-1");
        assert_eq!(tree.generate_element_id(), "menu-node-2");
        assert_eq!(tree.find_by_element_id("menu-node-1"), Some(file));
    }

    #[test]
    fn test_foreign_ids_are_ignored() {
        let tree = MenuTree::new();
        let mut other = MenuTree::new();
        let foreign = other.append_item(other.root(), None).unwrap();
        assert_eq!(tree.parent(foreign), None);
        assert!(tree.children(foreign).is_empty());
        assert!(!tree.is_item(foreign));
    }

    #[test]
    fn test_largest_tab_index() {
        let (mut tree, file, _, open) = file_menu();
        assert_eq!(tree.largest_tab_index(), None);
        tree.set_attr(file, ATTR_TAB_INDEX, "3");
        tree.set_attr(open, ATTR_TAB_INDEX, "not a number");
        assert_eq!(tree.largest_tab_index(), Some(3));
    }
}
