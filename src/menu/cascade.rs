//! Opening and closing chains of nested overlays.
//!
//! At most one chain of overlays is open at a time: the overlays enclosing
//! some item plus, optionally, the overlay that item owns. Opening toward an
//! item closes everything outside its chain first.

use super::navigation::{ancestor_overlays, submenu_of};
use crate::overlay::Popover;
use crate::tree::{MenuTree, NodeId, NodeKind};

fn set_open(tree: &mut MenuTree, overlay: NodeId, open: bool) {
    if let Some(popover) = tree.overlay_mut(overlay) {
        popover.toggle_popover(open);
    }
}

fn is_open(tree: &MenuTree, overlay: NodeId) -> bool {
    tree.overlay(overlay).is_some_and(|popover| popover.is_open())
}

/// Open (or close) the overlay chain leading to `item`.
///
/// With `force == None` the direction toggles: it opens unless the item's own
/// overlay (or, for leaves, the innermost enclosing overlay) is already open.
/// Returns the direction that was applied.
pub fn open_toward(tree: &mut MenuTree, item: NodeId, force: Option<bool>) -> bool {
    let own = submenu_of(tree, item);
    let ancestors = ancestor_overlays(tree, item);

    let keep: Vec<NodeId> = own.iter().chain(ancestors.iter()).copied().collect();
    close_all(tree, &keep);

    let opening = match force {
        Some(force) => force,
        None => {
            let reference = own.or_else(|| ancestors.first().copied());
            !reference.is_some_and(|overlay| is_open(tree, overlay))
        }
    };

    for overlay in ancestors.iter().rev() {
        set_open(tree, *overlay, opening);
    }
    if let Some(overlay) = own {
        set_open(tree, overlay, opening);
    }

    refresh_focus_marks(tree);
    tracing::trace!("open_toward {:?}: opening={}", item, opening);
    opening
}

/// Close every open overlay except those that are, or enclose, one of
/// `exceptions`. Returns whether anything was closed.
pub fn close_all(tree: &mut MenuTree, exceptions: &[NodeId]) -> bool {
    let mut any_closed = false;
    for overlay in tree.open_overlays() {
        let excepted = exceptions
            .iter()
            .any(|exception| tree.contains(overlay, *exception));
        if excepted {
            continue;
        }
        if let Some(popover) = tree.overlay_mut(overlay) {
            popover.hide_popover();
            any_closed = true;
        }
    }

    refresh_focus_marks(tree);
    any_closed
}

/// Mark exactly the items that own an open overlay as focused.
pub fn refresh_focus_marks(tree: &mut MenuTree) {
    for item in tree.items() {
        if let Some(marks) = tree.marks_mut(item) {
            marks.has_focus = false;
        }
    }

    for overlay in tree.open_overlays() {
        let owner = tree
            .parent(overlay)
            .and_then(|parent| tree.closest(parent, NodeKind::Item));
        if let Some(marks) = owner.and_then(|item| tree.marks_mut(item)) {
            marks.has_focus = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{AnchorAlignment, Overlay};

    struct Fixture {
        tree: MenuTree,
        file: NodeId,
        recent: NodeId,
        recent_a: NodeId,
        edit: NodeId,
        file_overlay: NodeId,
        recent_overlay: NodeId,
        edit_overlay: NodeId,
    }

    /// `File > (Recent > (a)), Edit > (Undo)`
    fn fixture() -> Fixture {
        let mut tree = MenuTree::new();
        let root = tree.root();
        let file = tree.append_item(root, Some("File")).unwrap();
        let file_menu = tree.append_submenu(file).unwrap();
        let recent = tree.append_item(file_menu, Some("Recent")).unwrap();
        let recent_menu = tree.append_submenu(recent).unwrap();
        let recent_a = tree.append_item(recent_menu, Some("a")).unwrap();
        let edit = tree.append_item(root, Some("Edit")).unwrap();
        let edit_menu = tree.append_submenu(edit).unwrap();
        tree.append_item(edit_menu, Some("Undo")).unwrap();

        let file_overlay = tree
            .wrap_in_overlay(file_menu, Overlay::new("file", AnchorAlignment::BelowLeft))
            .unwrap();
        let recent_overlay = tree
            .wrap_in_overlay(recent_menu, Overlay::new("recent", AnchorAlignment::RightTop))
            .unwrap();
        let edit_overlay = tree
            .wrap_in_overlay(edit_menu, Overlay::new("edit", AnchorAlignment::BelowLeft))
            .unwrap();

        Fixture {
            tree,
            file,
            recent,
            recent_a,
            edit,
            file_overlay,
            recent_overlay,
            edit_overlay,
        }
    }

    #[test]
    fn test_forced_open_opens_whole_chain() {
        let mut f = fixture();
        assert!(open_toward(&mut f.tree, f.recent, Some(true)));
        assert_eq!(
            f.tree.open_overlays(),
            vec![f.file_overlay, f.recent_overlay]
        );
        assert!(f.tree.marks(f.file).unwrap().has_focus);
        assert!(f.tree.marks(f.recent).unwrap().has_focus);
        assert!(!f.tree.marks(f.edit).unwrap().has_focus);
    }

    #[test]
    fn test_opening_elsewhere_closes_other_chain() {
        let mut f = fixture();
        open_toward(&mut f.tree, f.recent_a, Some(true));
        open_toward(&mut f.tree, f.edit, Some(true));
        assert_eq!(f.tree.open_overlays(), vec![f.edit_overlay]);
        assert!(!f.tree.marks(f.file).unwrap().has_focus);
        assert!(f.tree.marks(f.edit).unwrap().has_focus);
    }

    #[test]
    fn test_unforced_toggles() {
        let mut f = fixture();
        assert!(open_toward(&mut f.tree, f.file, None));
        assert_eq!(f.tree.open_overlays(), vec![f.file_overlay]);
        assert!(!open_toward(&mut f.tree, f.file, None));
        assert!(f.tree.open_overlays().is_empty());
    }

    #[test]
    fn test_leaf_at_top_level_has_nothing_to_toggle() {
        let mut tree = MenuTree::new();
        let leaf = tree.append_item(tree.root(), Some("Help")).unwrap();
        assert!(open_toward(&mut tree, leaf, None));
        assert!(tree.open_overlays().is_empty());
    }

    #[test]
    fn test_close_all_respects_exceptions() {
        let mut f = fixture();
        open_toward(&mut f.tree, f.recent, Some(true));

        assert!(close_all(&mut f.tree, &[f.recent]));
        assert_eq!(f.tree.open_overlays(), vec![f.file_overlay]);
        assert!(f.tree.marks(f.file).unwrap().has_focus);
        assert!(!f.tree.marks(f.recent).unwrap().has_focus);

        assert!(close_all(&mut f.tree, &[]));
        assert!(!close_all(&mut f.tree, &[]));
        assert!(!f.tree.marks(f.file).unwrap().has_focus);
    }
}
