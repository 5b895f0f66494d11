//! Key and pointer dispatch for a menu.
//!
//! Key handling is split in two: [`resolve`] inspects the menu and the event
//! and picks a [`KeyAction`] without changing anything; [`apply`] carries the
//! action out.

use super::navigation::{
    first_child_item, is_top_level, next_sibling, parent_item, previous_sibling,
    root_ancestor_item,
};
use super::path::item_at;
use super::Menu;
use crate::input::encoding::encode;
use crate::input::handler::{InputContext, InputResult, PointerTarget};
use crate::input::key::KeyInput;
use crate::tree::{NodeId, NodeKind};

/// Sibling navigation between top-level items wraps around.
const WRAP_AROUND: bool = true;

/// What a key press should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Not for us; let the event through
    Ignore,
    /// Activate the item bound to the pressed key
    Shortcut(NodeId),
    /// Bind the pressed key to the hovered leaf
    Capture(NodeId),
    /// Close every open overlay
    CloseAll,
    /// Activate the item
    Activate(NodeId),
    /// Open the cascade to the item and move focus to it
    Focus(NodeId),
    /// Open or close the overlay chain of the item
    Toggle { item: NodeId, force: Option<bool> },
}

fn focus(target: Option<NodeId>) -> KeyAction {
    target.map_or(KeyAction::Ignore, KeyAction::Focus)
}

/// Pick the action for a key press.
pub fn resolve(menu: &Menu, event: &KeyInput) -> KeyAction {
    if event.is_modifier_only() {
        return KeyAction::Ignore;
    }

    let tree = &menu.tree;
    let cursor = menu.current_item();

    if !menu.any_open() && cursor.is_none() {
        let Some(path) = menu.registry.lookup(&encode(event)) else {
            return KeyAction::Ignore;
        };
        if let Some(item) = item_at(tree, path) {
            return KeyAction::Shortcut(item);
        }
        tracing::debug!("Keybinding {} points at missing item {}", encode(event), path);
    }

    if let Some(item) = cursor {
        if menu.registry.instance_id().is_some()
            && event.is_bindable()
            && event.modifiers.any()
            && !menu.is_expandable(item)
            && menu.is_pointer_hovered(item)
        {
            return KeyAction::Capture(item);
        }
    }

    if event.code == "Escape" {
        return if menu.any_open() {
            KeyAction::CloseAll
        } else {
            KeyAction::Ignore
        };
    }

    let Some(item) = cursor else {
        return KeyAction::Ignore;
    };
    let top_level = is_top_level(tree, item);

    match event.code.as_str() {
        "Space" | "Enter" => KeyAction::Activate(item),
        "ArrowRight" if top_level => focus(next_sibling(tree, item, WRAP_AROUND)),
        "ArrowRight" if menu.is_expandable(item) => {
            if menu.is_expanded(item) {
                focus(first_child_item(tree, item))
            } else {
                KeyAction::Toggle { item, force: None }
            }
        }
        "ArrowRight" => focus(
            root_ancestor_item(tree, item)
                .and_then(|root| next_sibling(tree, root, WRAP_AROUND))
                .and_then(|next| first_child_item(tree, next)),
        ),
        "ArrowLeft" if top_level => focus(previous_sibling(tree, item, WRAP_AROUND)),
        "ArrowLeft" => match parent_item(tree, item) {
            Some(parent) if is_top_level(tree, parent) => focus(
                previous_sibling(tree, parent, WRAP_AROUND)
                    .and_then(|previous| first_child_item(tree, previous)),
            ),
            parent => focus(parent),
        },
        "ArrowDown" if top_level => {
            if menu.is_expanded(item) {
                focus(first_child_item(tree, item))
            } else {
                KeyAction::Toggle {
                    item,
                    force: Some(true),
                }
            }
        }
        "ArrowDown" => focus(next_sibling(tree, item, false)),
        "ArrowUp" if top_level => {
            if menu.is_expanded(item) {
                KeyAction::Toggle {
                    item,
                    force: Some(false),
                }
            } else {
                KeyAction::Ignore
            }
        }
        "ArrowUp" => match previous_sibling(tree, item, false) {
            Some(previous) => KeyAction::Focus(previous),
            None => focus(parent_item(tree, item).filter(|parent| is_top_level(tree, *parent))),
        },
        _ => KeyAction::Ignore,
    }
}

/// Carry out `action`.
pub fn apply(
    menu: &mut Menu,
    action: KeyAction,
    event: &KeyInput,
    ctx: &mut InputContext,
) -> InputResult {
    match action {
        KeyAction::Ignore => InputResult::Ignored,
        KeyAction::Shortcut(item) | KeyAction::Activate(item) => {
            menu.activate(item, ctx);
            InputResult::Consumed
        }
        KeyAction::Capture(item) => {
            menu.assign_keybinding(item, event, ctx);
            InputResult::Consumed
        }
        KeyAction::CloseAll => menu.close_all(&[]).into(),
        KeyAction::Focus(item) => {
            menu.focus_item(item, ctx);
            InputResult::Consumed
        }
        KeyAction::Toggle { item, force } => {
            menu.open_toward(item, force);
            InputResult::Consumed
        }
    }
}

pub fn handle_key(menu: &mut Menu, event: &KeyInput, ctx: &mut InputContext) -> InputResult {
    let action = resolve(menu, event);
    if action != KeyAction::Ignore {
        tracing::trace!("Key {} -> {:?}", encode(event), action);
    }
    apply(menu, action, event, ctx)
}

/// A click anywhere in the document.
///
/// Clicks outside this menu close it and are left alone. Clicks on an item
/// activate it and are consumed.
pub fn handle_click(
    menu: &mut Menu,
    target: Option<PointerTarget>,
    ctx: &mut InputContext,
) -> InputResult {
    let Some(target) = target.filter(|target| target.menu == menu.instance_id()) else {
        menu.close_all(&[]);
        return InputResult::Ignored;
    };

    match menu.tree.closest(target.node, NodeKind::Item) {
        Some(item) => {
            menu.activate(item, ctx);
            InputResult::Consumed
        }
        None => InputResult::Ignored,
    }
}
