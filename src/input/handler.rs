//! Input handling contract between the host event loop and menus.
//!
//! Hosts feed key and pointer events to an [`InputHandler`]. The handler
//! reports whether it consumed the event (the host must then stop propagation
//! and suppress the default action) and records what happened as
//! [`MenuEvent`]s in the [`InputContext`], which the host drains after
//! dispatch.
//!
//! There is no bubbling: a consumed event is never offered to another handler.

use super::encoding::EncodedKeybinding;
use super::key::KeyInput;
use crate::menu::path::ItemPath;
use crate::menu::MenuInstanceId;
use crate::tree::NodeId;

/// Result of handling an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResult {
    /// The input was handled - stop propagation and prevent the default.
    Consumed,
    /// The input was not handled - pass it through untouched.
    Ignored,
}

impl InputResult {
    /// Returns true if the input was consumed.
    pub fn is_consumed(self) -> bool {
        self == InputResult::Consumed
    }

    /// Combines two results - consumed if either is consumed.
    pub fn or(self, other: InputResult) -> InputResult {
        if self == InputResult::Consumed || other == InputResult::Consumed {
            InputResult::Consumed
        } else {
            InputResult::Ignored
        }
    }
}

impl From<bool> for InputResult {
    fn from(handled: bool) -> Self {
        if handled {
            InputResult::Consumed
        } else {
            InputResult::Ignored
        }
    }
}

/// Something a menu did while handling input that the host may react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
    /// A leaf item was activated
    Selected {
        menu: MenuInstanceId,
        item: NodeId,
        command: ItemPath,
    },
    /// Input focus should move to this item
    FocusItem { menu: MenuInstanceId, item: NodeId },
    /// A custom keybinding was captured and persisted
    BindingAssigned {
        menu: MenuInstanceId,
        keybinding: EncodedKeybinding,
        command: ItemPath,
    },
}

/// Context passed to input handlers.
#[derive(Debug, Default)]
pub struct InputContext {
    /// Events produced while handling input, in order.
    pub events: Vec<MenuEvent>,
}

impl InputContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: MenuEvent) {
        self.events.push(event);
    }

    /// Take all recorded events, leaving the context empty.
    pub fn drain(&mut self) -> Vec<MenuEvent> {
        std::mem::take(&mut self.events)
    }

    /// Commands of all `Selected` events, in order.
    pub fn selected_commands(&self) -> Vec<&ItemPath> {
        self.events
            .iter()
            .filter_map(|event| match event {
                MenuEvent::Selected { command, .. } => Some(command),
                _ => None,
            })
            .collect()
    }
}

/// A node of a specific menu instance, used as a pointer event target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerTarget {
    pub menu: MenuInstanceId,
    pub node: NodeId,
}

/// Trait for elements that receive document-level input.
pub trait InputHandler {
    /// Handle a key-down event. Returns whether the event was consumed.
    fn handle_key_event(&mut self, event: &KeyInput, ctx: &mut InputContext) -> InputResult;

    /// Handle a click. `target` is `None` when the click hit nothing a menu
    /// knows about.
    fn handle_click(
        &mut self,
        _target: Option<PointerTarget>,
        _ctx: &mut InputContext,
    ) -> InputResult {
        InputResult::Ignored
    }
}
