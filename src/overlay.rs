//! Popover overlays that wrap submenus.
//!
//! An overlay is the floating surface a submenu lives in. The menu engine only
//! ever talks to it through the [`Popover`] contract: read whether it is open,
//! toggle it to an explicit state, or hide it. Anchoring is fixed when the
//! overlay is created at mount time.

use serde::{Deserialize, Serialize};

/// The two-method contract the menu engine relies on.
pub trait Popover {
    /// Whether the popover is currently shown.
    fn is_open(&self) -> bool;

    /// Show (`true`) or hide (`false`) the popover.
    fn toggle_popover(&mut self, force: bool);

    /// Hide the popover.
    fn hide_popover(&mut self) {
        self.toggle_popover(false);
    }
}

/// Where an overlay is placed relative to its anchor item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorAlignment {
    /// Below the anchor, left edges aligned (top-level items in a menu bar)
    BelowLeft,
    /// To the right of the anchor, top edges aligned (nested items)
    RightTop,
}

impl AnchorAlignment {
    /// Alignment descriptor in `anchor-x anchor-y self-x self-y` form.
    pub fn descriptor(self) -> &'static str {
        match self {
            AnchorAlignment::BelowLeft => "0.0 1.0 0.0 0.0",
            AnchorAlignment::RightTop => "1.0 0.0 0.0 0.0",
        }
    }

    pub fn for_item(top_level: bool) -> Self {
        if top_level {
            AnchorAlignment::BelowLeft
        } else {
            AnchorAlignment::RightTop
        }
    }
}

/// Overlay state stored on an overlay node of the menu tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    open: bool,
    /// Element id of the item this overlay is anchored to
    anchor: String,
    alignment: AnchorAlignment,
}

impl Overlay {
    /// Create a closed overlay anchored to the element with id `anchor`.
    pub fn new(anchor: impl Into<String>, alignment: AnchorAlignment) -> Self {
        Self {
            open: false,
            anchor: anchor.into(),
            alignment,
        }
    }

    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    pub fn alignment(&self) -> AnchorAlignment {
        self.alignment
    }
}

impl Popover for Overlay {
    fn is_open(&self) -> bool {
        self.open
    }

    fn toggle_popover(&mut self, force: bool) {
        self.open = force;
    }

    fn hide_popover(&mut self) {
        self.open = false;
    }
}
