//! Hover intent: the single "current item" of a menu and the debounced
//! auto-open that follows it.
//!
//! The cursor only changes through [`HoverIntent::set_cursor`], and every
//! change cancels the pending timer. A new timer is then scheduled by the
//! menu for the new item, so only the most recent target can ever fire.

use crate::tree::NodeId;
use std::time::{Duration, Instant};

/// Auto-open delay used when `auto-open-time` is absent or invalid.
pub const DEFAULT_AUTO_OPEN_TIME_MS: u64 = 500;

/// Delay before a hovered top-level item takes over an open menu.
pub const TOP_LEVEL_OPEN_DELAY: Duration = Duration::from_millis(10);

/// Cursor transition reported by [`HoverIntent::set_cursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorChange {
    pub current: Option<NodeId>,
    pub previous: Option<NodeId>,
}

/// A scheduled auto-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingOpen {
    pub target: NodeId,
    pub deadline: Instant,
    /// Top-level targets only act while some overlay is already open
    pub top_level: bool,
}

#[derive(Debug, Default)]
pub struct HoverIntent {
    cursor: Option<NodeId>,
    pending: Option<PendingOpen>,
}

impl HoverIntent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Option<NodeId> {
        self.cursor
    }

    pub fn pending(&self) -> Option<&PendingOpen> {
        self.pending.as_ref()
    }

    /// Move the cursor. Returns `None` (and leaves the timer alone) when the
    /// value is unchanged; otherwise cancels the pending timer and reports
    /// the transition.
    pub fn set_cursor(&mut self, item: Option<NodeId>) -> Option<CursorChange> {
        if self.cursor == item {
            return None;
        }

        let previous = std::mem::replace(&mut self.cursor, item);
        self.cancel();
        Some(CursorChange {
            current: item,
            previous,
        })
    }

    /// Schedule an auto-open for `target`, replacing any pending one.
    /// A delay too large to represent as a deadline leaves nothing pending.
    pub fn schedule(&mut self, target: NodeId, top_level: bool, delay: Duration, now: Instant) {
        let Some(deadline) = now.checked_add(delay) else {
            tracing::warn!("Auto-open delay {:?} is out of range; not scheduling", delay);
            self.pending = None;
            return;
        };
        self.pending = Some(PendingOpen {
            target,
            deadline,
            top_level,
        });
    }

    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::trace!("Cancelled pending auto-open of {:?}", pending.target);
        }
    }

    /// Take the pending auto-open if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<PendingOpen> {
        match self.pending {
            Some(pending) if pending.deadline <= now => self.pending.take(),
            _ => None,
        }
    }
}

/// Normalize an `auto-open-time` attribute value to whole milliseconds.
///
/// Absent, empty, unparsable and non-finite values fall back to the default;
/// negative values clamp to zero (auto-open disabled).
pub fn parse_auto_open_time(raw: Option<&str>) -> u64 {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return DEFAULT_AUTO_OPEN_TIME_MS;
    };
    match raw.parse::<f64>() {
        Ok(value) => normalize_auto_open_time(value),
        Err(_) => DEFAULT_AUTO_OPEN_TIME_MS,
    }
}

pub fn normalize_auto_open_time(value: f64) -> u64 {
    if !value.is_finite() {
        return DEFAULT_AUTO_OPEN_TIME_MS;
    }
    value.round().max(0.0) as u64
}
