//! A mounted menu instance.
//!
//! [`Menu`] owns its tree, its keybinding registry, the hover cursor and the
//! pending auto-open timer. Hosts forward pointer and focus events to it,
//! route document-level key and click events to it through
//! [`InputHandler`], and call [`Menu::poll_timers`] from their event loop.

pub mod cascade;
pub mod dispatch;
pub mod hover;
pub mod keybindings;
pub mod navigation;
pub mod path;

use crate::input::handler::{InputContext, InputHandler, InputResult, MenuEvent, PointerTarget};
use crate::input::key::KeyInput;
use crate::overlay::{AnchorAlignment, Overlay, Popover};
use crate::storage::SharedStore;
use crate::time_source::SharedTimeSource;
use crate::tree::{MenuTree, NodeId, NodeKind, ATTR_AUTO_OPEN_TIME, ATTR_ID, ATTR_TAB_INDEX};
use hover::{CursorChange, HoverIntent, TOP_LEVEL_OPEN_DELAY};
use keybindings::{Assignment, KeybindingRegistry};
use navigation::{is_top_level, submenu_of};
use path::ItemPath;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a menu instance, used to tell which menu a
/// pointer target belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuInstanceId(u64);

impl MenuInstanceId {
    pub fn next() -> Self {
        Self(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Host-provided settings that do not live in the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuOptions {
    /// Largest tab index already used elsewhere in the document; generated
    /// tab indices start above it.
    pub tab_index_floor: Option<i32>,
}

pub struct Menu {
    instance: MenuInstanceId,
    tree: MenuTree,
    options: MenuOptions,
    registry: KeybindingRegistry,
    /// Items showing a shortcut hint, by path
    hint_targets: BTreeMap<ItemPath, Vec<NodeId>>,
    hover: HoverIntent,
    /// Node currently under the pointer
    pointer: Option<NodeId>,
    /// Node holding input focus
    focused: Option<NodeId>,
    time_source: SharedTimeSource,
    mounted: bool,
}

impl std::fmt::Debug for Menu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Menu")
            .field("instance", &self.instance)
            .field("element_id", &self.element_id())
            .field("cursor", &self.hover.cursor())
            .field("focused", &self.focused)
            .field("mounted", &self.mounted)
            .finish()
    }
}

impl Menu {
    pub fn new(tree: MenuTree, store: SharedStore, time_source: SharedTimeSource) -> Self {
        let element_id = tree.element_id(tree.root()).map(str::to_string);
        Self {
            instance: MenuInstanceId::next(),
            registry: KeybindingRegistry::new(store, element_id),
            tree,
            options: MenuOptions::default(),
            hint_targets: BTreeMap::new(),
            hover: HoverIntent::new(),
            pointer: None,
            focused: None,
            time_source,
            mounted: false,
        }
    }

    pub fn with_options(mut self, options: MenuOptions) -> Self {
        self.options = options;
        self
    }

    pub fn instance_id(&self) -> MenuInstanceId {
        self.instance
    }

    /// The menu's `id` attribute.
    pub fn element_id(&self) -> Option<&str> {
        self.tree.element_id(self.tree.root())
    }

    pub fn tree(&self) -> &MenuTree {
        &self.tree
    }

    pub fn registry(&self) -> &KeybindingRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut KeybindingRegistry {
        &mut self.registry
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Prepare the tree and load persisted keybindings.
    ///
    /// Assigns missing element ids and tab indices, creates shortcut hints,
    /// and wraps every submenu in an overlay anchored to its owning item.
    /// Running it again leaves an already mounted tree unchanged.
    pub fn mount(&mut self) {
        self.registry.load();

        let largest = self
            .tree
            .largest_tab_index()
            .into_iter()
            .chain(self.options.tab_index_floor)
            .max()
            .unwrap_or(0);
        let mut next_tab_index = largest.saturating_add(1);
        let has_id = self.registry.instance_id().is_some();
        self.hint_targets.clear();

        for item in self.tree.items() {
            if self.tree.element_id(item).is_none() {
                let id = self.tree.generate_element_id();
                self.tree.set_attr(item, ATTR_ID, id);
            }

            if self.tree.attr(item, ATTR_TAB_INDEX).map_or(true, str::is_empty) {
                self.tree
                    .set_attr(item, ATTR_TAB_INDEX, next_tab_index.to_string());
                next_tab_index = next_tab_index.saturating_add(1);
            }

            if has_id && !is_top_level(&self.tree, item) {
                let item_path = path::path_of(&self.tree, item);
                let label = self.registry.label_for(&item_path);
                if let Some(marks) = self.tree.marks_mut(item) {
                    marks.shortcut_hint = Some(label);
                }
                self.hint_targets.entry(item_path).or_default().push(item);
            }
        }

        let mut wrapped = 0;
        for submenu in self.tree.select(NodeKind::Submenu) {
            if self.tree.parent(submenu).is_some_and(|p| self.tree.is_overlay(p)) {
                continue;
            }
            if self.tree.element_id(submenu).is_none() {
                let id = self.tree.generate_element_id();
                self.tree.set_attr(submenu, ATTR_ID, id);
            }

            let owner = self
                .tree
                .parent(submenu)
                .and_then(|parent| self.tree.closest(parent, NodeKind::Item));
            let overlay = match owner {
                Some(item) => Overlay::new(
                    self.tree.element_id(item).unwrap_or_default(),
                    AnchorAlignment::for_item(is_top_level(&self.tree, item)),
                ),
                None => Overlay::new("", AnchorAlignment::BelowLeft),
            };

            let Some(wrapper) = self.tree.wrap_in_overlay(submenu, overlay) else {
                continue;
            };
            let id = self.tree.generate_element_id();
            self.tree.set_attr(wrapper, ATTR_ID, id);
            if let Some(marks) = owner.and_then(|item| self.tree.marks_mut(item)) {
                marks.has_submenu = true;
            }
            wrapped += 1;
        }

        self.mounted = true;
        tracing::debug!(
            "Mounted menu {:?} ({:?}): {} items, {} submenus wrapped, {} keybindings",
            self.instance,
            self.element_id(),
            self.tree.items().len(),
            wrapped,
            self.registry.len()
        );
    }

    /// Cancel pending work and drop label observers.
    pub fn unmount(&mut self) {
        self.hover.cancel();
        self.registry.clear_observers();
        self.mounted = false;
        tracing::debug!("Unmounted menu {:?}", self.instance);
    }

    /// Auto-open delay in milliseconds; 0 disables hover auto-open.
    pub fn auto_open_time(&self) -> u64 {
        hover::parse_auto_open_time(self.tree.attr(self.tree.root(), ATTR_AUTO_OPEN_TIME))
    }

    pub fn set_auto_open_time(&mut self, value: f64) {
        let value = hover::normalize_auto_open_time(value);
        let root = self.tree.root();
        self.tree
            .set_attr(root, ATTR_AUTO_OPEN_TIME, value.to_string());
    }

    pub fn any_open(&self) -> bool {
        !self.tree.open_overlays().is_empty()
    }

    /// Whether `item` owns a submenu.
    pub fn is_expandable(&self, item: NodeId) -> bool {
        submenu_of(&self.tree, item).is_some()
    }

    /// Whether the submenu `item` owns is open.
    pub fn is_expanded(&self, item: NodeId) -> bool {
        submenu_of(&self.tree, item)
            .and_then(|overlay| self.tree.overlay(overlay))
            .is_some_and(|overlay| overlay.is_open())
    }

    pub fn is_pointer_hovered(&self, item: NodeId) -> bool {
        self.pointer
            .is_some_and(|pointer| self.tree.contains(item, pointer))
    }

    pub fn current_item(&self) -> Option<NodeId> {
        self.hover.cursor()
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn path_of(&self, item: NodeId) -> ItemPath {
        path::path_of(&self.tree, item)
    }

    pub fn item_at(&self, path: &ItemPath) -> Option<NodeId> {
        path::item_at(&self.tree, path)
    }

    /// Move the cursor. Setting the current value again does nothing.
    pub fn set_current_item(&mut self, item: Option<NodeId>) {
        if let Some(change) = self.hover.set_cursor(item) {
            self.on_cursor_change(change);
        }
    }

    fn on_cursor_change(&mut self, change: CursorChange) {
        tracing::trace!("Cursor {:?} -> {:?}", change.previous, change.current);
        let Some(item) = change.current else {
            return;
        };

        let auto_open_time = self.auto_open_time();
        if auto_open_time == 0 {
            return;
        }

        let top_level = is_top_level(&self.tree, item);
        let delay = if top_level {
            TOP_LEVEL_OPEN_DELAY
        } else {
            Duration::from_millis(auto_open_time)
        };
        self.hover
            .schedule(item, top_level, delay, self.time_source.now());
    }

    /// When the pending auto-open (if any) is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.hover.pending().map(|pending| pending.deadline)
    }

    /// Run the pending auto-open if its deadline has passed. Returns whether
    /// a task fired.
    pub fn poll_timers(&mut self) -> bool {
        let Some(task) = self.hover.take_due(self.time_source.now()) else {
            return false;
        };

        if task.top_level && !self.any_open() {
            return true;
        }

        if self.is_expandable(task.target) {
            self.open_toward(task.target, Some(true));
        } else {
            self.close_all(&[task.target]);
        }
        tracing::trace!("Auto-open fired for {:?}", task.target);
        true
    }

    /// The pointer moved onto `node`.
    pub fn pointer_over(&mut self, node: NodeId) {
        self.pointer = Some(node);
        let item = self.tree.closest(node, NodeKind::Item);
        self.set_current_item(item);
    }

    /// The pointer left a node. `related` is where it went; leaving the menu
    /// entirely clears the cursor.
    pub fn pointer_out(&mut self, related: Option<PointerTarget>) {
        if !self.owns(related) {
            self.pointer = None;
            self.set_current_item(None);
        }
    }

    /// Input focus moved onto `node`.
    pub fn focus_in(&mut self, node: NodeId) {
        self.focused = Some(node);
        let item = self.tree.closest(node, NodeKind::Item);
        self.set_current_item(item);
    }

    /// Input focus left a node for `related`.
    pub fn focus_out(&mut self, related: Option<PointerTarget>) {
        if !self.owns(related) {
            self.focused = None;
            self.set_current_item(None);
        }
    }

    fn owns(&self, target: Option<PointerTarget>) -> bool {
        target.is_some_and(|target| target.menu == self.instance)
    }

    pub fn open_toward(&mut self, item: NodeId, force: Option<bool>) -> bool {
        cascade::open_toward(&mut self.tree, item, force)
    }

    pub fn close_all(&mut self, exceptions: &[NodeId]) -> bool {
        cascade::close_all(&mut self.tree, exceptions)
    }

    /// Open the cascade to `item` and give it input focus.
    pub fn focus_item(&mut self, item: NodeId, ctx: &mut InputContext) {
        self.open_toward(item, Some(true));
        self.focus_in(item);
        ctx.emit(MenuEvent::FocusItem {
            menu: self.instance,
            item,
        });
    }

    /// Open a branch, or select a leaf.
    pub fn activate(&mut self, item: NodeId, ctx: &mut InputContext) {
        if self.is_expandable(item) {
            self.open_toward(item, Some(true));
            return;
        }

        self.close_all(&[]);
        self.focus_in(item);
        ctx.emit(MenuEvent::FocusItem {
            menu: self.instance,
            item,
        });

        let command = self.path_of(item);
        tracing::debug!("Selected {}", command);
        ctx.emit(MenuEvent::Selected {
            menu: self.instance,
            item,
            command,
        });
    }

    /// Bind the key of `event` to `item` and update shortcut hints.
    pub fn assign_keybinding(
        &mut self,
        item: NodeId,
        event: &KeyInput,
        ctx: &mut InputContext,
    ) -> bool {
        let command = self.path_of(item);
        let Some(Assignment {
            keybinding,
            changes,
        }) = self.registry.assign(command.clone(), event)
        else {
            return false;
        };

        for change in changes {
            self.refresh_hints(&change.path, &change.label);
        }

        ctx.emit(MenuEvent::BindingAssigned {
            menu: self.instance,
            keybinding,
            command,
        });
        true
    }

    /// Show `label` on every hint-bearing item whose path is `path`.
    fn refresh_hints(&mut self, path: &ItemPath, label: &str) {
        let Some(targets) = self.hint_targets.get(path) else {
            return;
        };
        for target in targets {
            if let Some(marks) = self.tree.marks_mut(*target) {
                marks.shortcut_hint = Some(label.to_string());
            }
        }
    }
}

impl InputHandler for Menu {
    fn handle_key_event(&mut self, event: &KeyInput, ctx: &mut InputContext) -> InputResult {
        dispatch::handle_key(self, event, ctx)
    }

    fn handle_click(
        &mut self,
        target: Option<PointerTarget>,
        ctx: &mut InputContext,
    ) -> InputResult {
        dispatch::handle_click(self, target, ctx)
    }
}
