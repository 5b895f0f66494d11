// MenuTestHarness - a mounted menu wired to a router, a manual clock and an
// in-memory store, driven the way a host would drive it

use cascade_menu::config::MenuConfig;
use cascade_menu::input::handler::{InputContext, InputResult, MenuEvent, PointerTarget};
use cascade_menu::input::KeyInput;
use cascade_menu::menu::path::ItemPath;
use cascade_menu::storage::{MemoryStore, SharedStore};
use cascade_menu::time_source::TestTimeSource;
use cascade_menu::tree::{NodeId, NodeKind};
use cascade_menu::{InputRouter, Menu, MenuOptions, MountedMenu};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Menu definitions used across tests
pub mod menus {
    /// `File > (Open, Save)` with persistence enabled
    pub const FILE: &str = r#"{
        "id": "main",
        "items": [
            { "value": "File", "items": [ { "value": "Open" }, { "value": "Save" } ] }
        ]
    }"#;

    /// Three top-level leaves
    pub const FLAT: &str = r#"{
        "id": "flat",
        "items": [ { "value": "A" }, { "value": "B" }, { "value": "C" } ]
    }"#;

    /// A menu bar with two levels of nesting and a separator
    pub const BAR: &str = r#"{
        "id": "bar",
        "items": [
            { "value": "File", "items": [
                { "value": "New" },
                { "value": "Recent", "items": [
                    { "value": "One" },
                    { "value": "Two" }
                ]},
                { "separator": true },
                { "value": "Quit", "command": "/app/Quit" }
            ]},
            { "value": "Edit", "items": [ { "value": "Undo" }, { "value": "Redo" } ] },
            { "value": "Help" }
        ]
    }"#;

    /// Same shape as `FILE` but without an id
    pub const ANONYMOUS: &str = r#"{
        "items": [
            { "value": "File", "items": [ { "value": "Open" }, { "value": "Save" } ] }
        ]
    }"#;
}

pub struct MenuTestHarness {
    router: InputRouter,
    mounted: MountedMenu,
    siblings: Vec<MountedMenu>,
    menu: Rc<RefCell<Menu>>,
    clock: Arc<TestTimeSource>,
    ctx: InputContext,
}

impl MenuTestHarness {
    /// Mount the menu described by `json` with an empty in-memory store.
    pub fn new(json: &str) -> Self {
        Self::with_store(json, MemoryStore::shared())
    }

    /// Mount the menu described by `json` on top of an existing store.
    pub fn with_store(json: &str, store: SharedStore) -> Self {
        init_tracing();
        let clock = TestTimeSource::shared();
        let menu = build_menu(json, store, &clock);

        let mut router = InputRouter::new();
        let mounted = MountedMenu::mount(menu, &mut router);
        let menu = mounted.menu().clone();
        Self {
            router,
            mounted,
            siblings: Vec::new(),
            menu,
            clock,
            ctx: InputContext::new(),
        }
    }

    /// Mount another menu on the same router and clock, after this one.
    pub fn mount_sibling(&mut self, json: &str) -> Rc<RefCell<Menu>> {
        let menu = build_menu(json, MemoryStore::shared(), &self.clock);
        let mounted = MountedMenu::mount(menu, &mut self.router);
        let menu = mounted.menu().clone();
        self.siblings.push(mounted);
        menu
    }

    /// Click an item of any menu mounted on this router.
    pub fn click_in(&mut self, menu: &Rc<RefCell<Menu>>, path: &str) -> InputResult {
        let target = target_in(&menu.borrow(), path);
        self.router.dispatch_click(Some(target), &mut self.ctx)
    }

    pub fn menu(&self) -> Ref<'_, Menu> {
        self.menu.borrow()
    }

    pub fn menu_mut(&self) -> RefMut<'_, Menu> {
        self.menu.borrow_mut()
    }

    pub fn item(&self, path: &str) -> NodeId {
        item_in(&self.menu.borrow(), path)
    }

    fn target(&self, node: NodeId) -> PointerTarget {
        PointerTarget {
            menu: self.menu.borrow().instance_id(),
            node,
        }
    }

    /// Send a key-down through the router.
    pub fn send_key(&mut self, key: KeyInput) -> InputResult {
        self.router.dispatch_key(&key, &mut self.ctx)
    }

    /// Send a key given as a description such as `ctrl+KeyS`.
    pub fn press(&mut self, description: &str) -> InputResult {
        let key: KeyInput = description.parse().expect("valid key description");
        self.send_key(key)
    }

    pub fn hover(&mut self, path: &str) {
        let item = self.item(path);
        self.menu.borrow_mut().pointer_over(item);
    }

    pub fn focus(&mut self, path: &str) {
        let item = self.item(path);
        self.menu.borrow_mut().focus_in(item);
    }

    /// Pointer and focus leave the menu.
    pub fn leave(&mut self) {
        let mut menu = self.menu.borrow_mut();
        menu.pointer_out(None);
        menu.focus_out(None);
    }

    pub fn click(&mut self, path: &str) -> InputResult {
        let target = self.target(self.item(path));
        self.router.dispatch_click(Some(target), &mut self.ctx)
    }

    /// Click on the menu itself, away from any item.
    pub fn click_menu_background(&mut self) -> InputResult {
        let root = self.menu.borrow().tree().root();
        let target = self.target(root);
        self.router.dispatch_click(Some(target), &mut self.ctx)
    }

    pub fn click_outside(&mut self) -> InputResult {
        self.router.dispatch_click(None, &mut self.ctx)
    }

    /// Advance the clock and run due timers. Returns whether one fired.
    pub fn advance(&mut self, millis: u64) -> bool {
        self.clock.advance(Duration::from_millis(millis));
        self.menu.borrow_mut().poll_timers()
    }

    pub fn cursor_path(&self) -> Option<String> {
        let menu = self.menu.borrow();
        menu.current_item()
            .map(|item| menu.path_of(item).to_string())
    }

    /// Paths of the items whose overlays are open, outermost first.
    pub fn open_paths(&self) -> Vec<String> {
        open_paths_in(&self.menu.borrow())
    }

    pub fn take_events(&mut self) -> Vec<MenuEvent> {
        self.ctx.drain()
    }

    /// Commands of the `Selected` events since the last call.
    pub fn take_selected(&mut self) -> Vec<String> {
        self.take_events()
            .into_iter()
            .filter_map(|event| match event {
                MenuEvent::Selected { command, .. } => Some(command.to_string()),
                _ => None,
            })
            .collect()
    }

    pub fn shortcut_hint(&self, path: &str) -> Option<String> {
        let item = self.item(path);
        self.menu
            .borrow()
            .tree()
            .marks(item)
            .and_then(|marks| marks.shortcut_hint.clone())
    }

    /// Unsubscribe and unmount every menu; returns the router so tests can
    /// inspect it.
    pub fn unmount(self) -> InputRouter {
        let mut router = self.router;
        self.mounted.unmount(&mut router);
        for sibling in self.siblings {
            sibling.unmount(&mut router);
        }
        router
    }
}

/// Send `tracing` output to the test writer; only the first call installs it.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cascade_menu=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

fn build_menu(json: &str, store: SharedStore, clock: &Arc<TestTimeSource>) -> Menu {
    let config: MenuConfig = serde_json::from_str(json).expect("valid menu json");
    Menu::new(config.build_tree(), store, clock.clone()).with_options(MenuOptions {
        tab_index_floor: config.tab_index_floor,
    })
}

pub fn item_in(menu: &Menu, path: &str) -> NodeId {
    menu.item_at(&ItemPath::from(path))
        .unwrap_or_else(|| panic!("no item at {path}"))
}

/// Pointer target for the item at `path` of `menu`.
pub fn target_in(menu: &Menu, path: &str) -> PointerTarget {
    PointerTarget {
        menu: menu.instance_id(),
        node: item_in(menu, path),
    }
}

/// Paths of the items whose overlays are open in `menu`, outermost first.
pub fn open_paths_in(menu: &Menu) -> Vec<String> {
    let tree = menu.tree();
    tree.open_overlays()
        .into_iter()
        .filter_map(|overlay| tree.parent(overlay))
        .filter_map(|parent| tree.closest(parent, NodeKind::Item))
        .map(|item| menu.path_of(item).to_string())
        .collect()
}
