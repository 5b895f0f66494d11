// Property-based tests using proptest
// These tests generate random input sequences and check menu invariants

mod common;

use cascade_menu::input::encoding::{decode, display_label, encode};
use cascade_menu::input::{KeyInput, Modifiers};
use cascade_menu::menu::keybindings::{KeybindingRegistry, STORE_KEY, STORE_NAMESPACE};
use cascade_menu::menu::navigation::{ancestor_overlays, next_sibling, previous_sibling, submenu_of};
use cascade_menu::menu::path::ItemPath;
use cascade_menu::storage::{KeyValueStore, MemoryStore};
use common::harness::{menus, MenuTestHarness};
use proptest::prelude::*;
use std::collections::HashSet;

/// Every item path of `menus::BAR`
const BAR_PATHS: &[&str] = &[
    "/File",
    "/File/New",
    "/File/Recent",
    "/File/Recent/One",
    "/File/Recent/Two",
    "/app/Quit",
    "/Edit",
    "/Edit/Undo",
    "/Edit/Redo",
    "/Help",
];

const TOP_LEVEL_PATHS: &[&str] = &["/File", "/Edit", "/Help"];

const KEYS: &[&str] = &[
    "ArrowUp",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
    "Enter",
    "Space",
    "Escape",
    "ctrl+KeyS",
    "KeyX",
];

/// Random user interactions
#[derive(Debug, Clone)]
enum MenuOp {
    Press(&'static str),
    Hover(&'static str),
    Focus(&'static str),
    Click(&'static str),
    ClickOutside,
    Leave,
    Wait(u64),
}

impl MenuOp {
    /// Apply this operation to the test harness
    fn apply(&self, harness: &mut MenuTestHarness) {
        match self {
            Self::Press(key) => {
                harness.press(key);
            }
            Self::Hover(path) => harness.hover(path),
            Self::Focus(path) => harness.focus(path),
            Self::Click(path) => {
                harness.click(path);
            }
            Self::ClickOutside => {
                harness.click_outside();
            }
            Self::Leave => harness.leave(),
            Self::Wait(millis) => {
                harness.advance(*millis);
            }
        }
    }
}

fn menu_op_strategy() -> impl Strategy<Value = MenuOp> {
    prop_oneof![
        // Keyboard navigation (most common)
        5 => prop::sample::select(KEYS).prop_map(MenuOp::Press),
        2 => prop::sample::select(BAR_PATHS).prop_map(MenuOp::Hover),
        2 => prop::sample::select(BAR_PATHS).prop_map(MenuOp::Focus),
        1 => prop::sample::select(BAR_PATHS).prop_map(MenuOp::Click),
        1 => Just(MenuOp::ClickOutside),
        1 => Just(MenuOp::Leave),
        2 => prop_oneof![Just(10u64), Just(250), Just(500)].prop_map(MenuOp::Wait),
    ]
}

fn modifiers_strategy() -> impl Strategy<Value = Modifiers> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(alt, ctrl, shift, meta)| Modifiers {
            alt,
            ctrl,
            shift,
            meta,
        },
    )
}

fn key_strategy() -> impl Strategy<Value = KeyInput> {
    (
        prop_oneof![
            "Key[A-Z]",
            "Digit[0-9]",
            Just("F5".to_string()),
            Just("ArrowUp".to_string()),
        ],
        modifiers_strategy(),
    )
        .prop_map(|(code, modifiers)| KeyInput::new(code).with_modifiers(modifiers))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 100,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    /// Property test: open overlays always form a single nested chain
    #[test]
    fn prop_open_overlays_form_one_chain(ops in prop::collection::vec(menu_op_strategy(), 1..40)) {
        let mut harness = MenuTestHarness::new(menus::BAR);

        for op in &ops {
            op.apply(&mut harness);

            let open = harness.open_paths();
            for pair in open.windows(2) {
                prop_assert!(
                    pair[1].starts_with(&format!("{}/", pair[0])),
                    "Overlays {:?} are not nested after {:?}\nOperations: {:#?}",
                    open,
                    op,
                    ops
                );
            }
        }
    }

    /// Property test: the cursor is always an existing item or nothing
    #[test]
    fn prop_cursor_is_a_known_item(ops in prop::collection::vec(menu_op_strategy(), 1..40)) {
        let mut harness = MenuTestHarness::new(menus::BAR);

        for op in &ops {
            op.apply(&mut harness);
            if let Some(path) = harness.cursor_path() {
                prop_assert!(
                    BAR_PATHS.contains(&path.as_str()),
                    "Unknown cursor {} after {:?}",
                    path,
                    op
                );
            }
        }
    }

    /// Property test: opening toward an item leaves exactly its chain open
    #[test]
    fn prop_open_toward_opens_exactly_the_chain(
        first in prop::sample::select(BAR_PATHS),
        second in prop::sample::select(BAR_PATHS),
    ) {
        let harness = MenuTestHarness::new(menus::BAR);

        for path in [first, second] {
            let item = harness.item(path);
            harness.menu_mut().open_toward(item, Some(true));

            let menu = harness.menu();
            let tree = menu.tree();
            let mut expected = ancestor_overlays(tree, item);
            expected.reverse();
            expected.extend(submenu_of(tree, item));
            prop_assert_eq!(tree.open_overlays(), expected);
        }
    }

    /// Property test: wrapping sibling navigation visits every top-level item
    #[test]
    fn prop_top_level_navigation_cycles(start in prop::sample::select(TOP_LEVEL_PATHS)) {
        let harness = MenuTestHarness::new(menus::BAR);
        let menu = harness.menu();
        let tree = menu.tree();
        let origin = harness.item(start);

        let mut forward = origin;
        let mut backward = origin;
        let mut seen = HashSet::new();
        for _ in 0..3 {
            seen.insert(forward);
            forward = next_sibling(tree, forward, true).unwrap();
            backward = previous_sibling(tree, backward, true).unwrap();
        }
        prop_assert_eq!(forward, origin);
        prop_assert_eq!(backward, origin);
        prop_assert_eq!(seen.len(), 3);
    }

    /// Property test: encoding keeps the modifiers and the physical code
    #[test]
    fn prop_encoding_preserves_key(key in key_strategy()) {
        let encoded = encode(&key);
        let decoded = decode(encoded.as_str()).unwrap();
        prop_assert_eq!(decoded.modifiers(), key.modifiers);
        prop_assert_eq!(&decoded.code, &key.code);
    }

    /// Property test: labels never fail, whatever the stored text
    #[test]
    fn prop_display_label_accepts_any_text(text in ".{0,12}") {
        let label = display_label(&text);
        if decode(&text).is_none() {
            prop_assert!(label.is_empty());
        }
    }

    /// Property test: a key and a path each appear in at most one binding,
    /// and the store always mirrors the registry
    #[test]
    fn prop_bindings_stay_one_to_one(
        assignments in prop::collection::vec(
            (prop::sample::select(BAR_PATHS), key_strategy()),
            1..30,
        )
    ) {
        let store = MemoryStore::shared();
        let mut registry = KeybindingRegistry::new(store.clone(), Some("bar".to_string()));

        for (path, key) in &assignments {
            registry.assign(ItemPath::from(*path), key).unwrap();

            let paths: Vec<&ItemPath> = registry.bindings().values().collect();
            let unique: HashSet<&ItemPath> = paths.iter().copied().collect();
            prop_assert_eq!(paths.len(), unique.len());
            prop_assert_eq!(registry.lookup(&encode(key)).map(ItemPath::as_str), Some(*path));
        }

        let stored = store.get(STORE_NAMESPACE, "bar", STORE_KEY).unwrap();
        prop_assert_eq!(stored, serde_json::to_value(registry.bindings()).unwrap());

        let mut reloaded = KeybindingRegistry::new(store, Some("bar".to_string()));
        reloaded.load();
        prop_assert_eq!(reloaded.bindings(), registry.bindings());
    }
}
