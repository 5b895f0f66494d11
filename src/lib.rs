//! Navigation and keybinding engine for nested popover menus.
//!
//! A [`Menu`](menu::Menu) owns a [`MenuTree`](tree::MenuTree) of items and
//! submenus. Once mounted it wraps every submenu in an overlay, tracks the
//! hovered or focused item, opens and closes overlay chains in response to
//! keyboard and pointer input, and lets users bind custom shortcuts to leaf
//! items. Shortcuts persist through a [`KeyValueStore`](storage::KeyValueStore).

pub mod config;
pub mod input;
pub mod menu;
pub mod overlay;
pub mod router;
pub mod storage;
pub mod time_source;
pub mod tree;

pub use menu::{Menu, MenuInstanceId, MenuOptions};
pub use router::{InputRouter, MountedMenu};
