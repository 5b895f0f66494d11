use crate::tree::{
    MenuTree, NodeId, ATTR_AUTO_OPEN_TIME, ATTR_COMMAND, ATTR_ID, ATTR_LABEL, ATTR_TAB_INDEX,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A menu described as JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MenuConfig {
    /// Menu id; keybindings are only captured and persisted when set
    #[serde(default)]
    pub id: Option<String>,

    /// Hover auto-open delay in milliseconds, as attribute text (default "500")
    #[serde(default)]
    pub auto_open_time: Option<String>,

    /// Largest tab index used elsewhere by the host
    #[serde(default)]
    pub tab_index_floor: Option<i32>,

    /// Top-level items
    #[serde(default)]
    pub items: Vec<MenuItemConfig>,
}

/// A menu entry (separator, leaf or branch)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum MenuItemConfig {
    /// A separator line
    Separator { separator: bool },
    /// An item; non-empty `items` makes it a branch
    Item {
        #[serde(default)]
        label: Option<String>,
        /// Path segment contributed to the item path
        #[serde(default)]
        value: Option<String>,
        /// Explicit item path, used verbatim
        #[serde(default)]
        command: Option<String>,
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        tab_index: Option<i32>,
        #[serde(default)]
        items: Vec<MenuItemConfig>,
    },
}

impl MenuConfig {
    /// Load a menu from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Build the (unmounted) menu tree this config describes.
    pub fn build_tree(&self) -> MenuTree {
        let mut tree = MenuTree::new();
        let root = tree.root();
        if let Some(id) = self.id.as_deref().filter(|id| !id.is_empty()) {
            tree.set_attr(root, ATTR_ID, id);
        }
        if let Some(time) = &self.auto_open_time {
            tree.set_attr(root, ATTR_AUTO_OPEN_TIME, time.as_str());
        }
        append_items(&mut tree, root, &self.items);
        tree
    }
}

fn append_items(tree: &mut MenuTree, parent: NodeId, items: &[MenuItemConfig]) {
    for item in items {
        match item {
            MenuItemConfig::Separator { .. } => {
                tree.append_separator(parent);
            }
            MenuItemConfig::Item {
                label,
                value,
                command,
                id,
                tab_index,
                items,
            } => {
                let Some(node) = tree.append_item(parent, value.as_deref()) else {
                    continue;
                };
                let label = label.as_deref().or(value.as_deref());
                if let Some(label) = label {
                    tree.set_attr(node, ATTR_LABEL, label);
                }
                if let Some(command) = command {
                    tree.set_attr(node, ATTR_COMMAND, command.as_str());
                }
                if let Some(id) = id {
                    tree.set_attr(node, ATTR_ID, id.as_str());
                }
                if let Some(tab_index) = tab_index {
                    tree.set_attr(node, ATTR_TAB_INDEX, tab_index.to_string());
                }
                if !items.is_empty() {
                    if let Some(submenu) = tree.append_submenu(node) {
                        append_items(tree, submenu, items);
                    }
                }
            }
        }
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {msg}"),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
