//! Custom keybindings of one menu instance.
//!
//! The registry maps encoded keybindings to item paths. It is loaded from the
//! store once at mount, changed in place by [`KeybindingRegistry::assign`]
//! and written back in full after every assignment. A key binds at most one
//! path and a path is bound to at most one key.
//!
//! Everything is keyed by the menu's `id` attribute; a menu without one keeps
//! an empty registry and ignores assignments.

use super::path::ItemPath;
use crate::input::encoding::{encode, EncodedKeybinding};
use crate::input::key::KeyInput;
use crate::storage::SharedStore;
use std::collections::BTreeMap;

/// Store namespace for all menu state
pub const STORE_NAMESPACE: &str = "cascade-menu";

/// Store key holding the keybinding map
pub const STORE_KEY: &str = "keybindings";

/// Called with the new label whenever the binding of the observed path
/// changes. An empty label means the path lost its binding.
pub type LabelCallback = Box<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelObserverId(u64);

struct LabelObserver {
    id: LabelObserverId,
    path: ItemPath,
    callback: LabelCallback,
}

/// New label of a path after an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelChange {
    pub path: ItemPath,
    pub label: String,
}

/// Result of a successful [`KeybindingRegistry::assign`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub keybinding: EncodedKeybinding,
    pub changes: Vec<LabelChange>,
}

pub struct KeybindingRegistry {
    instance_id: Option<String>,
    bindings: BTreeMap<EncodedKeybinding, ItemPath>,
    store: SharedStore,
    observers: Vec<LabelObserver>,
    next_observer_id: u64,
}

impl std::fmt::Debug for KeybindingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeybindingRegistry")
            .field("instance_id", &self.instance_id)
            .field("bindings", &self.bindings)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl KeybindingRegistry {
    /// Create an empty registry. Call [`load`](Self::load) to read the store.
    pub fn new(store: SharedStore, instance_id: Option<String>) -> Self {
        Self {
            instance_id: instance_id.filter(|id| !id.is_empty()),
            bindings: BTreeMap::new(),
            store,
            observers: Vec::new(),
            next_observer_id: 1,
        }
    }

    pub fn instance_id(&self) -> Option<&str> {
        self.instance_id.as_deref()
    }

    /// Replace the in-memory map with the stored one.
    ///
    /// Missing ids, missing values and values that are not a string map all
    /// load as an empty registry.
    pub fn load(&mut self) {
        self.bindings.clear();
        let Some(id) = self.instance_id.as_deref() else {
            return;
        };
        let Some(value) = self.store.get(STORE_NAMESPACE, id, STORE_KEY) else {
            tracing::debug!("No stored keybindings for menu '{}'", id);
            return;
        };

        match serde_json::from_value::<BTreeMap<EncodedKeybinding, ItemPath>>(value) {
            Ok(bindings) => {
                tracing::debug!("Loaded {} keybindings for menu '{}'", bindings.len(), id);
                self.bindings = bindings;
            }
            Err(e) => {
                tracing::warn!("Ignoring malformed keybindings for menu '{}': {}", id, e);
            }
        }
    }

    pub fn bindings(&self) -> &BTreeMap<EncodedKeybinding, ItemPath> {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn lookup(&self, encoded: &EncodedKeybinding) -> Option<&ItemPath> {
        self.bindings.get(encoded)
    }

    /// Key currently bound to `path`.
    pub fn encoded_for(&self, path: &ItemPath) -> Option<&EncodedKeybinding> {
        self.bindings
            .iter()
            .find(|(_, bound)| *bound == path)
            .map(|(key, _)| key)
    }

    /// Display label of the key bound to `path`, or `""`.
    pub fn label_for(&self, path: &ItemPath) -> String {
        self.encoded_for(path)
            .map(EncodedKeybinding::display_label)
            .unwrap_or_default()
    }

    /// Bind the key of `event` to `path` and persist the whole map.
    ///
    /// Any previous binding of the key or of the path is dropped first. A
    /// path that loses its key to `path` is reported with an empty label.
    /// Returns `None` when the menu has no id.
    pub fn assign(&mut self, path: ItemPath, event: &KeyInput) -> Option<Assignment> {
        let id = self.instance_id.clone()?;
        let keybinding = encode(event);

        let mut changes = Vec::new();
        if let Some(displaced) = self.bindings.get(&keybinding) {
            if *displaced != path {
                changes.push(LabelChange {
                    path: displaced.clone(),
                    label: String::new(),
                });
            }
        }

        self.bindings
            .retain(|key, bound| *bound != path && *key != keybinding);
        self.bindings.insert(keybinding.clone(), path.clone());

        tracing::debug!("Saving keybinding {} for {}", keybinding, path);
        self.persist(&id);

        changes.push(LabelChange {
            path,
            label: keybinding.display_label(),
        });
        for change in &changes {
            self.notify(change);
        }

        Some(Assignment {
            keybinding,
            changes,
        })
    }

    fn persist(&self, id: &str) {
        let value = match serde_json::to_value(&self.bindings) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to serialize keybindings for menu '{}': {}", id, e);
                return;
            }
        };
        if let Err(e) = self.store.set(STORE_NAMESPACE, id, STORE_KEY, value) {
            tracing::warn!("Failed to persist keybindings for menu '{}': {}", id, e);
        }
    }

    fn notify(&self, change: &LabelChange) {
        for observer in self.observers.iter().filter(|o| o.path == change.path) {
            (observer.callback)(&change.label);
        }
    }

    /// Observe the label of `path`.
    pub fn subscribe_label(&mut self, path: ItemPath, callback: LabelCallback) -> LabelObserverId {
        let id = LabelObserverId(self.next_observer_id);
        self.next_observer_id += 1;
        self.observers.push(LabelObserver { id, path, callback });
        id
    }

    pub fn unsubscribe_label(&mut self, id: LabelObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|observer| observer.id != id);
        self.observers.len() != before
    }

    pub fn clear_observers(&mut self) {
        self.observers.clear();
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}
