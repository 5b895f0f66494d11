//! Key-value persistence for per-menu state.
//!
//! Values are addressed by `(namespace, instance_id, key)` and hold arbitrary
//! JSON. Menus use it to keep custom keybindings across sessions.
//!
//! ## Storage
//!
//! [`JsonFileStore`] keeps one file per `(namespace, instance_id)` pair at
//! `{base_dir}/{namespace}/{instance_id}.json`, each file a JSON object of
//! key -> value. Path components are percent-encoded so arbitrary ids are safe
//! file names.
//!
//! Writes are atomic: write to a temp file, sync, then rename. A missing or
//! unreadable file reads as "no value".

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Storage error types
#[derive(Debug)]
pub enum StorageError {
    Io(io::Error),
    Json(serde_json::Error),
    /// The store could not determine where to keep its files
    NoDataDir,
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
            Self::NoDataDir => write!(f, "Could not determine data directory"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::NoDataDir => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Json(e)
    }
}

/// Persistence contract used by menus.
pub trait KeyValueStore: Send + Sync {
    /// Read a stored value; `None` when nothing is stored.
    fn get(&self, namespace: &str, instance_id: &str, key: &str) -> Option<Value>;

    /// Store `value`, replacing any previous one.
    fn set(
        &self,
        namespace: &str,
        instance_id: &str,
        key: &str,
        value: Value,
    ) -> Result<(), StorageError>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

type Slot = (String, String, String);

/// In-process store; contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<Slot, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<MemoryStore> {
        Arc::new(Self::new())
    }

    pub fn len(&self) -> usize {
        self.values.read().map(|values| values.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn slot(namespace: &str, instance_id: &str, key: &str) -> Slot {
    (
        namespace.to_string(),
        instance_id.to_string(),
        key.to_string(),
    )
}

impl KeyValueStore for MemoryStore {
    fn get(&self, namespace: &str, instance_id: &str, key: &str) -> Option<Value> {
        let values = self.values.read().ok()?;
        values.get(&slot(namespace, instance_id, key)).cloned()
    }

    fn set(
        &self,
        namespace: &str,
        instance_id: &str,
        key: &str,
        value: Value,
    ) -> Result<(), StorageError> {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(slot(namespace, instance_id, key), value);
        Ok(())
    }
}

/// Encode a string for use as a single file name component.
///
/// Alphanumerics, `-`, `_` and `.` are kept; everything else becomes `%XX`.
/// A leading `.` is also encoded so ids cannot form `.`/`..`.
fn encode_component(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for (i, byte) in component.bytes().enumerate() {
        let keep = byte.is_ascii_alphanumeric()
            || byte == b'-'
            || byte == b'_'
            || (byte == b'.' && i > 0);
        if keep {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    if out.is_empty() {
        out.push_str("%00");
    }
    out
}

/// File-backed store under a base directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    base_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Store rooted at `$XDG_DATA_HOME/cascade-menu` (or the platform
    /// equivalent).
    pub fn in_data_dir() -> Result<Self, StorageError> {
        let base = dirs::data_dir().ok_or(StorageError::NoDataDir)?;
        Ok(Self::new(base.join("cascade-menu")))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the file holding all keys of one instance.
    pub fn file_path(&self, namespace: &str, instance_id: &str) -> PathBuf {
        self.base_dir
            .join(encode_component(namespace))
            .join(format!("{}.json", encode_component(instance_id)))
    }

    fn read_object(&self, path: &Path) -> Result<Option<Map<String, Value>>, StorageError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<Value>(&content)? {
            Value::Object(object) => Ok(Some(object)),
            other => {
                tracing::warn!(
                    "Ignoring store file {:?}: expected an object, found {}",
                    path,
                    other
                );
                Ok(None)
            }
        }
    }

    fn write_object(&self, path: &Path, object: &Map<String, Value>) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(object)?;
        let temp_path = path.with_extension("json.tmp");
        {
            let mut file = std::fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(&temp_path, path)?;
        tracing::trace!("Store file written: {:?} ({} bytes)", path, content.len());
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, namespace: &str, instance_id: &str, key: &str) -> Option<Value> {
        let path = self.file_path(namespace, instance_id);
        match self.read_object(&path) {
            Ok(object) => object?.remove(key),
            Err(e) => {
                tracing::warn!("Failed to read store file {:?}: {}", path, e);
                None
            }
        }
    }

    fn set(
        &self,
        namespace: &str,
        instance_id: &str,
        key: &str,
        value: Value,
    ) -> Result<(), StorageError> {
        let path = self.file_path(namespace, instance_id);
        // A corrupt file is replaced rather than blocking every later write.
        let mut object = match self.read_object(&path) {
            Ok(object) => object.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Replacing unreadable store file {:?}: {}", path, e);
                Map::new()
            }
        };
        object.insert(key.to_string(), value);
        self.write_object(&path, &object)
    }
}
