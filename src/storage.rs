//! Persisted key/value state.
//!
//! The original web client kept its state in browser local storage under a
//! fixed key prefix. The native client mirrors that: a single JSON object file
//! in the user data dir, all keys prefixed with `nml-`, written through on
//! every set. Stored keys are `apiUrl`, one `lab-{clientUrl}` snapshot per lab,
//! and `isSidebarOpened`.

use crate::error::{ClientError, ClientResult};
use log::warn;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

const STORAGE_KEY_PREFIX: &str = "nml-";
const STORAGE_FILE_NAME: &str = "storage.json";

/// File-backed string key/value store.
pub struct Storage {
    path: PathBuf,
    items: Map<String, Value>,
}

impl Storage {
    /// Opens (or creates) the store inside `dir`.
    pub fn open(dir: &Path) -> ClientResult<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(STORAGE_FILE_NAME);
        let items = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!("Discarding unreadable storage file {}: {}", path.display(), e);
                Map::new()
            }),
            Err(_) => Map::new(),
        };
        Ok(Self { path, items })
    }

    /// Opens the store in the platform data dir (or `override_dir` when given).
    pub fn open_default(override_dir: Option<&Path>) -> ClientResult<Self> {
        match override_dir {
            Some(dir) => Self::open(dir),
            None => {
                let dir = dirs::data_dir()
                    .unwrap_or_else(std::env::temp_dir)
                    .join("nml-client");
                Self::open(&dir)
            }
        }
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.items
            .get(&format!("{STORAGE_KEY_PREFIX}{key}"))
            .and_then(Value::as_str)
    }

    pub fn set_item(&mut self, key: &str, value: &str) -> ClientResult<()> {
        self.items.insert(
            format!("{STORAGE_KEY_PREFIX}{key}"),
            Value::String(value.to_string()),
        );
        self.flush()
    }

    /// Reads a JSON-encoded value stored under `key`.
    /// Unparseable entries are treated as absent.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_item(key)?;
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding unreadable stored value '{}': {}", key, e);
                None
            }
        }
    }

    /// JSON-encodes `value` and stores it under `key`.
    pub fn set_json<T: Serialize>(&mut self, key: &str, value: &T) -> ClientResult<()> {
        let raw = serde_json::to_string(value).map_err(ClientError::Json)?;
        self.set_item(key, &raw)
    }

    fn flush(&self) -> ClientResult<()> {
        let json = serde_json::to_string_pretty(&Value::Object(self.items.clone()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
