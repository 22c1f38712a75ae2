pub mod library;
pub mod progress;

pub use library::LibraryStore;
pub use progress::WatchProgressStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Namespaced JSON document store: one file per namespace under the platform
/// data directory, mirroring the app's persisted-state keys (watchlist,
/// likes, continue-watching, preferences).
///
/// Persistence is strictly best-effort. When the directory cannot be created
/// or a write fails, the store degrades to its in-memory overlay and the
/// caller never sees an error; a failed persist must never block playback.
#[derive(Debug)]
pub struct StateStore {
    root: Option<PathBuf>,
    memory: Mutex<HashMap<String, serde_json::Value>>,
}

impl StateStore {
    /// Open the store under the platform data directory.
    pub fn open() -> Self {
        let root = dirs::data_dir().map(|dir| dir.join("marquee"));
        match root {
            Some(root) => Self::with_root(root),
            None => {
                warn!("no data directory available, persistence disabled");
                Self::in_memory()
            }
        }
    }

    /// Open the store rooted at an explicit directory.
    pub fn with_root(root: PathBuf) -> Self {
        let root = match fs::create_dir_all(&root) {
            Ok(()) => Some(root),
            Err(error) => {
                warn!("cannot create data directory {:?}: {}, persistence disabled", root, error);
                None
            }
        };
        Self {
            root,
            memory: Mutex::new(HashMap::new()),
        }
    }

    /// Volatile store with no durable substrate at all.
    pub fn in_memory() -> Self {
        Self {
            root: None,
            memory: Mutex::new(HashMap::new()),
        }
    }

    /// Load the document stored under `namespace`, if any. Unreadable or
    /// unparsable files are treated as absent.
    pub fn load<T: DeserializeOwned>(&self, namespace: &str) -> Option<T> {
        {
            let memory = self.memory.lock().expect("state store lock poisoned");
            if let Some(value) = memory.get(namespace) {
                return serde_json::from_value(value.clone()).ok();
            }
        }

        let path = self.path_for(namespace)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return None,
            Err(error) => {
                warn!("cannot read {:?}: {}", path, error);
                return None;
            }
        };
        let value: serde_json::Value = match serde_json::from_str(&contents) {
            Ok(value) => value,
            Err(error) => {
                warn!("discarding corrupt state file {:?}: {}", path, error);
                return None;
            }
        };

        let decoded = serde_json::from_value(value.clone()).ok();
        let mut memory = self.memory.lock().expect("state store lock poisoned");
        memory.insert(namespace.to_string(), value);
        decoded
    }

    /// Save `value` under `namespace`. The in-memory overlay is always
    /// updated so reads stay coherent even when the disk write fails.
    pub fn save<T: Serialize>(&self, namespace: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(error) => {
                warn!("cannot serialize state for {}: {}", namespace, error);
                return;
            }
        };

        {
            let mut memory = self.memory.lock().expect("state store lock poisoned");
            memory.insert(namespace.to_string(), value.clone());
        }

        let Some(path) = self.path_for(namespace) else {
            return;
        };
        let contents = value.to_string();
        if let Err(error) = fs::write(&path, contents) {
            warn!("cannot persist {}: {}", namespace, error);
        } else {
            debug!("persisted state for {}", namespace);
        }
    }

    fn path_for(&self, namespace: &str) -> Option<PathBuf> {
        self.root
            .as_ref()
            .map(|root| root.join(format!("{}.json", namespace)))
    }
}
