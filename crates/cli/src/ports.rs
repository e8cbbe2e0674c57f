//! Terminal implementations of the environment ports

use ovoz_core::{CoreError, CoreResult, KeyValueStore, Navigator, RootElement};
use ovoz_frontend_common::Ports;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// Session file kept in the data directory
pub const SESSION_FILE: &str = "session.json";

/// Key-value store persisted as a flat JSON object
pub struct FileStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`; a missing file is an empty store
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn open(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(CoreError::storage(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };
        debug!(path = %path.display(), "Opened session store");
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    /// Apply `change` to a copy, persist the copy, then adopt it.
    ///
    /// On a failed write the in-memory values are left as they were.
    fn update(&self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> CoreResult<()> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = values.clone();
        change(&mut next);

        self.persist(&next)?;
        *values = next;
        Ok(())
    }

    /// Write to a sibling temp file and rename it over the session file
    fn persist(&self, values: &BTreeMap<String, String>) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CoreError::storage(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }
        let content = serde_json::to_string_pretty(values)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(|e| {
            CoreError::storage(format!("Failed to write {}: {e}", tmp.display()))
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            CoreError::storage(format!("Failed to replace {}: {e}", self.path.display()))
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        self.update(|values| {
            values.remove(key);
        })
    }
}

/// A terminal cannot navigate; tell the user to sign in again instead
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn hard_redirect(&self, path: &str) {
        warn!(path, "Session expired");
        eprintln!("Your session has expired. Run `ovoz login` to sign in again.");
    }
}

/// Terminals have no document root to style
pub struct TerminalRoot;

impl RootElement for TerminalRoot {
    fn set_class(&self, class: &str, enabled: bool) {
        debug!(class, enabled, "Ignoring root class change");
    }
}

/// Ports for the CLI, storing the session in `data_dir`
///
/// # Errors
///
/// Returns an error if an existing session file cannot be read
pub fn terminal_ports(data_dir: &Path) -> CoreResult<Ports> {
    Ok(Ports {
        storage: Arc::new(FileStore::open(data_dir.join(SESSION_FILE))?),
        navigator: Arc::new(TerminalNavigator),
        root: Arc::new(TerminalRoot),
    })
}
