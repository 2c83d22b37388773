use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::FormStateError;
use crate::storage::Storage;

pub const DEFAULT_STORE_PATH: &str = "saveform-store.json";

/// Persistent store backed by a single JSON object file (`{"key": "raw"}`).
///
/// The file is read once at open and rewritten whole after every mutation.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: RefCell<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Opens (or lazily creates) the store at `path`. A missing file is an
    /// empty store; an unreadable or malformed one is an error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FormStateError> {
        let path = path.as_ref().to_path_buf();
        let items = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => {
                serde_json::from_str(&content).map_err(|e| FormStateError::JsonParse {
                    context: format!("store file {}", path.display()),
                    source: e,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(FormStateError::StorageIo {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };
        Ok(FileStorage {
            path,
            items: RefCell::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn keys(&self) -> Vec<String> {
        self.items.borrow().keys().cloned().collect()
    }

    /// Puts `key` back to what it held before a mutation that failed to flush.
    fn rollback(&self, key: &str, previous: Option<String>) {
        let mut items = self.items.borrow_mut();
        match previous {
            Some(value) => items.insert(key.to_string(), value),
            None => items.remove(key),
        };
    }

    fn flush(&self) -> Result<(), FormStateError> {
        let json = serde_json::to_string_pretty(&*self.items.borrow()).map_err(|e| {
            FormStateError::JsonSerialize {
                context: "store file".into(),
                source: e,
            }
        })?;
        std::fs::write(&self.path, json).map_err(|e| FormStateError::StorageIo {
            path: self.path.display().to_string(),
            source: e,
        })
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, FormStateError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), FormStateError> {
        let previous = self
            .items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.flush().inspect_err(|_| self.rollback(key, previous))
    }

    fn remove_item(&self, key: &str) -> Result<(), FormStateError> {
        let previous = self.items.borrow_mut().remove(key);
        if previous.is_some() {
            self.flush().inspect_err(|_| self.rollback(key, previous))?;
        }
        Ok(())
    }
}
