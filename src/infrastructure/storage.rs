use std::cell::RefCell;
use std::collections::BTreeMap;

use gloo::storage::errors::StorageError as GlooStorageError;
use gloo::storage::{LocalStorage, Storage};

use crate::domain::errors::{ExternalServiceError, InfrastructureError, StorageError};
use crate::domain::logging::LogComponent;
use crate::domain::repositories::KeyValueStore;
use crate::log_warn;

/// `window.localStorage` through gloo. Values are stored JSON-encoded.
pub struct LocalStorageStore(());

impl LocalStorageStore {
    /// Fails when the page has no window or storage is blocked, since
    /// gloo's accessors throw in that case.
    pub fn new() -> Result<Self, InfrastructureError> {
        let window = web_sys::window().ok_or_else(|| {
            ExternalServiceError::BrowserApiError("Window not available".to_string())
        })?;
        match window.local_storage() {
            Ok(Some(_)) => Ok(Self(())),
            Ok(None) => {
                Err(StorageError::Unavailable("localStorage is disabled".to_string()).into())
            }
            Err(e) => Err(StorageError::Unavailable(format!("{e:?}")).into()),
        }
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        match LocalStorage::get::<String>(key) {
            Ok(value) => Some(value),
            Err(GlooStorageError::KeyNotFound(_)) => None,
            Err(e) => {
                log_warn!(
                    LogComponent::Infrastructure("LocalStorage"),
                    "Reading {key} failed: {e}"
                );
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), InfrastructureError> {
        LocalStorage::set(key, value)
            .map_err(|e| StorageError::WriteFailed(format!("{key}: {e}")).into())
    }

    fn remove(&self, key: &str) {
        LocalStorage::delete(key);
    }

    fn keys(&self) -> Vec<String> {
        let raw = LocalStorage::raw();
        let length = match raw.length() {
            Ok(length) => length,
            Err(e) => {
                log_warn!(
                    LogComponent::Infrastructure("LocalStorage"),
                    "Listing keys failed: {e:?}"
                );
                return Vec::new();
            }
        };
        (0..length).filter_map(|index| raw.key(index).ok().flatten()).collect()
    }
}

/// In-memory store for pages where `localStorage` is blocked.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), InfrastructureError> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}

/// `localStorage` when the browser allows it, memory otherwise.
pub enum BrowserStore {
    Local(LocalStorageStore),
    Memory(MemoryStore),
}

impl BrowserStore {
    pub fn open() -> Self {
        match LocalStorageStore::new() {
            Ok(store) => BrowserStore::Local(store),
            Err(e) => {
                log_warn!(
                    LogComponent::Infrastructure("BrowserStore"),
                    "{e}; cache will not survive a reload"
                );
                BrowserStore::Memory(MemoryStore::new())
            }
        }
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            BrowserStore::Local(store) => store.get(key),
            BrowserStore::Memory(store) => store.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), InfrastructureError> {
        match self {
            BrowserStore::Local(store) => store.set(key, value),
            BrowserStore::Memory(store) => store.set(key, value),
        }
    }

    fn remove(&self, key: &str) {
        match self {
            BrowserStore::Local(store) => store.remove(key),
            BrowserStore::Memory(store) => store.remove(key),
        }
    }

    fn keys(&self) -> Vec<String> {
        match self {
            BrowserStore::Local(store) => store.keys(),
            BrowserStore::Memory(store) => store.keys(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_lists_keys_in_order() {
        let store = MemoryStore::new();
        store.set("b", "2").unwrap();
        store.set("a", "1").unwrap();
        store.remove("missing");
        assert_eq!(store.keys(), vec!["a", "b"]);
        store.remove("a");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("b").as_deref(), Some("2"));
    }
}
