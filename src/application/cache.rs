//! Session-scoped snapshot cache and the per-transaction note store, both
//! on top of one [`KeyValueStore`].

use std::collections::HashMap;
use std::rc::Rc;

use crate::domain::errors::{InfrastructureError, StorageError};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::repositories::KeyValueStore;
use crate::domain::session::SessionId;
use crate::domain::snapshot::Snapshot;
use crate::domain::view::ViewKind;
use crate::{log_debug, log_warn};

/// Last rendered snapshot per `(session, view)`.
pub struct SnapshotCache<K> {
    store: Rc<K>,
}

impl<K> Clone for SnapshotCache<K> {
    fn clone(&self) -> Self {
        Self { store: Rc::clone(&self.store) }
    }
}

impl<K: KeyValueStore> SnapshotCache<K> {
    pub fn new(store: Rc<K>) -> Self {
        Self { store }
    }

    /// Entries that no longer decode, or decode to another view, are
    /// dropped on read.
    pub fn get(&self, session: &SessionId, view: ViewKind) -> Option<Snapshot> {
        let key = view.cache_key(session.value());
        let raw = self.store.get(&key)?;
        match serde_json::from_str::<Snapshot>(&raw) {
            Ok(snapshot) if snapshot.matches_view(view) => Some(snapshot),
            Ok(_) => {
                log_warn!(
                    LogComponent::Application("SnapshotCache"),
                    "Dropping {key}: stored snapshot belongs to another view"
                );
                self.store.remove(&key);
                None
            }
            Err(e) => {
                log_warn!(
                    LogComponent::Application("SnapshotCache"),
                    "Dropping undecodable {key}: {e}"
                );
                self.store.remove(&key);
                None
            }
        }
    }

    pub fn contains(&self, session: &SessionId, view: ViewKind) -> bool {
        self.store.get(&view.cache_key(session.value())).is_some()
    }

    /// Overwrites unconditionally.
    pub fn put(
        &self,
        session: &SessionId,
        view: ViewKind,
        snapshot: &Snapshot,
    ) -> Result<(), InfrastructureError> {
        if !snapshot.matches_view(view) {
            return Err(StorageError::Serialization(format!("snapshot does not belong to {view}")).into());
        }
        let raw = serde_json::to_string(snapshot).map_err(|e| StorageError::Serialization(e.to_string()))?;
        let key = view.cache_key(session.value());
        self.store.set(&key, &raw)?;
        log_debug!(LogComponent::Application("SnapshotCache"), "Stored {key}");
        Ok(())
    }

    /// Removes snapshot-namespace keys whose view suffix is unknown.
    /// Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let stale: Vec<String> = self
            .store
            .keys()
            .into_iter()
            .filter(|key| ViewKind::is_snapshot_key(key) && ViewKind::parse_cache_key(key).is_none())
            .collect();
        for key in &stale {
            self.store.remove(key);
        }
        if !stale.is_empty() {
            get_logger().info(
                LogComponent::Application("SnapshotCache"),
                &format!("Swept {} stale cache entries", stale.len()),
            );
        }
        stale.len()
    }
}

pub const NOTE_KEY_PREFIX: &str = "note-";

/// Free-text notes keyed by short transaction id. Never sent to the server.
pub struct NoteStore<K> {
    store: Rc<K>,
}

impl<K> Clone for NoteStore<K> {
    fn clone(&self) -> Self {
        Self { store: Rc::clone(&self.store) }
    }
}

impl<K: KeyValueStore> NoteStore<K> {
    pub fn new(store: Rc<K>) -> Self {
        Self { store }
    }

    pub fn key(short_id: &str) -> String {
        format!("{NOTE_KEY_PREFIX}{short_id}")
    }

    pub fn get(&self, short_id: &str) -> Option<String> {
        self.store.get(&Self::key(short_id))
    }

    /// An empty note deletes the entry.
    pub fn set(&self, short_id: &str, text: &str) -> Result<(), InfrastructureError> {
        let key = Self::key(short_id);
        if text.is_empty() {
            self.store.remove(&key);
            return Ok(());
        }
        self.store.set(&key, text)
    }

    pub fn notes_for<'a>(&self, short_ids: impl IntoIterator<Item = &'a str>) -> HashMap<String, String> {
        short_ids
            .into_iter()
            .filter_map(|id| self.get(id).map(|note| (id.to_string(), note)))
            .collect()
    }
}
