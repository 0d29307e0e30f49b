use std::sync::{Arc, RwLock};

use tracing::debug;

use super::storage::KeyValueStorage;
use crate::models::{ProgressMap, ProgressRecord, TitleCard};

/// Storage key holding the JSON-encoded progress map
pub const PROGRESS_STORAGE_KEY: &str = "vitrine:progress";

type Listener = Arc<dyn Fn(&str) + Send + Sync>;

/// Display item that can carry a resume fraction
pub trait ProgressTarget {
    /// Key under which this item's progress is stored
    fn progress_id(&self) -> String;

    /// Overwrite the displayed progress fraction
    fn set_progress(&mut self, value: f64);
}

impl ProgressTarget for TitleCard {
    fn progress_id(&self) -> String {
        self.id.to_string()
    }

    fn set_progress(&mut self, value: f64) {
        self.progress = Some(value);
    }
}

/// Device-local watch-progress store.
///
/// Keeps one JSON document mapping item identifiers to progress records and
/// notifies registered listeners after every save. Malformed or missing
/// stored data degrades to an empty map, never to an error.
#[derive(Clone)]
pub struct LocalProgressStore {
    storage: Arc<dyn KeyValueStorage>,
    listeners: Arc<RwLock<Vec<Listener>>>,
}

impl LocalProgressStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            listeners: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Read the full progress map from storage
    pub fn load(&self) -> ProgressMap {
        let raw = match self.storage.get(PROGRESS_STORAGE_KEY) {
            Some(raw) => raw,
            None => return ProgressMap::new(),
        };

        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(err) => {
                debug!("Discarding malformed progress data: {}", err);
                ProgressMap::new()
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<ProgressRecord> {
        self.load().get(id).cloned()
    }

    /// Normalize and store a record, then notify every listener once.
    ///
    /// The fraction is clamped to [0,1] and position/duration are floored at
    /// zero. Concurrent saves are last-writer-wins.
    pub fn save(&self, id: &str, record: ProgressRecord) {
        let mut map = self.load();
        map.insert(
            id.to_string(),
            ProgressRecord {
                value: record.value.clamp(0.0, 1.0),
                position: record.position.max(0.0),
                duration: record.duration.max(0.0),
                updated_at: record.updated_at,
            },
        );

        match serde_json::to_string(&map) {
            Ok(encoded) => self.storage.set(PROGRESS_STORAGE_KEY, &encoded),
            Err(err) => debug!("Failed to encode progress map: {}", err),
        }

        self.notify(id);
    }

    /// Register a callback invoked synchronously with the affected
    /// identifier after every save
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.listeners.write().unwrap().push(Arc::new(listener));
    }

    /// Return a copy of `items` where every item with a stored record gets
    /// its progress overwritten. Items without a record pass through and the
    /// input is left untouched.
    pub fn apply_to<T>(&self, items: &[T]) -> Vec<T>
    where
        T: ProgressTarget + Clone,
    {
        let map = self.load();
        items
            .iter()
            .map(|item| {
                let mut item = item.clone();
                if let Some(record) = map.get(&item.progress_id()) {
                    item.set_progress(record.value);
                }
                item
            })
            .collect()
    }

    fn notify(&self, id: &str) {
        // Listeners run outside the lock: one may subscribe or save again
        let listeners: Vec<Listener> = self.listeners.read().unwrap().clone();
        for listener in listeners {
            (*listener)(id);
        }
    }
}
