//! Persistence: saving and restoring column layout per table.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::PersistError;

/// Storage slot for column width overrides.
pub const SLOT_COLUMN_WIDTHS: &str = "column-widths";
/// Storage slot for the column order.
pub const SLOT_COLUMN_ORDER: &str = "column-order";
/// Storage slot for the table width.
pub const SLOT_TABLE_WIDTH: &str = "table-width";

/// Backend trait for layout storage.
///
/// Implementations handle raw string storage; the [`PersistenceAdapter`]
/// wraps this with JSON slots. Every operation may fail; callers treat
/// failure as "no saved state".
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the raw value for a key.
    async fn get(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Set the raw value for a key.
    async fn set(&self, key: &str, value: String) -> Result<(), PersistError>;

    /// Delete a key.
    async fn remove(&self, key: &str) -> Result<(), PersistError>;
}

/// An in-memory store backed by a concurrent hash map.
///
/// The default backend for tests, demos and hosts without durable
/// storage. Data is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    store: DashMap<String, String>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.store.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), PersistError> {
        self.store.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), PersistError> {
        self.store.remove(key);
        Ok(())
    }
}

/// Saves and restores column layout through a [`KeyValueStore`].
///
/// Three JSON slots per `table_id`: the width-override map, the order
/// array and the table width. All operations tolerate storage being
/// unavailable or holding malformed JSON: a warning is logged and the
/// slot reads as absent.
pub struct PersistenceAdapter {
    table_id: String,
    store: Arc<dyn KeyValueStore>,
}

impl PersistenceAdapter {
    /// Creates an adapter for one table's slots.
    pub fn new(table_id: impl Into<String>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            table_id: table_id.into(),
            store,
        }
    }

    fn slot_key(&self, slot: &str) -> String {
        format!("{}:{}", self.table_id, slot)
    }

    async fn load<T: DeserializeOwned>(&self, slot: &str) -> Option<T> {
        let key = self.slot_key(slot);
        let raw = match self.store.get(&key).await {
            Ok(raw) => raw?,
            Err(err) => {
                log::warn!("persistence read of {key:?} failed: {err}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("persistence slot {key:?} holds malformed JSON: {err}");
                None
            }
        }
    }

    async fn save<T: Serialize>(&self, slot: &str, value: &T) {
        let key = self.slot_key(slot);
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                log::warn!("persistence serialize for {key:?} failed: {err}");
                return;
            }
        };
        if let Err(err) = self.store.set(&key, raw).await {
            log::warn!("persistence write of {key:?} failed: {err}");
        }
    }

    /// Loads the saved width overrides, if any.
    pub async fn load_column_widths(&self) -> Option<HashMap<String, u32>> {
        self.load(SLOT_COLUMN_WIDTHS).await
    }

    /// Saves the width overrides.
    pub async fn save_column_widths(&self, widths: &HashMap<String, u32>) {
        self.save(SLOT_COLUMN_WIDTHS, widths).await;
    }

    /// Loads the saved column order, if any.
    pub async fn load_column_order(&self) -> Option<Vec<String>> {
        self.load(SLOT_COLUMN_ORDER).await
    }

    /// Saves the column order.
    pub async fn save_column_order(&self, order: &[String]) {
        self.save(SLOT_COLUMN_ORDER, &order.to_vec()).await;
    }

    /// Loads the saved table width, if any.
    pub async fn load_table_width(&self) -> Option<u32> {
        self.load(SLOT_TABLE_WIDTH).await
    }

    /// Saves the table width.
    pub async fn save_table_width(&self, width: u32) {
        self.save(SLOT_TABLE_WIDTH, &width).await;
    }

    /// Clears all three slots.
    pub async fn clear(&self) {
        for slot in [SLOT_COLUMN_WIDTHS, SLOT_COLUMN_ORDER, SLOT_TABLE_WIDTH] {
            let key = self.slot_key(slot);
            if let Err(err) = self.store.remove(&key).await {
                log::warn!("persistence clear of {key:?} failed: {err}");
            }
        }
    }
}
