//! Durable session records.
//!
//! The whole session is written as one JSON document under a fixed key and
//! rewritten wholesale on every save. Reading never fails the caller: any
//! problem with the stored document means "no session".
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;

use crate::KeyValueStore;
use crate::constants::SESSION_RECORD_VERSION;
use crate::error::{PersistenceError, RecordError};
use crate::grid::{CellBounds, GridCell, LatLng, cell_key};
use crate::ledger::LedgerEntry;
use crate::memento::CacheMemento;

const fn default_version() -> u32 {
    SESSION_RECORD_VERSION
}

/// A materialized cache as the map needs it after a reload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleCache {
    #[serde(with = "cell_key")]
    pub cache_key: GridCell,
    pub bounds: CellBounds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(default = "default_version")]
    pub version: u32,
    pub player_position: LatLng,
    #[serde(default)]
    pub inventory: Vec<LedgerEntry>,
    #[serde(default)]
    pub visible_caches: Vec<VisibleCache>,
    #[serde(default)]
    pub movement_history: Vec<LatLng>,
    #[serde(default)]
    pub cache_mementos: Vec<CacheMemento>,
}

impl SessionRecord {
    /// Empty session standing at `position`.
    #[must_use]
    pub fn at(position: LatLng) -> Self {
        Self {
            version: SESSION_RECORD_VERSION,
            player_position: position,
            inventory: Vec::new(),
            visible_caches: Vec::new(),
            movement_history: vec![position],
            cache_mementos: Vec::new(),
        }
    }
}

/// Decode and validate a stored record.
///
/// # Errors
///
/// Fails on malformed JSON, a missing or non-numeric position, a non-finite
/// position, or a version this build does not understand.
pub fn decode_record(raw: &str) -> Result<SessionRecord, RecordError> {
    let value: Value = serde_json::from_str(raw)?;
    let position = value
        .get("playerPosition")
        .ok_or(RecordError::MissingPosition)?;
    let lat = position.get("lat").and_then(Value::as_f64);
    let lng = position.get("lng").and_then(Value::as_f64);
    let (Some(lat), Some(lng)) = (lat, lng) else {
        return Err(RecordError::MissingPosition);
    };
    if !(lat.is_finite() && lng.is_finite()) {
        return Err(RecordError::NonFinitePosition);
    }
    let record: SessionRecord = serde_json::from_value(value)?;
    if record.version == 0 || record.version > SESSION_RECORD_VERSION {
        return Err(RecordError::UnsupportedVersion(record.version));
    }
    Ok(record)
}

/// Save, load and delete the session record in a key-value store.
#[derive(Debug, Clone)]
pub struct SessionPersistence<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> SessionPersistence<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Overwrite the slot with `record`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded or written.
    pub fn save(&self, record: &SessionRecord) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(record)?;
        self.store
            .set(&self.key, &json)
            .map_err(|err| PersistenceError::Backend(Box::new(err)))
    }

    /// The stored record, or `None` when it is absent or unusable.
    #[must_use]
    pub fn load(&self) -> Option<SessionRecord> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log::debug!("no session stored under `{}`", self.key);
                return None;
            }
            Err(err) => {
                log::warn!("session read from `{}` failed: {err}", self.key);
                return None;
            }
        };
        match decode_record(&raw) {
            Ok(record) => Some(record),
            Err(err) => {
                log::warn!("discarding stored session `{}`: {err}", self.key);
                None
            }
        }
    }

    /// Delete the slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot remove the key.
    pub fn reset(&self) -> Result<(), PersistenceError> {
        self.store
            .remove(&self.key)
            .map_err(|err| PersistenceError::Backend(Box::new(err)))
    }
}

/// In-memory store. Clones share the same map, so a test can keep a handle
/// while the game owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }

    pub fn insert_raw(&self, key: &str, value: &str) {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.insert_raw(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.slots.borrow_mut().remove(key);
        Ok(())
    }
}
