//! Snapshot of everything the app persists, minus the theme preference
//! which is owned by the theme store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::{JsonStorage, StorageError, StoreKey};
use crate::models::{BarcodeCacheEntry, ShoppingList};

/// Persisted application state.
///
/// Round-trips exactly: `load_state(save_state(x)) == x`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppState {
    pub lists: Vec<ShoppingList>,
    pub active_list_id: Option<Uuid>,
    pub barcode_cache: BTreeMap<String, BarcodeCacheEntry>,
}

impl JsonStorage {
    /// Loads the full app state; missing keys load as defaults.
    pub fn load_state(&self) -> Result<AppState, StorageError> {
        Ok(AppState {
            lists: self.load(StoreKey::Lists)?.unwrap_or_default(),
            active_list_id: self.load(StoreKey::ActiveList)?.unwrap_or_default(),
            barcode_cache: self.load(StoreKey::BarcodeCache)?.unwrap_or_default(),
        })
    }

    /// Saves the full app state, one file per key.
    pub fn save_state(&self, state: &AppState) -> Result<(), StorageError> {
        self.save(StoreKey::Lists, &state.lists)?;
        self.save(StoreKey::ActiveList, &state.active_list_id)?;
        self.save(StoreKey::BarcodeCache, &state.barcode_cache)
    }
}
