use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::ProductDetails;

/// Cached product data for a barcode, keyed by the raw code string.
///
/// Entries are written only when the user finalizes an edit on an item
/// carrying a barcode, so the cache holds user-confirmed data rather
/// than raw API guesses. No expiry; last write wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BarcodeCacheEntry {
    pub display_name: String,
    pub unit_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ProductDetails>,
}

/// Shared handle to the barcode cache.
///
/// Clones share the same map. Reads and writes may come from the store
/// and from concurrent resolver calls; last write wins.
#[derive(Debug, Clone, Default)]
pub struct BarcodeCache {
    inner: Arc<RwLock<BTreeMap<String, BarcodeCacheEntry>>>,
}

impl BarcodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: BTreeMap<String, BarcodeCacheEntry>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    pub fn get(&self, barcode: &str) -> Option<BarcodeCacheEntry> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(barcode)
            .cloned()
    }

    pub fn upsert(&self, barcode: impl Into<String>, entry: BarcodeCacheEntry) {
        self.inner
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(barcode.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the full map, for persistence snapshots.
    pub fn snapshot(&self) -> BTreeMap<String, BarcodeCacheEntry> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
