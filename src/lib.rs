//! Listfy Core Library
//!
//! Shopping-list state, product lookup, and local persistence for
//! Listfy applications. The UI layer constructs a [`ListStore`] (and a
//! [`ThemeStore`]) once at process start and drives everything through
//! their operations; a [`BarcodeResolver`] turns scanned codes into
//! items via the store's add-or-merge path.

pub mod config;
pub mod models;
pub mod product;
pub mod storage;
pub mod store;
pub mod theme;

pub use config::{Config, ConfigError};
pub use models::{BarcodeCache, BarcodeCacheEntry, Item, Nutrition, ProductDetails, ShoppingList};
pub use product::{
    is_valid_barcode, BarcodeResolver, LookupError, OpenFoodFactsClient, ProductLookup,
    RemoteProduct, Resolution, ResolveError, ResolvedProduct,
};
pub use storage::{AppState, JsonStorage, StorageError, StoreKey};
pub use store::{ItemPatch, ListStore, ListSummary, NewItem, StoreError, StoreEvent, SummaryLine};
pub use theme::{ThemePreference, ThemeStore};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
