//! Barcode resolution: local cache first, then the product database.
//!
//! The resolver is stateless per call and safe to invoke concurrently;
//! the only shared state is the barcode cache, where last write wins.
//! It never writes the cache itself - only a user-finalized item edit
//! does, so cached data is always user-confirmed.

mod client;

pub use client::{
    LookupError, OpenFoodFactsClient, ProductLookup, RemoteNutriments, RemoteProduct,
};

use thiserror::Error;

use crate::models::{BarcodeCache, ProductDetails};
use crate::store::NewItem;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("barcode must be 8 to 13 digits: {0:?}")]
    InvalidBarcode(String),
}

/// Outcome of a barcode resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(ResolvedProduct),
    NotFound,
}

/// Product data ready to be handed to the store as a new-or-merged item.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProduct {
    pub display_name: String,
    pub unit_value: f64,
    pub details: Option<ProductDetails>,
}

impl ResolvedProduct {
    /// Splits into the arguments [`ListStore::add_item`] expects.
    ///
    /// [`ListStore::add_item`]: crate::store::ListStore::add_item
    pub fn into_new_item(self) -> (String, NewItem) {
        let mut new = NewItem::default().with_unit_value(self.unit_value);
        if let Some(details) = self.details {
            new = new.with_details(details);
        }
        (self.display_name, new)
    }
}

/// Checks a scanned code for barcode shape: 8 to 13 ASCII digits.
pub fn is_valid_barcode(code: &str) -> bool {
    (8..=13).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_digit())
}

/// Resolves scanned barcodes to product data.
pub struct BarcodeResolver<L = OpenFoodFactsClient> {
    lookup: L,
    cache: BarcodeCache,
}

impl<L: ProductLookup> BarcodeResolver<L> {
    pub fn new(lookup: L, cache: BarcodeCache) -> Self {
        Self { lookup, cache }
    }

    /// Resolves a barcode.
    ///
    /// A cache hit returns the cached entry verbatim with no remote
    /// call. On a miss, a single remote lookup runs; transport and HTTP
    /// failures are logged and folded into [`Resolution::NotFound`],
    /// the same outcome as a clean miss in the product database.
    pub async fn resolve(&self, barcode: &str) -> Result<Resolution, ResolveError> {
        if !is_valid_barcode(barcode) {
            return Err(ResolveError::InvalidBarcode(barcode.to_string()));
        }

        if let Some(entry) = self.cache.get(barcode) {
            tracing::debug!("barcode {} served from cache", barcode);
            return Ok(Resolution::Found(ResolvedProduct {
                display_name: entry.display_name,
                unit_value: entry.unit_value,
                details: entry.details,
            }));
        }

        match self.lookup.fetch(barcode).await {
            Ok(Some(product)) => {
                let display_name = product.display_name(barcode);
                let details = product.into_details(barcode);
                Ok(Resolution::Found(ResolvedProduct {
                    display_name,
                    unit_value: 0.0,
                    details: Some(details),
                }))
            }
            Ok(None) => {
                tracing::debug!("barcode {} not in product database", barcode);
                Ok(Resolution::NotFound)
            }
            Err(e) => {
                tracing::warn!("product lookup for {} failed: {}", barcode, e);
                Ok(Resolution::NotFound)
            }
        }
    }
}
