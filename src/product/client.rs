//! Remote product lookup against the Open Food Facts database.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::models::{Nutrition, ProductDetails};

/// Timeout for a single product lookup request.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Fields requested from the product database.
const PRODUCT_FIELDS: &str = "product_name,product_name_en,generic_name,brands,quantity,\
                              image_url,ingredients_text,categories,nutriments";

/// Errors from the remote product database.
///
/// Every variant means "remote unavailable" to the resolver, which logs
/// the detail and reports a not-found outcome to its caller.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("server returned status {0}")]
    Status(u16),

    #[error("malformed response payload: {0}")]
    Decode(String),
}

/// Product database client, stubbed in tests.
#[allow(async_fn_in_trait)]
pub trait ProductLookup {
    /// Fetches the product record for a barcode.
    ///
    /// `Ok(None)` means the database has no record for the barcode.
    async fn fetch(&self, barcode: &str) -> Result<Option<RemoteProduct>, LookupError>;
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status: u8,
    #[serde(default)]
    product: Option<RemoteProduct>,
}

/// Product record as returned by the Open Food Facts v2 API.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemoteProduct {
    pub product_name: Option<String>,
    pub product_name_en: Option<String>,
    pub generic_name: Option<String>,
    pub brands: Option<String>,
    pub quantity: Option<String>,
    pub image_url: Option<String>,
    pub ingredients_text: Option<String>,
    pub categories: Option<String>,
    pub nutriments: Option<RemoteNutriments>,
}

/// Per-100g nutriment fields, as named by the remote API.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemoteNutriments {
    #[serde(rename = "energy-kcal_100g")]
    pub energy_kcal: Option<f64>,
    #[serde(rename = "fat_100g")]
    pub fat: Option<f64>,
    #[serde(rename = "carbohydrates_100g")]
    pub carbohydrates: Option<f64>,
    #[serde(rename = "proteins_100g")]
    pub proteins: Option<f64>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

impl RemoteProduct {
    /// Display name for the product, first non-empty wins:
    /// localized name, English name, generic name, brand + generic,
    /// brand alone, generic alone, then `"Product <barcode>"`.
    pub fn display_name(&self, barcode: &str) -> String {
        for candidate in [
            self.product_name.as_deref(),
            self.product_name_en.as_deref(),
            self.generic_name.as_deref(),
        ] {
            if let Some(name) = non_empty(candidate) {
                return name.to_string();
            }
        }

        let brand = non_empty(self.brands.as_deref());
        let generic = non_empty(self.generic_name.as_deref());
        match (brand, generic) {
            (Some(b), Some(g)) => format!("{} {}", b, g),
            (Some(b), None) => b.to_string(),
            (None, Some(g)) => g.to_string(),
            (None, None) => format!("Product {}", barcode),
        }
    }

    /// Converts the remote record into item metadata.
    pub fn into_details(self, barcode: &str) -> ProductDetails {
        ProductDetails {
            barcode: Some(barcode.to_string()),
            brand: self.brands,
            package_quantity: self.quantity,
            image_ref: self.image_url,
            ingredients: self.ingredients_text,
            categories: self.categories,
            nutrition: self.nutriments.map(|n| Nutrition {
                calories_kcal: n.energy_kcal,
                fat_g: n.fat,
                carbohydrates_g: n.carbohydrates,
                protein_g: n.proteins,
            }),
            extra: Default::default(),
        }
    }
}

/// Product lookup backed by the public Open Food Facts HTTP API.
#[derive(Debug, Clone)]
pub struct OpenFoodFactsClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenFoodFactsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.product_api_url.clone())
    }
}

impl ProductLookup for OpenFoodFactsClient {
    async fn fetch(&self, barcode: &str) -> Result<Option<RemoteProduct>, LookupError> {
        let url = format!(
            "{}/api/v2/product/{}.json",
            self.base_url.trim_end_matches('/'),
            barcode
        );

        let response = self
            .http
            .get(&url)
            .query(&[("fields", PRODUCT_FIELDS)])
            .header("User-Agent", "Listfy/1.0")
            .timeout(LOOKUP_TIMEOUT)
            .send()
            .await
            .map_err(|e| LookupError::Request(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(LookupError::Status(response.status().as_u16()));
        }

        let payload: ProductResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Decode(e.to_string()))?;

        if payload.status == 1 {
            Ok(payload.product)
        } else {
            Ok(None)
        }
    }
}
