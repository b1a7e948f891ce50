use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// A single entry on a shopping list.
///
/// `total_value` is derived from `quantity * unit_value` and is
/// recomputed by [`recompute_total`](Item::recompute_total) whenever
/// either side changes; it is never authoritative on its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: Uuid,
    pub text: String,
    /// Always >= 1
    pub quantity: u32,
    pub unit_value: f64,
    pub total_value: f64,
    pub purchased: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ProductDetails>,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            quantity: 1,
            unit_value: 0.0,
            total_value: 0.0,
            purchased: false,
            details: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity.max(1);
        self.recompute_total();
        self
    }

    pub fn with_unit_value(mut self, unit_value: f64) -> Self {
        self.unit_value = unit_value;
        self.recompute_total();
        self
    }

    pub fn with_details(mut self, details: ProductDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// Re-derives `total_value` from the current quantity and unit value.
    pub fn recompute_total(&mut self) {
        self.total_value = f64::from(self.quantity) * self.unit_value;
    }

    /// Barcode captured at scan time, if this item came from one.
    pub fn barcode(&self) -> Option<&str> {
        self.details.as_ref().and_then(|d| d.barcode.as_deref())
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let check = if self.purchased { "[x]" } else { "[ ]" };
        if self.unit_value > 0.0 {
            write!(
                f,
                "{} {} x{} = {:.2}",
                check, self.text, self.quantity, self.total_value
            )
        } else {
            write!(f, "{} {} x{}", check, self.text, self.quantity)
        }
    }
}

/// Product metadata captured from a barcode lookup.
///
/// Every field is optional; an item never needs details to exist. The
/// `extra` map carries any fields future lookups may return without a
/// schema change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Nutrition>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ProductDetails {
    pub fn for_barcode(barcode: impl Into<String>) -> Self {
        Self {
            barcode: Some(barcode.into()),
            ..Self::default()
        }
    }
}

/// Per-100g nutritional facts from the product database.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Nutrition {
    pub calories_kcal: Option<f64>,
    pub fat_g: Option<f64>,
    pub carbohydrates_g: Option<f64>,
    pub protein_g: Option<f64>,
}
