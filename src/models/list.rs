use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::Item;

/// A named shopping list owning its items.
///
/// Items are kept newest-first: additions go to the head and the order
/// is otherwise stable. Archived lists keep their items but leave the
/// active selection pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShoppingList {
    pub id: Uuid,
    pub name: String,
    pub items: Vec<Item>,
    #[serde(default)]
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

impl ShoppingList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            items: Vec::new(),
            is_archived: false,
            created_at: Utc::now(),
        }
    }

    /// True when the list has items and every one is purchased.
    pub fn is_complete(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|i| i.purchased)
    }

    pub fn find_item(&self, item_id: Uuid) -> Option<&Item> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn find_item_mut(&mut self, item_id: Uuid) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }

    /// Position of an item with the given barcode.
    pub fn position_by_barcode(&self, barcode: &str) -> Option<usize> {
        self.items.iter().position(|i| i.barcode() == Some(barcode))
    }

    /// Position of an item whose text matches case-insensitively.
    pub fn position_by_text(&self, text: &str) -> Option<usize> {
        let text_lower = text.to_lowercase();
        self.items
            .iter()
            .position(|i| i.text.to_lowercase() == text_lower)
    }

    /// Sum of all item totals.
    pub fn total_value(&self) -> f64 {
        self.items.iter().map(|i| i.total_value).sum()
    }
}

impl fmt::Display for ShoppingList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_archived { " [archived]" } else { "" };
        write!(f, "{}{} ({} items)", self.name, marker, self.items.len())
    }
}
