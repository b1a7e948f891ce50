//! In-memory authoritative state for all shopping lists.
//!
//! All mutations are synchronous and run to completion; each successful
//! mutation schedules a best-effort background snapshot of the full
//! state. The store is constructed once at process start and handed to
//! consumers by reference.

mod error;
mod event;

pub use error::StoreError;
pub use event::StoreEvent;

use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{BarcodeCache, BarcodeCacheEntry, Item, ProductDetails, ShoppingList};
use crate::storage::{self, AppState, JsonStorage, StorageError};
use event::Observer;

/// Payload for [`ListStore::add_item`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub quantity: u32,
    pub unit_value: f64,
    pub details: Option<ProductDetails>,
}

impl Default for NewItem {
    fn default() -> Self {
        Self {
            quantity: 1,
            unit_value: 0.0,
            details: None,
        }
    }
}

impl NewItem {
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_unit_value(mut self, unit_value: f64) -> Self {
        self.unit_value = unit_value;
        self
    }

    pub fn with_details(mut self, details: ProductDetails) -> Self {
        self.details = Some(details);
        self
    }
}

/// Patch for [`ListStore::update_item`]. `None` fields are left as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub text: Option<String>,
    pub unit_value: Option<f64>,
}

/// One line of a cost summary: an item carrying a value.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLine {
    pub text: String,
    pub quantity: u32,
    pub unit_value: f64,
    pub total_value: f64,
}

/// Cost summary for a list, covering only items with a value.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSummary {
    pub list_name: String,
    pub lines: Vec<SummaryLine>,
    pub grand_total: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct PromptFlags {
    prompted: bool,
    dismissed: bool,
}

/// Authoritative store for lists, items, the active-list pointer and
/// the barcode cache.
pub struct ListStore {
    lists: Vec<ShoppingList>,
    active_list_id: Option<Uuid>,
    cache: BarcodeCache,
    prompts: HashMap<Uuid, PromptFlags>,
    observers: Vec<Observer>,
    storage: Option<Arc<JsonStorage>>,
    default_list_name: String,
    task_list_names: Vec<String>,
}

impl ListStore {
    /// Fresh in-memory store with the default list created and active.
    pub fn new(config: &Config) -> Self {
        Self::from_state(AppState::default(), config)
    }

    /// Builds a store from a previously persisted state.
    ///
    /// If no lists exist a default list is created and made active; a
    /// dangling or archived active-list id falls back to the first
    /// non-archived list.
    pub fn from_state(state: AppState, config: &Config) -> Self {
        let mut store = Self {
            lists: state.lists,
            active_list_id: state.active_list_id,
            cache: BarcodeCache::from_map(state.barcode_cache),
            prompts: HashMap::new(),
            observers: Vec::new(),
            storage: None,
            default_list_name: config.default_list_name.clone(),
            task_list_names: config
                .task_list_names
                .iter()
                .map(|n| n.to_lowercase())
                .collect(),
        };

        if store.lists.is_empty() {
            let list = ShoppingList::new(store.default_list_name.as_str());
            store.active_list_id = Some(list.id);
            store.lists.push(list);
        } else if !store.active_is_valid() {
            store.active_list_id = store.first_active_id();
        }

        store
    }

    /// Loads the store from disk and attaches the storage for
    /// background snapshots.
    pub fn load(storage: Arc<JsonStorage>, config: &Config) -> Result<Self, StorageError> {
        let state = storage.load_state()?;
        let mut store = Self::from_state(state, config);
        store.storage = Some(storage);
        store.schedule_save();
        Ok(store)
    }

    /// Registers a callback for store events.
    pub fn subscribe(&mut self, observer: impl Fn(&StoreEvent) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    // ---- list operations ----

    pub fn create_list(&mut self, name: &str) -> Result<Uuid, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::BlankListName);
        }
        let list = ShoppingList::new(name);
        let id = list.id;
        self.lists.push(list);
        if self.active_list_id.is_none() {
            self.active_list_id = Some(id);
        }
        self.schedule_save();
        Ok(id)
    }

    pub fn rename_list(&mut self, list_id: Uuid, name: &str) -> Result<(), StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::BlankListName);
        }
        let list = self
            .lists
            .iter_mut()
            .find(|l| l.id == list_id)
            .ok_or(StoreError::ListNotFound(list_id))?;
        if list.is_archived {
            return Err(StoreError::ListArchived(list_id));
        }
        list.name = name.to_string();
        self.schedule_save();
        Ok(())
    }

    /// Removes a list and all its items.
    ///
    /// Rejected when it would leave zero lists system-wide. If the
    /// deleted list was active, the pointer moves to the first
    /// remaining non-archived list, or clears if none remain.
    pub fn delete_list(&mut self, list_id: Uuid) -> Result<(), StoreError> {
        let idx = self
            .index_of(list_id)
            .ok_or(StoreError::ListNotFound(list_id))?;
        if self.lists.len() == 1 {
            return Err(StoreError::LastList);
        }
        let removed = self.lists.remove(idx);
        self.prompts.remove(&removed.id);
        if self.active_list_id == Some(removed.id) {
            self.active_list_id = self.first_active_id();
        }
        self.schedule_save();
        Ok(())
    }

    /// Archives a list. Item state and the active pointer are left
    /// untouched; selecting a new active list is the caller's job.
    pub fn archive_list(&mut self, list_id: Uuid) -> Result<(), StoreError> {
        let list = self
            .lists
            .iter_mut()
            .find(|l| l.id == list_id)
            .ok_or(StoreError::ListNotFound(list_id))?;
        list.is_archived = true;
        self.prompts.remove(&list_id);
        self.schedule_save();
        Ok(())
    }

    pub fn unarchive_list(&mut self, list_id: Uuid) -> Result<(), StoreError> {
        let list = self
            .lists
            .iter_mut()
            .find(|l| l.id == list_id)
            .ok_or(StoreError::ListNotFound(list_id))?;
        list.is_archived = false;
        self.schedule_save();
        Ok(())
    }

    /// Points the active-list reference at `list_id`. Falls back
    /// silently to the first non-archived list when the id does not
    /// reference one.
    pub fn set_active_list(&mut self, list_id: Uuid) {
        let valid = self
            .lists
            .iter()
            .any(|l| l.id == list_id && !l.is_archived);
        self.active_list_id = if valid {
            Some(list_id)
        } else {
            self.first_active_id()
        };
        self.schedule_save();
    }

    // ---- item operations ----

    /// Adds an item, merging into an existing duplicate where the list
    /// allows it.
    ///
    /// Duplicates are found by barcode first, then by case-insensitive
    /// text. A merge increments the existing quantity; a zero unit
    /// value is upgraded once if the new item supplies a positive one.
    /// Tasks lists never merge and pin quantity at 1 with no value.
    ///
    /// Returns the id of the resulting item, new or merged-into.
    pub fn add_item(
        &mut self,
        list_id: Uuid,
        text: &str,
        new: NewItem,
    ) -> Result<Uuid, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::BlankItemText);
        }
        if new.unit_value < 0.0 {
            return Err(StoreError::NegativeUnitValue);
        }
        let idx = self
            .index_of(list_id)
            .ok_or(StoreError::ListNotFound(list_id))?;
        let is_tasks = self.is_task_list(&self.lists[idx].name);
        let quantity = new.quantity.max(1);

        let list = &mut self.lists[idx];
        let duplicate = if is_tasks {
            None
        } else {
            new.details
                .as_ref()
                .and_then(|d| d.barcode.as_deref())
                .and_then(|code| list.position_by_barcode(code))
                .or_else(|| list.position_by_text(text))
        };

        let item_id = match duplicate {
            Some(pos) => {
                let item = &mut list.items[pos];
                item.quantity += quantity;
                if item.unit_value == 0.0 && new.unit_value > 0.0 {
                    item.unit_value = new.unit_value;
                }
                item.recompute_total();
                item.id
            }
            None => {
                let mut item = Item::new(text);
                item.details = new.details;
                if !is_tasks {
                    item.quantity = quantity;
                    item.unit_value = new.unit_value;
                    item.recompute_total();
                }
                let id = item.id;
                list.items.insert(0, item);
                id
            }
        };

        self.evaluate_archive_prompt(list_id);
        self.schedule_save();
        Ok(item_id)
    }

    /// Adjusts an item's quantity by `delta`, clamped at 1. A no-op on
    /// tasks lists, where quantity is pinned at 1.
    pub fn change_quantity(
        &mut self,
        list_id: Uuid,
        item_id: Uuid,
        delta: i64,
    ) -> Result<(), StoreError> {
        let idx = self
            .index_of(list_id)
            .ok_or(StoreError::ListNotFound(list_id))?;
        let is_tasks = self.is_task_list(&self.lists[idx].name);
        let item = self.lists[idx]
            .find_item_mut(item_id)
            .ok_or(StoreError::ItemNotFound(item_id))?;
        if is_tasks {
            return Ok(());
        }
        let quantity = (i64::from(item.quantity) + delta).max(1);
        item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        item.recompute_total();
        self.schedule_save();
        Ok(())
    }

    pub fn set_purchased(
        &mut self,
        list_id: Uuid,
        item_id: Uuid,
        purchased: bool,
    ) -> Result<(), StoreError> {
        let idx = self
            .index_of(list_id)
            .ok_or(StoreError::ListNotFound(list_id))?;
        let item = self.lists[idx]
            .find_item_mut(item_id)
            .ok_or(StoreError::ItemNotFound(item_id))?;
        item.purchased = purchased;
        self.evaluate_archive_prompt(list_id);
        self.schedule_save();
        Ok(())
    }

    /// Deletes an item. Missing items are a no-op.
    pub fn remove_item(&mut self, list_id: Uuid, item_id: Uuid) -> Result<(), StoreError> {
        let idx = self
            .index_of(list_id)
            .ok_or(StoreError::ListNotFound(list_id))?;
        self.lists[idx].items.retain(|i| i.id != item_id);
        self.evaluate_archive_prompt(list_id);
        self.schedule_save();
        Ok(())
    }

    /// Applies a user-finalized edit to an item.
    ///
    /// Recomputes the total from the existing quantity; on tasks lists
    /// the value fields are left untouched regardless of input. If the
    /// item carries a barcode, the barcode cache is refreshed with the
    /// edited name and value.
    pub fn update_item(
        &mut self,
        list_id: Uuid,
        item_id: Uuid,
        patch: ItemPatch,
    ) -> Result<(), StoreError> {
        if let Some(text) = &patch.text {
            if text.trim().is_empty() {
                return Err(StoreError::BlankItemText);
            }
        }
        if let Some(value) = patch.unit_value {
            if value < 0.0 {
                return Err(StoreError::NegativeUnitValue);
            }
        }
        let idx = self
            .index_of(list_id)
            .ok_or(StoreError::ListNotFound(list_id))?;
        let is_tasks = self.is_task_list(&self.lists[idx].name);
        let item = self.lists[idx]
            .find_item_mut(item_id)
            .ok_or(StoreError::ItemNotFound(item_id))?;

        if let Some(text) = patch.text {
            item.text = text.trim().to_string();
        }
        if !is_tasks {
            if let Some(value) = patch.unit_value {
                item.unit_value = value;
            }
            item.recompute_total();
        }

        let cache_update = item.barcode().map(|code| {
            (
                code.to_string(),
                BarcodeCacheEntry {
                    display_name: item.text.clone(),
                    unit_value: item.unit_value,
                    details: item.details.clone(),
                },
            )
        });
        if let Some((code, entry)) = cache_update {
            self.cache.upsert(code, entry);
        }

        self.schedule_save();
        Ok(())
    }

    // ---- archive prompt ----

    /// True when the list is complete, not archived, and the prompt has
    /// not been dismissed since it last became complete.
    pub fn archive_prompt_pending(&self, list_id: Uuid) -> bool {
        let Some(list) = self.list(list_id) else {
            return false;
        };
        let dismissed = self
            .prompts
            .get(&list_id)
            .map(|f| f.dismissed)
            .unwrap_or(false);
        list.is_complete() && !list.is_archived && !dismissed
    }

    /// Declines the archive prompt; it will not re-fire until the list
    /// becomes incomplete and then complete again.
    pub fn dismiss_archive_prompt(&mut self, list_id: Uuid) -> Result<(), StoreError> {
        if self.index_of(list_id).is_none() {
            return Err(StoreError::ListNotFound(list_id));
        }
        self.prompts.entry(list_id).or_default().dismissed = true;
        Ok(())
    }

    /// Accepts the archive prompt: archives the list and, if it was
    /// active, moves the pointer to the first other non-archived list.
    ///
    /// Returns the new active id; `None` means no non-archived list is
    /// left and the UI should go to list management.
    pub fn confirm_archive_prompt(&mut self, list_id: Uuid) -> Result<Option<Uuid>, StoreError> {
        self.archive_list(list_id)?;
        if self.active_list_id == Some(list_id) {
            self.active_list_id = self.first_active_id();
            self.schedule_save();
        }
        Ok(self.active_list_id)
    }

    fn evaluate_archive_prompt(&mut self, list_id: Uuid) {
        let Some(list) = self.lists.iter().find(|l| l.id == list_id) else {
            return;
        };
        let complete = list.is_complete() && !list.is_archived;

        let fire = {
            let flags = self.prompts.entry(list_id).or_default();
            if !complete {
                flags.prompted = false;
                flags.dismissed = false;
                false
            } else if !flags.prompted && !flags.dismissed {
                flags.prompted = true;
                true
            } else {
                false
            }
        };

        if fire {
            let event = StoreEvent::ArchivePromptReady { list_id };
            for observer in &self.observers {
                observer(&event);
            }
        }
    }

    // ---- selectors ----

    pub fn lists(&self) -> &[ShoppingList] {
        &self.lists
    }

    pub fn list(&self, list_id: Uuid) -> Option<&ShoppingList> {
        self.lists.iter().find(|l| l.id == list_id)
    }

    pub fn active_list_id(&self) -> Option<Uuid> {
        self.active_list_id
    }

    /// The list currently presented as active. A dangling or archived
    /// pointer falls back to the first non-archived list.
    pub fn active_list(&self) -> Option<&ShoppingList> {
        self.active_list_id
            .and_then(|id| self.lists.iter().find(|l| l.id == id && !l.is_archived))
            .or_else(|| self.lists.iter().find(|l| !l.is_archived))
    }

    pub fn get_item(&self, list_id: Uuid, item_id: Uuid) -> Option<&Item> {
        self.list(list_id)?.find_item(item_id)
    }

    /// Cost summary for a list: one line per item carrying a value,
    /// plus the grand total.
    pub fn summary(&self, list_id: Uuid) -> Result<ListSummary, StoreError> {
        let list = self
            .list(list_id)
            .ok_or(StoreError::ListNotFound(list_id))?;
        let lines: Vec<SummaryLine> = list
            .items
            .iter()
            .filter(|i| i.total_value > 0.0 || i.unit_value > 0.0)
            .map(|i| SummaryLine {
                text: i.text.clone(),
                quantity: i.quantity,
                unit_value: i.unit_value,
                total_value: i.total_value,
            })
            .collect();
        let grand_total = lines.iter().map(|l| l.total_value).sum();
        Ok(ListSummary {
            list_name: list.name.clone(),
            lines,
            grand_total,
        })
    }

    /// Shared handle to the barcode cache, for the resolver.
    pub fn barcode_cache(&self) -> BarcodeCache {
        self.cache.clone()
    }

    /// True for list names that suppress quantity/value semantics.
    pub fn is_task_list(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        self.task_list_names.iter().any(|t| *t == name)
    }

    /// Copy of the full persistable state.
    pub fn snapshot(&self) -> AppState {
        AppState {
            lists: self.lists.clone(),
            active_list_id: self.active_list_id,
            barcode_cache: self.cache.snapshot(),
        }
    }

    // ---- internals ----

    fn index_of(&self, list_id: Uuid) -> Option<usize> {
        self.lists.iter().position(|l| l.id == list_id)
    }

    fn first_active_id(&self) -> Option<Uuid> {
        self.lists.iter().find(|l| !l.is_archived).map(|l| l.id)
    }

    fn active_is_valid(&self) -> bool {
        self.active_list_id
            .map(|id| self.lists.iter().any(|l| l.id == id && !l.is_archived))
            .unwrap_or(false)
    }

    fn schedule_save(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        let storage = Arc::clone(storage);
        let state = self.snapshot();
        storage::persist_in_background(move || {
            if let Err(e) = storage.save_state(&state) {
                tracing::warn!("failed to persist app state: {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn store() -> ListStore {
        ListStore::new(&Config::default())
    }

    fn store_with_list(name: &str) -> (ListStore, Uuid) {
        let mut s = store();
        let id = s.create_list(name).unwrap();
        (s, id)
    }

    fn events(s: &mut ListStore) -> Arc<Mutex<Vec<StoreEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        s.subscribe(move |event| sink.lock().unwrap().push(*event));
        seen
    }

    #[test]
    fn test_new_store_bootstraps_default_list() {
        let s = store();
        assert_eq!(s.lists().len(), 1);
        assert_eq!(s.lists()[0].name, "Minha Lista");
        assert_eq!(s.active_list_id(), Some(s.lists()[0].id));
    }

    #[test]
    fn test_create_list_blank_rejected() {
        let mut s = store();
        assert_eq!(s.create_list("   "), Err(StoreError::BlankListName));
    }

    #[test]
    fn test_create_list_trims_name() {
        let mut s = store();
        let id = s.create_list("  Groceries  ").unwrap();
        assert_eq!(s.list(id).unwrap().name, "Groceries");
    }

    #[test]
    fn test_rename_list() {
        let (mut s, id) = store_with_list("Groceries");
        s.rename_list(id, "Weekly Groceries").unwrap();
        assert_eq!(s.list(id).unwrap().name, "Weekly Groceries");

        assert_eq!(s.rename_list(id, " "), Err(StoreError::BlankListName));

        let unknown = Uuid::new_v4();
        assert_eq!(
            s.rename_list(unknown, "x"),
            Err(StoreError::ListNotFound(unknown))
        );
    }

    #[test]
    fn test_rename_archived_list_rejected() {
        let (mut s, id) = store_with_list("Groceries");
        s.archive_list(id).unwrap();
        assert_eq!(
            s.rename_list(id, "Renamed"),
            Err(StoreError::ListArchived(id))
        );
    }

    #[test]
    fn test_delete_last_list_rejected() {
        let mut s = store();
        let id = s.lists()[0].id;
        assert_eq!(s.delete_list(id), Err(StoreError::LastList));
        assert_eq!(s.lists().len(), 1);
    }

    #[test]
    fn test_delete_active_list_reassigns_pointer() {
        let (mut s, second) = store_with_list("Groceries");
        let first = s.lists()[0].id;
        s.set_active_list(second);

        s.delete_list(second).unwrap();
        assert_eq!(s.active_list_id(), Some(first));
    }

    #[test]
    fn test_delete_last_unarchived_clears_pointer() {
        let (mut s, second) = store_with_list("Groceries");
        let first = s.lists()[0].id;
        s.archive_list(first).unwrap();
        s.set_active_list(second);

        s.delete_list(second).unwrap();
        assert_eq!(s.active_list_id(), None);
        assert_eq!(s.lists().len(), 1);
    }

    #[test]
    fn test_set_active_list_falls_back_for_bad_id() {
        let (mut s, second) = store_with_list("Groceries");
        let first = s.lists()[0].id;
        s.set_active_list(second);

        s.set_active_list(Uuid::new_v4());
        assert_eq!(s.active_list_id(), Some(first));

        s.archive_list(second).unwrap();
        s.set_active_list(second);
        assert_eq!(s.active_list_id(), Some(first));
    }

    #[test]
    fn test_active_list_selector_tolerates_archived_pointer() {
        let (mut s, second) = store_with_list("Groceries");
        let first = s.lists()[0].id;
        s.set_active_list(second);
        s.archive_list(second).unwrap();

        // Pointer still references the archived list; selector falls back.
        assert_eq!(s.active_list().unwrap().id, first);
    }

    #[test]
    fn test_add_item_blank_rejected() {
        let (mut s, id) = store_with_list("Groceries");
        assert_eq!(
            s.add_item(id, "  ", NewItem::default()),
            Err(StoreError::BlankItemText)
        );
    }

    #[test]
    fn test_add_item_inserts_at_head() {
        let (mut s, id) = store_with_list("Groceries");
        s.add_item(id, "Milk", NewItem::default()).unwrap();
        s.add_item(id, "Bread", NewItem::default()).unwrap();

        let list = s.list(id).unwrap();
        assert_eq!(list.items[0].text, "Bread");
        assert_eq!(list.items[1].text, "Milk");
    }

    #[test]
    fn test_add_item_merges_case_insensitive_text() {
        let (mut s, id) = store_with_list("Groceries");
        let first = s.add_item(id, "Milk", NewItem::default()).unwrap();
        let second = s
            .add_item(id, "milk", NewItem::default().with_unit_value(4.5))
            .unwrap();

        assert_eq!(first, second);
        let list = s.list(id).unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].quantity, 2);
        // One-time upgrade from unknown price.
        assert_eq!(list.items[0].unit_value, 4.5);
        assert_eq!(list.items[0].total_value, 9.0);
    }

    #[test]
    fn test_merge_keeps_existing_nonzero_unit_value() {
        let (mut s, id) = store_with_list("Groceries");
        s.add_item(id, "Milk", NewItem::default().with_unit_value(4.0))
            .unwrap();
        s.add_item(id, "Milk", NewItem::default().with_unit_value(9.9))
            .unwrap();

        let item = &s.list(id).unwrap().items[0];
        assert_eq!(item.unit_value, 4.0);
        assert_eq!(item.total_value, 8.0);
    }

    #[test]
    fn test_add_item_merges_by_barcode_despite_text() {
        let (mut s, id) = store_with_list("Groceries");
        let details = ProductDetails::for_barcode("7622210449283");
        let first = s
            .add_item(id, "Chocolate", NewItem::default().with_details(details.clone()))
            .unwrap();
        let second = s
            .add_item(id, "Choc biscuits", NewItem::default().with_details(details))
            .unwrap();

        assert_eq!(first, second);
        let list = s.list(id).unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].quantity, 2);
        assert_eq!(list.items[0].text, "Chocolate");
    }

    #[test]
    fn test_tasks_list_never_merges() {
        for name in ["Tarefas", "tasks", "TASKS"] {
            let (mut s, id) = store_with_list(name);
            let details = ProductDetails::for_barcode("12345678");
            let new = NewItem::default()
                .with_quantity(3)
                .with_unit_value(2.5)
                .with_details(details);
            s.add_item(id, "Call dentist", new.clone()).unwrap();
            s.add_item(id, "Call dentist", new).unwrap();

            let list = s.list(id).unwrap();
            assert_eq!(list.items.len(), 2, "list {:?} merged", name);
            for item in &list.items {
                assert_eq!(item.quantity, 1);
                assert_eq!(item.unit_value, 0.0);
                assert_eq!(item.total_value, 0.0);
            }
        }
    }

    #[test]
    fn test_change_quantity_clamps_at_one() {
        let (mut s, id) = store_with_list("Groceries");
        let item = s
            .add_item(id, "Milk", NewItem::default().with_unit_value(4.5))
            .unwrap();

        s.change_quantity(id, item, 3).unwrap();
        assert_eq!(s.get_item(id, item).unwrap().quantity, 4);
        assert_eq!(s.get_item(id, item).unwrap().total_value, 18.0);

        s.change_quantity(id, item, -10).unwrap();
        assert_eq!(s.get_item(id, item).unwrap().quantity, 1);
        assert_eq!(s.get_item(id, item).unwrap().total_value, 4.5);
    }

    #[test]
    fn test_change_quantity_pinned_on_tasks_list() {
        let (mut s, id) = store_with_list("tarefas");
        let item = s.add_item(id, "Water plants", NewItem::default()).unwrap();

        s.change_quantity(id, item, 5).unwrap();
        assert_eq!(s.get_item(id, item).unwrap().quantity, 1);
    }

    #[test]
    fn test_remove_item_idempotent() {
        let (mut s, id) = store_with_list("Groceries");
        let item = s.add_item(id, "Milk", NewItem::default()).unwrap();

        s.remove_item(id, item).unwrap();
        assert!(s.get_item(id, item).is_none());
        // Removing again is a no-op.
        s.remove_item(id, item).unwrap();

        let unknown = Uuid::new_v4();
        assert_eq!(
            s.remove_item(unknown, item),
            Err(StoreError::ListNotFound(unknown))
        );
    }

    #[test]
    fn test_update_item_recomputes_total() {
        let (mut s, id) = store_with_list("Groceries");
        let item = s
            .add_item(id, "Milk", NewItem::default().with_quantity(2))
            .unwrap();

        s.update_item(
            id,
            item,
            ItemPatch {
                text: Some("Whole Milk".to_string()),
                unit_value: Some(5.0),
            },
        )
        .unwrap();

        let got = s.get_item(id, item).unwrap();
        assert_eq!(got.text, "Whole Milk");
        assert_eq!(got.unit_value, 5.0);
        assert_eq!(got.total_value, 10.0);
    }

    #[test]
    fn test_update_item_validation() {
        let (mut s, id) = store_with_list("Groceries");
        let item = s.add_item(id, "Milk", NewItem::default()).unwrap();

        assert_eq!(
            s.update_item(
                id,
                item,
                ItemPatch {
                    text: Some("  ".to_string()),
                    unit_value: None
                }
            ),
            Err(StoreError::BlankItemText)
        );
        assert_eq!(
            s.update_item(
                id,
                item,
                ItemPatch {
                    text: None,
                    unit_value: Some(-1.0)
                }
            ),
            Err(StoreError::NegativeUnitValue)
        );
        // Failed patches leave the item untouched.
        assert_eq!(s.get_item(id, item).unwrap().text, "Milk");
    }

    #[test]
    fn test_update_item_on_tasks_list_ignores_value() {
        let (mut s, id) = store_with_list("tasks");
        let item = s.add_item(id, "Call dentist", NewItem::default()).unwrap();

        s.update_item(
            id,
            item,
            ItemPatch {
                text: Some("Call the dentist".to_string()),
                unit_value: Some(99.0),
            },
        )
        .unwrap();

        let got = s.get_item(id, item).unwrap();
        assert_eq!(got.text, "Call the dentist");
        assert_eq!(got.unit_value, 0.0);
        assert_eq!(got.total_value, 0.0);
    }

    #[test]
    fn test_update_item_refreshes_barcode_cache() {
        let (mut s, id) = store_with_list("Groceries");
        let details = ProductDetails::for_barcode("7622210449283");
        let item = s
            .add_item(id, "Chocolate", NewItem::default().with_details(details))
            .unwrap();
        assert!(s.barcode_cache().get("7622210449283").is_none());

        s.update_item(
            id,
            item,
            ItemPatch {
                text: Some("Dark Chocolate".to_string()),
                unit_value: Some(7.9),
            },
        )
        .unwrap();

        let entry = s.barcode_cache().get("7622210449283").unwrap();
        assert_eq!(entry.display_name, "Dark Chocolate");
        assert_eq!(entry.unit_value, 7.9);
        assert!(entry.details.is_some());
    }

    #[test]
    fn test_update_item_without_barcode_writes_no_cache() {
        let (mut s, id) = store_with_list("Groceries");
        let item = s.add_item(id, "Milk", NewItem::default()).unwrap();

        s.update_item(
            id,
            item,
            ItemPatch {
                text: Some("Whole Milk".to_string()),
                unit_value: None,
            },
        )
        .unwrap();

        assert!(s.barcode_cache().is_empty());
    }

    #[test]
    fn test_archive_prompt_fires_once() {
        let (mut s, id) = store_with_list("Groceries");
        let seen = events(&mut s);
        let a = s.add_item(id, "Milk", NewItem::default()).unwrap();
        let b = s.add_item(id, "Bread", NewItem::default()).unwrap();

        s.set_purchased(id, a, true).unwrap();
        assert!(seen.lock().unwrap().is_empty());

        s.set_purchased(id, b, true).unwrap();
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            [StoreEvent::ArchivePromptReady { list_id: id }]
        );
        assert!(s.archive_prompt_pending(id));

        // Further mutations while complete do not re-fire.
        s.set_purchased(id, a, true).unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_archive_prompt_refires_after_uncheck() {
        let (mut s, id) = store_with_list("Groceries");
        let seen = events(&mut s);
        let a = s.add_item(id, "Milk", NewItem::default()).unwrap();

        s.set_purchased(id, a, true).unwrap();
        s.set_purchased(id, a, false).unwrap();
        assert!(!s.archive_prompt_pending(id));
        s.set_purchased(id, a, true).unwrap();

        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_archive_prompt_dismiss() {
        let (mut s, id) = store_with_list("Groceries");
        let seen = events(&mut s);
        let a = s.add_item(id, "Milk", NewItem::default()).unwrap();
        s.set_purchased(id, a, true).unwrap();

        s.dismiss_archive_prompt(id).unwrap();
        assert!(!s.archive_prompt_pending(id));

        // Still complete; no re-fire while dismissed.
        s.set_purchased(id, a, true).unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);

        // Unchecking clears the dismissed flag; completing re-fires.
        s.set_purchased(id, a, false).unwrap();
        s.set_purchased(id, a, true).unwrap();
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert!(s.archive_prompt_pending(id));
    }

    #[test]
    fn test_removing_last_unpurchased_item_completes_list() {
        let (mut s, id) = store_with_list("Groceries");
        let seen = events(&mut s);
        let a = s.add_item(id, "Milk", NewItem::default()).unwrap();
        let b = s.add_item(id, "Bread", NewItem::default()).unwrap();
        s.set_purchased(id, a, true).unwrap();

        s.remove_item(id, b).unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_confirm_archive_prompt_reassigns_active() {
        let (mut s, second) = store_with_list("Groceries");
        let first = s.lists()[0].id;
        s.set_active_list(second);
        let a = s.add_item(second, "Milk", NewItem::default()).unwrap();
        s.set_purchased(second, a, true).unwrap();

        let new_active = s.confirm_archive_prompt(second).unwrap();
        assert_eq!(new_active, Some(first));
        assert!(s.list(second).unwrap().is_archived);
    }

    #[test]
    fn test_confirm_archive_prompt_with_no_other_list() {
        let mut s = store();
        let id = s.lists()[0].id;
        let a = s.add_item(id, "Milk", NewItem::default()).unwrap();
        s.set_purchased(id, a, true).unwrap();

        let new_active = s.confirm_archive_prompt(id).unwrap();
        assert_eq!(new_active, None);
    }

    #[test]
    fn test_summary() {
        let (mut s, id) = store_with_list("Groceries");
        s.add_item(id, "Milk", NewItem::default().with_quantity(2).with_unit_value(4.5))
            .unwrap();
        s.add_item(id, "Bread", NewItem::default().with_unit_value(6.0))
            .unwrap();
        s.add_item(id, "Napkins", NewItem::default()).unwrap();

        let summary = s.summary(id).unwrap();
        assert_eq!(summary.list_name, "Groceries");
        assert_eq!(summary.lines.len(), 2);
        assert_eq!(summary.grand_total, 15.0);
    }

    #[test]
    fn test_snapshot_roundtrip_through_from_state() {
        let (mut s, id) = store_with_list("Groceries");
        s.add_item(id, "Milk", NewItem::default().with_unit_value(4.5))
            .unwrap();
        s.set_active_list(id);

        let restored = ListStore::from_state(s.snapshot(), &Config::default());
        assert_eq!(restored.lists(), s.lists());
        assert_eq!(restored.active_list_id(), Some(id));
    }

    #[test]
    fn test_persistence_roundtrip_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Arc::new(JsonStorage::new(temp_dir.path().to_path_buf()));
        let config = Config::default();

        let item_id;
        let list_id;
        {
            let mut s = ListStore::load(Arc::clone(&storage), &config).unwrap();
            list_id = s.create_list("Groceries").unwrap();
            item_id = s
                .add_item(list_id, "Milk", NewItem::default().with_unit_value(4.5))
                .unwrap();
            s.set_active_list(list_id);
        }

        let reloaded = ListStore::load(storage, &config).unwrap();
        assert_eq!(reloaded.lists().len(), 2);
        assert_eq!(reloaded.active_list_id(), Some(list_id));
        let item = reloaded.get_item(list_id, item_id).unwrap();
        assert_eq!(item.text, "Milk");
        assert_eq!(item.unit_value, 4.5);
    }

    #[test]
    fn test_load_fixes_dangling_active_pointer() {
        let config = Config::default();
        let mut state = AppState::default();
        let list = ShoppingList::new("Groceries");
        let id = list.id;
        state.lists.push(list);
        state.active_list_id = Some(Uuid::new_v4());

        let s = ListStore::from_state(state, &config);
        assert_eq!(s.active_list_id(), Some(id));
    }
}
