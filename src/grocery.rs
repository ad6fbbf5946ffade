//! In-memory grocery lists, one per user.
//!
//! Users are keyed by the id the auth gateway forwards; nothing here outlives
//! the process.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::heuristics::estimate_quantity;
use crate::schema::{now_iso8601, GroceryItem, Ingredient};

/// Fields a client may change on an existing item.
#[derive(Debug, Clone, Copy, Default, serde::Deserialize)]
pub struct ItemUpdate {
    pub completed: Option<bool>,
    pub frequent: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct GroceryStore {
    inner: Arc<RwLock<HashMap<String, Vec<GroceryItem>>>>,
}

impl GroceryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock only means another handler panicked mid-update; the
    // lists themselves are still consistent Vecs.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Vec<GroceryItem>>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Vec<GroceryItem>>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// A user's list: frequent items first, otherwise in insertion order.
    pub fn list(&self, user_id: &str) -> Vec<GroceryItem> {
        let mut items = self.read().get(user_id).cloned().unwrap_or_default();
        items.sort_by_key(|item| !item.frequent);
        items
    }

    /// Add ingredients. An open item with the same name gets the new quantity
    /// instead of a duplicate. Returns the items that were added or updated.
    pub fn add(&self, user_id: &str, ingredients: &[Ingredient]) -> Vec<GroceryItem> {
        let mut store = self.write();
        let items = store.entry(user_id.to_string()).or_default();
        let mut touched = Vec::new();

        for ingredient in ingredients {
            let name = ingredient.name.trim();
            if name.is_empty() {
                continue;
            }
            let quantity = match ingredient.quantity.trim() {
                "" => estimate_quantity(name).to_string(),
                q => q.to_string(),
            };

            let existing = items
                .iter_mut()
                .find(|item| !item.completed && item.name.eq_ignore_ascii_case(name));

            match existing {
                Some(item) => {
                    item.quantity = quantity;
                    touched.push(item.clone());
                }
                None => {
                    let item = GroceryItem {
                        id: Uuid::new_v4(),
                        name: name.to_string(),
                        quantity,
                        completed: false,
                        frequent: false,
                        added_at: now_iso8601(),
                    };
                    touched.push(item.clone());
                    items.push(item);
                }
            }
        }

        tracing::debug!("GroceryStore: {} items touched for '{}'", touched.len(), user_id);
        touched
    }

    pub fn update(&self, user_id: &str, id: Uuid, update: ItemUpdate) -> Option<GroceryItem> {
        let mut store = self.write();
        let item = store.get_mut(user_id)?.iter_mut().find(|i| i.id == id)?;
        if let Some(completed) = update.completed {
            item.completed = completed;
        }
        if let Some(frequent) = update.frequent {
            item.frequent = frequent;
        }
        Some(item.clone())
    }

    /// Returns true if the item existed.
    pub fn remove(&self, user_id: &str, id: Uuid) -> bool {
        let mut store = self.write();
        let Some(items) = store.get_mut(user_id) else {
            return false;
        };
        let before = items.len();
        items.retain(|i| i.id != id);
        items.len() != before
    }

    /// Drop completed items. Frequent items stay on the list, reopened.
    /// Returns how many items were removed.
    pub fn clear_completed(&self, user_id: &str) -> usize {
        let mut store = self.write();
        let Some(items) = store.get_mut(user_id) else {
            return 0;
        };
        let before = items.len();
        items.retain(|i| !i.completed || i.frequent);
        for item in items.iter_mut() {
            item.completed = false;
        }
        before - items.len()
    }
}
