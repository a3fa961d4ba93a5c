//! Item form view-model.
//!
//! Holds the editable fields of the add/edit sheet and turns "Save" into the
//! matching store command.

use crate::model::shopping_item::{ItemId, ShoppingItem, DEFAULT_QUANTITY};
use crate::service::shopping_store::{ShoppingStore, StoreResult};

/// Result of saving a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Created(ShoppingItem),
    Updated { item_id: ItemId, changed: bool },
}

/// Editable state behind the add/edit item sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingForm {
    pub title: String,
    pub notes: String,
    pub quantity: i64,
    item_id: Option<ItemId>,
}

impl Default for ShoppingForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            notes: String::new(),
            quantity: DEFAULT_QUANTITY,
            item_id: None,
        }
    }
}

impl ShoppingForm {
    /// Blank form for a new item.
    pub fn new() -> Self {
        Self::default()
    }

    /// Form pre-filled from `item`, or `None` once the item is bought.
    pub fn edit(item: &ShoppingItem) -> Option<Self> {
        if item.bought() {
            return None;
        }

        Some(Self {
            title: item.title().to_string(),
            notes: item.notes().to_string(),
            quantity: item.quantity(),
            item_id: Some(item.id()),
        })
    }

    pub fn is_updating(&self) -> bool {
        self.item_id.is_some()
    }

    pub fn item_id(&self) -> Option<ItemId> {
        self.item_id
    }

    /// Applies the form: update when editing, create otherwise.
    pub fn save(&self, store: &mut ShoppingStore) -> StoreResult<FormOutcome> {
        match self.item_id {
            Some(item_id) => {
                let changed =
                    store.update_item(item_id, &self.title, &self.notes, self.quantity)?;
                Ok(FormOutcome::Updated { item_id, changed })
            }
            None => {
                let created =
                    store.create(self.title.as_str(), self.notes.as_str(), self.quantity)?;
                Ok(FormOutcome::Created(created))
            }
        }
    }
}
