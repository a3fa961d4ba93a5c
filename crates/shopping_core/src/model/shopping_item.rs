//! Shopping item record and view projection.
//!
//! # Responsibility
//! - `ShoppingItemRecord`: the shape stored in `shopping_items`.
//! - `ShoppingItem`: immutable snapshot handed to the UI.
//!
//! # Invariants
//! - `id` is the primary key; no two records share it.
//! - A `ShoppingItem` is only built from a record and has no setters.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Primary key of a shopping item.
pub type ItemId = i64;

/// Quantities offered by the item form picker.
///
/// Only the input UI enforces this range; the store accepts any value.
pub const QUANTITY_OPTIONS: RangeInclusive<i64> = 1..=9;

/// Quantity used when nothing else was chosen.
pub const DEFAULT_QUANTITY: i64 = 1;

/// Column names of the `shopping_items` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShoppingItemColumn {
    Id,
    Title,
    Notes,
    Quantity,
    Bought,
}

impl ShoppingItemColumn {
    pub const ALL: [Self; 5] = [
        Self::Id,
        Self::Title,
        Self::Notes,
        Self::Quantity,
        Self::Bought,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Notes => "notes",
            Self::Quantity => "quantity",
            Self::Bought => "bought",
        }
    }
}

/// Persisted shopping item row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingItemRecord {
    pub id: ItemId,
    pub title: String,
    pub notes: String,
    pub quantity: i64,
    pub bought: bool,
}

impl Default for ShoppingItemRecord {
    fn default() -> Self {
        Self {
            id: 0,
            title: String::new(),
            notes: String::new(),
            quantity: DEFAULT_QUANTITY,
            bought: false,
        }
    }
}

impl ShoppingItemRecord {
    /// Builds an unbought record for insertion.
    pub fn new(
        id: ItemId,
        title: impl Into<String>,
        notes: impl Into<String>,
        quantity: i64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            notes: notes.into(),
            quantity,
            bought: false,
        }
    }
}

/// Read-only snapshot of a shopping item for display.
///
/// Later writes to the underlying record never show through an existing value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingItem {
    id: ItemId,
    title: String,
    notes: String,
    quantity: i64,
    bought: bool,
}

impl ShoppingItem {
    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn bought(&self) -> bool {
        self.bought
    }

    /// Whether the buy action should be offered for this item.
    pub fn can_buy(&self) -> bool {
        !self.bought
    }
}

impl From<&ShoppingItemRecord> for ShoppingItem {
    fn from(record: &ShoppingItemRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            notes: record.notes.clone(),
            quantity: record.quantity,
            bought: record.bought,
        }
    }
}

impl From<ShoppingItemRecord> for ShoppingItem {
    fn from(record: ShoppingItemRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            notes: record.notes,
            quantity: record.quantity,
            bought: record.bought,
        }
    }
}
