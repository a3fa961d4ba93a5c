//! Shopping store: the single reader/writer of shopping items.
//!
//! # Responsibility
//! - Own the SQLite connection for the lifetime of the app.
//! - Run every command inside one immediate transaction.
//! - Re-query and republish `items` / `bought_items` after each command.
//!
//! # Invariants
//! - `items` and `bought_items` partition the persisted set by `bought`.
//! - Commands targeting a missing id are silent no-ops.
//! - Field values are stored as given; range checks belong to the input UI.

use crate::db::{open_db, open_db_in_memory};
use crate::model::shopping_item::{ItemId, ShoppingItem, ShoppingItemRecord};
use crate::repo::shopping_repo::{
    RepoError, RepoResult, ShoppingItemQuery, ShoppingItemRepository, SqliteShoppingItemRepository,
};
use log::{debug, error, info};
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error.
///
/// `Open` is any startup failure (file, migration or schema readiness) and
/// the host must abort on it. `Repo` covers write/read failures after
/// startup; not-found never surfaces here.
#[derive(Debug)]
pub enum StoreError {
    Open(RepoError),
    Repo(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(err) => write!(f, "failed to open shopping store: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

/// Published snapshot of both derived lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShoppingLists {
    items: Vec<ShoppingItem>,
    bought_items: Vec<ShoppingItem>,
}

impl ShoppingLists {
    /// Items still to buy, ordered by id.
    pub fn items(&self) -> &[ShoppingItem] {
        &self.items
    }

    /// Items already in the cart, ordered by id.
    pub fn bought_items(&self) -> &[ShoppingItem] {
        &self.bought_items
    }

    pub fn is_empty_to_shop(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_cart_empty(&self) -> bool {
        self.bought_items.is_empty()
    }

    /// Number of persisted items across both lists.
    pub fn total_len(&self) -> usize {
        self.items.len() + self.bought_items.len()
    }
}

/// Handle returned by [`ShoppingStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked with the fresh lists after every refresh.
pub type ShoppingListener = Box<dyn FnMut(&ShoppingLists) + Send>;

/// Shopping list store. Construct once at startup and hand it to the UI.
pub struct ShoppingStore {
    conn: Connection,
    lists: ShoppingLists,
    listeners: Vec<(SubscriptionId, ShoppingListener)>,
    next_subscription: u64,
}

impl ShoppingStore {
    /// Opens the database file at `path` and loads both lists.
    ///
    /// # Errors
    /// - `StoreError::Open` when the file cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = open_db(path).map_err(|err| StoreError::Open(err.into()))?;
        Self::new(conn)
    }

    /// Opens a throwaway in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = open_db_in_memory().map_err(|err| StoreError::Open(err.into()))?;
        Self::new(conn)
    }

    /// Wraps an already migrated connection and loads both lists.
    ///
    /// # Errors
    /// - `StoreError::Open` when the connection is not migrated or the
    ///   initial load fails.
    pub fn new(conn: Connection) -> StoreResult<Self> {
        SqliteShoppingItemRepository::try_new(&conn).map_err(StoreError::Open)?;
        let mut store = Self {
            conn,
            lists: ShoppingLists::default(),
            listeners: Vec::new(),
            next_subscription: 0,
        };
        store.refresh().map_err(|err| match err {
            StoreError::Repo(inner) => StoreError::Open(inner),
            open @ StoreError::Open(_) => open,
        })?;
        info!(
            "event=store_open module=store status=ok items={} bought_items={}",
            store.lists.items.len(),
            store.lists.bought_items.len()
        );
        Ok(store)
    }

    /// Items still to buy.
    pub fn items(&self) -> &[ShoppingItem] {
        self.lists.items()
    }

    /// Items already bought.
    pub fn bought_items(&self) -> &[ShoppingItem] {
        self.lists.bought_items()
    }

    /// Both lists as last published.
    pub fn lists(&self) -> &ShoppingLists {
        &self.lists
    }

    /// Reads one item straight from storage.
    pub fn get(&self, id: ItemId) -> StoreResult<Option<ShoppingItem>> {
        let repo = SqliteShoppingItemRepository::try_new(&self.conn)?;
        Ok(repo.get_item(id)?.map(ShoppingItem::from))
    }

    /// Creates an unbought item under the next free id.
    pub fn create(
        &mut self,
        title: impl Into<String>,
        notes: impl Into<String>,
        quantity: i64,
    ) -> StoreResult<ShoppingItem> {
        let title = title.into();
        let notes = notes.into();
        let record = self.write("item_create", |repo| {
            let record = ShoppingItemRecord::new(repo.next_item_id()?, title, notes, quantity);
            repo.insert_item(&record)?;
            Ok(record)
        })?;

        self.refresh()?;
        Ok(ShoppingItem::from(record))
    }

    /// Replaces title, notes and quantity of an item.
    ///
    /// Returns `false` when no item has `id`.
    pub fn update_item(
        &mut self,
        id: ItemId,
        title: &str,
        notes: &str,
        quantity: i64,
    ) -> StoreResult<bool> {
        let outcome = self.write("item_update", |repo| {
            repo.update_details(id, title, notes, quantity)
        });
        let changed = absorb_not_found("item_update", outcome.map(|()| true))?;

        self.refresh()?;
        Ok(changed)
    }

    /// Moves an item to the bought list.
    ///
    /// Returns `false` when the item is gone or already bought.
    pub fn update_buy(&mut self, item: &ShoppingItem) -> StoreResult<bool> {
        let id = item.id();
        let outcome = self.write("item_buy", |repo| repo.mark_bought(id));
        let changed = absorb_not_found("item_buy", outcome)?;

        self.refresh()?;
        Ok(changed)
    }

    /// Removes an item from whichever list holds it.
    ///
    /// Returns `false` when no item has `id`.
    pub fn delete(&mut self, id: ItemId) -> StoreResult<bool> {
        let outcome = self.write("item_delete", |repo| repo.delete_item(id));
        let changed = absorb_not_found("item_delete", outcome.map(|()| true))?;

        self.refresh()?;
        Ok(changed)
    }

    /// Re-queries both lists and notifies listeners.
    pub fn refresh(&mut self) -> StoreResult<()> {
        let repo = SqliteShoppingItemRepository::try_new(&self.conn)?;
        let items = project(repo.list_items(&ShoppingItemQuery::to_buy())?);
        let bought_items = project(repo.list_items(&ShoppingItemQuery::bought())?);

        self.lists = ShoppingLists {
            items,
            bought_items,
        };
        for (_, listener) in &mut self.listeners {
            listener(&self.lists);
        }
        Ok(())
    }

    /// Registers a listener called after every refresh.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&ShoppingLists) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Drops a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(current, _)| *current != id);
        self.listeners.len() != before
    }

    fn write<T>(
        &mut self,
        event: &'static str,
        op: impl FnOnce(&SqliteShoppingItemRepository<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let started_at = Instant::now();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let result = {
            let repo = SqliteShoppingItemRepository::try_new(&tx)?;
            op(&repo)
        };

        match result {
            Ok(value) => {
                tx.commit()?;
                debug!(
                    "event={event} module=store status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                // Dropping `tx` rolls back.
                if !matches!(err, RepoError::NotFound(_)) {
                    error!(
                        "event={event} module=store status=error duration_ms={} error={err}",
                        started_at.elapsed().as_millis()
                    );
                }
                Err(err)
            }
        }
    }
}

fn absorb_not_found(event: &'static str, outcome: RepoResult<bool>) -> StoreResult<bool> {
    match outcome {
        Ok(changed) => Ok(changed),
        Err(RepoError::NotFound(id)) => {
            debug!("event={event} module=store status=noop reason=not_found item_id={id}");
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

fn project(records: Vec<ShoppingItemRecord>) -> Vec<ShoppingItem> {
    records.into_iter().map(ShoppingItem::from).collect()
}
