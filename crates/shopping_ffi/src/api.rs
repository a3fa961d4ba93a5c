//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Hold the one process-wide `ShoppingStore` and expose its commands to Dart.
//! - Flatten core errors into plain messages.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - The store is opened once; later opens must name the same path.
//! - An empty returned message means success for `String`-returning calls.

use log::warn;
use shopping_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    ItemId, ShoppingItem, ShoppingLists, ShoppingStore, StoreResult, DEFAULT_DB_FILE_NAME,
};
use std::path::PathBuf;
use std::sync::Mutex;

static STORE: Mutex<Option<StoreSlot>> = Mutex::new(None);

struct StoreSlot {
    db_path: PathBuf,
    store: ShoppingStore,
}

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error`, case-insensitive; blank picks the
///   build default.
/// - `log_dir`: absolute directory for rolling logs.
/// - Returns empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One shopping item as seen by Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingItemView {
    pub id: i64,
    pub title: String,
    pub notes: String,
    pub quantity: i64,
    pub bought: bool,
}

impl From<&ShoppingItem> for ShoppingItemView {
    fn from(item: &ShoppingItem) -> Self {
        Self {
            id: item.id(),
            title: item.title().to_string(),
            notes: item.notes().to_string(),
            quantity: item.quantity(),
            bought: item.bought(),
        }
    }
}

/// Both lists for the list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListsResponse {
    /// Items still to shop, ordered by id.
    pub items: Vec<ShoppingItemView>,
    /// Items already in the cart, ordered by id.
    pub bought_items: Vec<ShoppingItemView>,
    /// Empty on success; error text otherwise.
    pub message: String,
}

impl ShoppingListsResponse {
    fn from_lists(lists: &ShoppingLists) -> Self {
        Self {
            items: lists.items().iter().map(ShoppingItemView::from).collect(),
            bought_items: lists
                .bought_items()
                .iter()
                .map(ShoppingItemView::from)
                .collect(),
            message: String::new(),
        }
    }

    fn failure(message: String) -> Self {
        Self {
            items: Vec::new(),
            bought_items: Vec::new(),
            message,
        }
    }
}

/// Result envelope for store commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingActionResponse {
    /// Whether the command ran without error.
    pub ok: bool,
    /// Item the command targeted or created.
    pub item_id: Option<i64>,
    /// `false` for no-ops (missing id, already bought).
    pub changed: bool,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ShoppingActionResponse {
    fn success(item_id: ItemId, changed: bool, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            item_id: Some(item_id),
            changed,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            item_id: None,
            changed: false,
            message: message.into(),
        }
    }
}

/// Opens the shopping store backed by `db_path`.
///
/// # FFI contract
/// - Call once at app start, before any other `store_*` call.
/// - `db_path` is a database file, or an existing directory that will hold
///   `DEFAULT_DB_FILE_NAME`.
/// - Repeating with the same path is a no-op; a different path is rejected.
/// - Returns empty string on success; otherwise the host should abort startup.
#[flutter_rust_bridge::frb(sync)]
pub fn store_open(db_path: String) -> String {
    let requested = match resolve_db_path(&db_path) {
        Ok(path) => path,
        Err(err) => return err,
    };

    let mut slot = match STORE.lock() {
        Ok(guard) => guard,
        Err(_) => return "store lock poisoned".to_string(),
    };

    if let Some(current) = slot.as_ref() {
        if current.db_path == requested {
            return String::new();
        }
        return format!(
            "store already open at `{}`; refusing to switch to `{}`",
            current.db_path.display(),
            requested.display()
        );
    }

    match ShoppingStore::open(&requested) {
        Ok(store) => {
            *slot = Some(StoreSlot {
                db_path: requested,
                store,
            });
            String::new()
        }
        Err(err) => err.to_string(),
    }
}

/// Returns both derived lists.
#[flutter_rust_bridge::frb(sync)]
pub fn store_lists() -> ShoppingListsResponse {
    match with_store(|store| Ok(ShoppingListsResponse::from_lists(store.lists()))) {
        Ok(response) => response,
        Err(err) => ShoppingListsResponse::failure(format!("store_lists failed: {err}")),
    }
}

/// Creates an unbought item.
#[flutter_rust_bridge::frb(sync)]
pub fn store_create(title: String, notes: String, quantity: i64) -> ShoppingActionResponse {
    match with_store(|store| store.create(title, notes, quantity)) {
        Ok(item) => ShoppingActionResponse::success(item.id(), true, "Item created."),
        Err(err) => ShoppingActionResponse::failure(format!("store_create failed: {err}")),
    }
}

/// Edits title, notes and quantity of an item.
#[flutter_rust_bridge::frb(sync)]
pub fn store_update_item(
    item_id: i64,
    title: String,
    notes: String,
    quantity: i64,
) -> ShoppingActionResponse {
    match with_store(|store| store.update_item(item_id, &title, &notes, quantity)) {
        Ok(true) => ShoppingActionResponse::success(item_id, true, "Item updated."),
        Ok(false) => ShoppingActionResponse::success(item_id, false, "Item not found."),
        Err(err) => ShoppingActionResponse::failure(format!("store_update_item failed: {err}")),
    }
}

/// Moves an item to the cart.
#[flutter_rust_bridge::frb(sync)]
pub fn store_update_buy(item_id: i64) -> ShoppingActionResponse {
    let outcome = with_store(|store| match store.get(item_id)? {
        Some(item) => store.update_buy(&item),
        None => Ok(false),
    });
    match outcome {
        Ok(true) => ShoppingActionResponse::success(item_id, true, "Item bought."),
        Ok(false) => ShoppingActionResponse::success(item_id, false, "Nothing to buy."),
        Err(err) => ShoppingActionResponse::failure(format!("store_update_buy failed: {err}")),
    }
}

/// Deletes an item.
#[flutter_rust_bridge::frb(sync)]
pub fn store_delete(item_id: i64) -> ShoppingActionResponse {
    match with_store(|store| store.delete(item_id)) {
        Ok(true) => ShoppingActionResponse::success(item_id, true, "Item deleted."),
        Ok(false) => ShoppingActionResponse::success(item_id, false, "Item not found."),
        Err(err) => ShoppingActionResponse::failure(format!("store_delete failed: {err}")),
    }
}

fn resolve_db_path(raw: &str) -> Result<PathBuf, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("db_path cannot be empty".to_string());
    }
    let path = PathBuf::from(trimmed);
    if path.is_dir() {
        return Ok(path.join(DEFAULT_DB_FILE_NAME));
    }
    Ok(path)
}

fn with_store<T>(f: impl FnOnce(&mut ShoppingStore) -> StoreResult<T>) -> Result<T, String> {
    let mut slot = STORE
        .lock()
        .map_err(|_| "store lock poisoned".to_string())?;
    let Some(current) = slot.as_mut() else {
        warn!("event=store_call module=ffi status=error error_code=store_not_open");
        return Err("store is not open; call store_open first".to_string());
    };
    f(&mut current.store).map_err(|err| err.to_string())
}
