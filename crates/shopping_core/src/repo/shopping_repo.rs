//! Shopping item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and filtered reads over the `shopping_items` table.
//! - Map rows to `ShoppingItemRecord` and reject malformed rows.
//!
//! # Invariants
//! - Lookups by id return at most one record.
//! - List results are ordered by `id ASC`.
//! - Writes never touch columns outside the ones named by the operation.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::shopping_item::{ItemId, ShoppingItemColumn, ShoppingItemRecord};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const SHOPPING_ITEMS_TABLE: &str = "shopping_items";

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    title,
    notes,
    quantity,
    bought
FROM shopping_items";

/// Id given to the first item of an empty list.
pub const FIRST_ITEM_ID: ItemId = 1;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for shopping item persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(ItemId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "shopping item not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted shopping item data: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection is not migrated: expected schema version {expected_version}, found {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Filter for listing shopping items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShoppingItemQuery {
    /// `Some(flag)` keeps only items whose `bought` equals `flag`.
    pub bought: Option<bool>,
}

impl ShoppingItemQuery {
    pub fn to_buy() -> Self {
        Self {
            bought: Some(false),
        }
    }

    pub fn bought() -> Self {
        Self { bought: Some(true) }
    }
}

/// Repository interface for shopping item CRUD.
pub trait ShoppingItemRepository {
    /// Returns the id the next created item should get.
    fn next_item_id(&self) -> RepoResult<ItemId>;
    /// Inserts a new record; fails if the id is taken.
    fn insert_item(&self, record: &ShoppingItemRecord) -> RepoResult<ItemId>;
    /// Gets one record by id.
    fn get_item(&self, id: ItemId) -> RepoResult<Option<ShoppingItemRecord>>;
    /// Lists records matching the query, ordered by id.
    fn list_items(&self, query: &ShoppingItemQuery) -> RepoResult<Vec<ShoppingItemRecord>>;
    /// Replaces title, notes and quantity. `bought` is left as is.
    fn update_details(&self, id: ItemId, title: &str, notes: &str, quantity: i64)
        -> RepoResult<()>;
    /// Sets `bought`; returns `false` when it was already set.
    fn mark_bought(&self, id: ItemId) -> RepoResult<bool>;
    /// Removes one record.
    fn delete_item(&self, id: ItemId) -> RepoResult<()>;
}

/// SQLite-backed shopping item repository.
///
/// Accepts a plain connection or, through deref, an open transaction.
pub struct SqliteShoppingItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteShoppingItemRepository<'conn> {
    /// Constructs a repository after checking the connection is migrated.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ShoppingItemRepository for SqliteShoppingItemRepository<'_> {
    fn next_item_id(&self) -> RepoResult<ItemId> {
        let max_id: Option<ItemId> =
            self.conn
                .query_row("SELECT MAX(id) FROM shopping_items;", [], |row| row.get(0))?;

        match max_id {
            None => Ok(FIRST_ITEM_ID),
            Some(current) => current.checked_add(1).ok_or_else(|| {
                RepoError::InvalidData(format!("no id available after `{current}`"))
            }),
        }
    }

    fn insert_item(&self, record: &ShoppingItemRecord) -> RepoResult<ItemId> {
        self.conn.execute(
            "INSERT INTO shopping_items (
                id,
                title,
                notes,
                quantity,
                bought
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                record.id,
                record.title.as_str(),
                record.notes.as_str(),
                record.quantity,
                bool_to_int(record.bought),
            ],
        )?;

        Ok(record.id)
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<ShoppingItemRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(row)?));
        }

        Ok(None)
    }

    fn list_items(&self, query: &ShoppingItemQuery) -> RepoResult<Vec<ShoppingItemRecord>> {
        let mut sql = format!("{ITEM_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(bought) = query.bought {
            sql.push_str(" AND bought = ?");
            bind_values.push(Value::Integer(bool_to_int(bought)));
        }

        sql.push_str(" ORDER BY id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }

        Ok(items)
    }

    fn update_details(
        &self,
        id: ItemId,
        title: &str,
        notes: &str,
        quantity: i64,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE shopping_items
             SET
                title = ?2,
                notes = ?3,
                quantity = ?4
             WHERE id = ?1;",
            params![id, title, notes, quantity],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn mark_bought(&self, id: ItemId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE shopping_items
             SET bought = 1
             WHERE id = ?1
               AND bought = 0;",
            [id],
        )?;

        if changed > 0 {
            return Ok(true);
        }

        if item_exists(self.conn, id)? {
            Ok(false)
        } else {
            Err(RepoError::NotFound(id))
        }
    }

    fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM shopping_items WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<ShoppingItemRecord> {
    let id: ItemId = row.get("id")?;

    let bought = match row.get::<_, i64>("bought")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid bought value `{other}` in shopping_items.bought for id {id}"
            )));
        }
    };

    Ok(ShoppingItemRecord {
        id,
        title: row.get("title")?,
        notes: row.get("notes")?,
        quantity: row.get("quantity")?,
        bought,
    })
}

fn item_exists(conn: &Connection, id: ItemId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM shopping_items WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, SHOPPING_ITEMS_TABLE)? {
        return Err(RepoError::MissingRequiredTable(SHOPPING_ITEMS_TABLE));
    }

    for column in ShoppingItemColumn::ALL {
        if !table_has_column(conn, SHOPPING_ITEMS_TABLE, column.as_str())? {
            return Err(RepoError::MissingRequiredColumn {
                table: SHOPPING_ITEMS_TABLE,
                column: column.as_str(),
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}
