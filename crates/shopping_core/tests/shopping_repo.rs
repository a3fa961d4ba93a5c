use rusqlite::Connection;
use shopping_core::db::migrations::latest_version;
use shopping_core::db::open_db_in_memory;
use shopping_core::{
    RepoError, ShoppingItemQuery, ShoppingItemRecord, ShoppingItemRepository,
    SqliteShoppingItemRepository, FIRST_ITEM_ID,
};

#[test]
fn next_item_id_starts_at_first_id_and_follows_max() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteShoppingItemRepository::try_new(&conn).unwrap();

    assert_eq!(repo.next_item_id().unwrap(), FIRST_ITEM_ID);

    repo.insert_item(&ShoppingItemRecord::new(5, "a", "", 1))
        .unwrap();
    repo.insert_item(&ShoppingItemRecord::new(2, "b", "", 1))
        .unwrap();
    assert_eq!(repo.next_item_id().unwrap(), 6);
}

#[test]
fn next_item_id_reports_exhausted_id_space() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteShoppingItemRepository::try_new(&conn).unwrap();
    repo.insert_item(&ShoppingItemRecord::new(i64::MAX, "last", "", 1))
        .unwrap();

    assert!(matches!(
        repo.next_item_id(),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn insert_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteShoppingItemRepository::try_new(&conn).unwrap();

    let record = ShoppingItemRecord::new(1, "Milk", "2%", 2);
    let id = repo.insert_item(&record).unwrap();

    assert_eq!(repo.get_item(id).unwrap(), Some(record));
    assert_eq!(repo.get_item(99).unwrap(), None);
}

#[test]
fn insert_rejects_taken_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteShoppingItemRepository::try_new(&conn).unwrap();

    repo.insert_item(&ShoppingItemRecord::new(1, "Milk", "", 1))
        .unwrap();
    let err = repo
        .insert_item(&ShoppingItemRecord::new(1, "Bread", "", 1))
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
}

#[test]
fn list_filters_by_bought_flag_in_id_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteShoppingItemRepository::try_new(&conn).unwrap();

    for (id, title) in [(3, "c"), (1, "a"), (2, "b")] {
        repo.insert_item(&ShoppingItemRecord::new(id, title, "", 1))
            .unwrap();
    }
    repo.mark_bought(2).unwrap();

    let ids = |query: ShoppingItemQuery| -> Vec<i64> {
        repo.list_items(&query)
            .unwrap()
            .into_iter()
            .map(|record| record.id)
            .collect()
    };
    assert_eq!(ids(ShoppingItemQuery::default()), vec![1, 2, 3]);
    assert_eq!(ids(ShoppingItemQuery::to_buy()), vec![1, 3]);
    assert_eq!(ids(ShoppingItemQuery::bought()), vec![2]);
}

#[test]
fn update_details_keeps_bought_flag() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteShoppingItemRepository::try_new(&conn).unwrap();
    repo.insert_item(&ShoppingItemRecord::new(1, "Milk", "", 1))
        .unwrap();
    repo.mark_bought(1).unwrap();

    repo.update_details(1, "Oat milk", "barista", 3).unwrap();

    let loaded = repo.get_item(1).unwrap().unwrap();
    assert_eq!(loaded.title, "Oat milk");
    assert_eq!(loaded.notes, "barista");
    assert_eq!(loaded.quantity, 3);
    assert!(loaded.bought);
}

#[test]
fn missing_ids_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteShoppingItemRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.update_details(7, "x", "", 1),
        Err(RepoError::NotFound(7))
    ));
    assert!(matches!(repo.mark_bought(7), Err(RepoError::NotFound(7))));
    assert!(matches!(repo.delete_item(7), Err(RepoError::NotFound(7))));
}

#[test]
fn mark_bought_reports_whether_it_changed_anything() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteShoppingItemRepository::try_new(&conn).unwrap();
    repo.insert_item(&ShoppingItemRecord::new(1, "Milk", "", 1))
        .unwrap();

    assert!(repo.mark_bought(1).unwrap());
    assert!(!repo.mark_bought(1).unwrap());
}

#[test]
fn delete_removes_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteShoppingItemRepository::try_new(&conn).unwrap();
    repo.insert_item(&ShoppingItemRecord::new(1, "Milk", "", 1))
        .unwrap();

    repo.delete_item(1).unwrap();
    assert_eq!(repo.get_item(1).unwrap(), None);
}

#[test]
fn malformed_bought_value_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         INSERT INTO shopping_items (id, bought) VALUES (1, 5);",
    )
    .unwrap();
    let repo = SqliteShoppingItemRepository::try_new(&conn).unwrap();

    assert!(matches!(repo.get_item(1), Err(RepoError::InvalidData(_))));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteShoppingItemRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_items_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteShoppingItemRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("shopping_items"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE shopping_items (
            id INTEGER PRIMARY KEY NOT NULL,
            title TEXT NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT '',
            quantity INTEGER NOT NULL DEFAULT 1
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteShoppingItemRepository::try_new(&conn),
        Err(RepoError::MissingRequiredColumn {
            table: "shopping_items",
            column: "bought"
        })
    ));
}
