//! Core logic for the shopping list app.
//! This crate owns the database handle and every shopping list invariant.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{DbError, DEFAULT_DB_FILE_NAME};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::shopping_item::{
    ItemId, ShoppingItem, ShoppingItemColumn, ShoppingItemRecord, DEFAULT_QUANTITY,
    QUANTITY_OPTIONS,
};
pub use repo::shopping_repo::{
    RepoError, RepoResult, ShoppingItemQuery, ShoppingItemRepository, SqliteShoppingItemRepository,
    FIRST_ITEM_ID,
};
pub use service::shopping_form::{FormOutcome, ShoppingForm};
pub use service::shopping_store::{
    ShoppingListener, ShoppingLists, ShoppingStore, StoreError, StoreResult, SubscriptionId,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
