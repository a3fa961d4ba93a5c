//! Repository layer for shopping item persistence.
//!
//! # Responsibility
//! - Define the data access contract used by the store.
//! - Keep SQL details out of the service layer.
//!
//! # Invariants
//! - Repository APIs report `NotFound` separately from DB transport errors.

pub mod shopping_repo;
