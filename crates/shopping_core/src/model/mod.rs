//! Shopping list domain model.
//!
//! # Responsibility
//! - Define the persisted record shape and its UI-facing projection.
//!
//! # Invariants
//! - Every item is identified by a unique `ItemId`.
//! - Projections are copied out of records, never written back.

pub mod shopping_item;
