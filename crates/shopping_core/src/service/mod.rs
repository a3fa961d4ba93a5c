//! Shopping list use-case services.
//!
//! # Responsibility
//! - Own the database handle and expose the UI-facing commands.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod shopping_form;
pub mod shopping_store;
