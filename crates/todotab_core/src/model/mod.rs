//! Domain model for the two-list to-do store.
//!
//! # Responsibility
//! - Define the records, identifiers and categories the store operates on.
//! - Keep UI-only transient state (editing) out of persisted entities.
//!
//! # Invariants
//! - Every record is addressed by exactly one `ToDoId`.
//! - Collection iteration order is id order, which is creation order.

pub mod collection;
pub mod todo;
