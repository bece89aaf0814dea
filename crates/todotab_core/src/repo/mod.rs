//! Repository layer: persisted shape of the to-do collection and active list.
//!
//! # Responsibility
//! - Define the persistence contract the store depends on.
//! - Own the JSON encoding of the collection and the category literal.
//!
//! # Invariants
//! - Writes always serialize the complete collection.
//! - Reads distinguish absent, corrupted and loaded data instead of
//!   silently defaulting.

pub mod todo_repo;
