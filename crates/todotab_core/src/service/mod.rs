//! Core use-case services.
//!
//! # Responsibility
//! - Own in-memory to-do state and keep it mirrored to the repository.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod todo_store;
