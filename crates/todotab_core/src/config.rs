//! Storage key configuration.
//!
//! # Invariants
//! - The three keys are pairwise distinct.

/// Default key holding the serialized to-do collection.
pub const DEFAULT_TODOS_KEY: &str = "@toDos";
/// Default key holding the active list id.
pub const DEFAULT_ACTIVE_CATEGORY_KEY: &str = "@toDoTab";
/// Default key receiving a raw copy of an unreadable collection blob.
pub const DEFAULT_CORRUPT_BACKUP_KEY: &str = "@toDos.corrupt";

/// Names of the key-value slots the repository persists to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub todos: String,
    pub active_category: String,
    pub corrupt_backup: String,
}

impl StorageKeys {
    /// Keys derived from one collection key, e.g. for side-by-side profiles.
    ///
    /// `with_todos_key("@work")` yields `@work`, `@workTab`, `@work.corrupt`.
    pub fn with_todos_key(todos: impl Into<String>) -> Self {
        let todos = todos.into();
        Self {
            active_category: format!("{todos}Tab"),
            corrupt_backup: format!("{todos}.corrupt"),
            todos,
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            todos: DEFAULT_TODOS_KEY.to_string(),
            active_category: DEFAULT_ACTIVE_CATEGORY_KEY.to_string(),
            corrupt_backup: DEFAULT_CORRUPT_BACKUP_KEY.to_string(),
        }
    }
}
