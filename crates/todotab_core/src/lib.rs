//! Core of the two-list (Work / Travel) on-device to-do app.
//! This crate owns list state and its durable key-value mirror.

pub mod config;
pub mod db;
pub mod kv;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::StorageKeys;
pub use kv::{KeyValueStore, KvError, KvResult, SqliteKeyValueStore};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::collection::ToDoCollection;
pub use model::todo::{Category, CategoryParseError, ToDoId, ToDoRecord};
pub use repo::todo_repo::{
    decode_todos, encode_todos, KvToDoRepository, LoadOutcome, RepoError, RepoResult,
    ToDoRepository,
};
pub use service::todo_store::{
    ConfirmDelete, DeletePrompt, LoadReport, LoadStatus, RemoveOutcome, StoreError, StoreResult,
    ToDoStore, ToDoView, DELETE_PROMPT,
};

/// Store over the on-device SQLite key-value table.
pub type SqliteToDoStore = ToDoStore<KvToDoRepository<SqliteKeyValueStore>>;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Opens the storage file at `path` and returns a loaded store.
///
/// # Errors
/// - Returns `StoreError::Repo` when the file cannot be opened, migrated or read.
pub fn open_store(path: impl AsRef<std::path::Path>) -> StoreResult<(SqliteToDoStore, LoadReport)> {
    let conn = db::open_db(path)
        .map_err(KvError::from)
        .map_err(RepoError::from)?;
    let mut store = ToDoStore::new(KvToDoRepository::new(SqliteKeyValueStore::new(conn)));
    let report = store.load()?;
    Ok((store, report))
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
