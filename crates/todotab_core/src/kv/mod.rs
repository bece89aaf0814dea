//! Durable key-value slots.
//!
//! # Responsibility
//! - Define the string-keyed, string-valued storage contract the
//!   repository layer persists through.
//! - Provide the SQLite-backed implementation used on device.
//!
//! # Invariants
//! - `set_item` replaces the whole value for a key; there are no partial writes.
//! - Reading a key that was never written yields `None`, not an error.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite_kv;

pub use sqlite_kv::SqliteKeyValueStore;

pub type KvResult<T> = Result<T, KvError>;

/// Key-value storage failure.
#[derive(Debug)]
pub enum KvError {
    /// Underlying database failed.
    Db(DbError),
    /// Storage backend could not serve the request.
    Unavailable(String),
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for KvError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String key-value storage contract.
pub trait KeyValueStore {
    /// Returns the value for `key`, or `None` when it was never written.
    fn get_item(&self, key: &str) -> KvResult<Option<String>>;
    /// Writes `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> KvResult<()>;
    /// Deletes `key`. Deleting a missing key is not an error.
    fn remove_item(&self, key: &str) -> KvResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get_item(&self, key: &str) -> KvResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> KvResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> KvResult<()> {
        (**self).remove_item(key)
    }
}
