//! To-do repository contract and key-value implementation.
//!
//! # Responsibility
//! - Encode/decode the collection blob and the active-category literal.
//! - Preserve unreadable collection blobs before they can be overwritten.
//!
//! # Invariants
//! - Written records use the explicit `category` field; the legacy
//!   `work: bool` field is only read.
//! - Transient UI state never reaches the encoded blob.

use crate::config::StorageKeys;
use crate::kv::{KeyValueStore, KvError};
use crate::model::collection::ToDoCollection;
use crate::model::todo::{Category, ToDoId, ToDoRecord};
use log::{info, warn};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence failure for to-do reads and writes.
#[derive(Debug)]
pub enum RepoError {
    Storage(KvError),
    Serialization(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "failed to encode to-dos: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Serialization(err) => Some(err),
        }
    }
}

impl From<KvError> for RepoError {
    fn from(value: KvError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Result of reading one persisted slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome<T> {
    /// The key was never written.
    Absent,
    /// The key holds a value that could not be decoded.
    Corrupted { reason: String },
    /// The key decoded successfully.
    Loaded(T),
}

impl<T> LoadOutcome<T> {
    /// Decoded value, or `None` for absent/corrupted slots.
    pub fn into_loaded(self) -> Option<T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Absent | Self::Corrupted { .. } => None,
        }
    }

    pub fn is_corrupted(&self) -> bool {
        matches!(self, Self::Corrupted { .. })
    }

    fn status_label(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Corrupted { .. } => "corrupted",
            Self::Loaded(_) => "loaded",
        }
    }
}

/// Persistence contract for the to-do store.
pub trait ToDoRepository {
    fn load_todos(&self) -> RepoResult<LoadOutcome<ToDoCollection>>;
    fn save_todos(&self, todos: &ToDoCollection) -> RepoResult<()>;
    fn load_active_category(&self) -> RepoResult<LoadOutcome<Category>>;
    fn save_active_category(&self, category: Category) -> RepoResult<()>;
}

/// Repository persisting through any [`KeyValueStore`].
pub struct KvToDoRepository<S: KeyValueStore> {
    store: S,
    keys: StorageKeys,
}

impl<S: KeyValueStore> KvToDoRepository<S> {
    /// Creates a repository using the default device keys.
    pub fn new(store: S) -> Self {
        Self::with_keys(store, StorageKeys::default())
    }

    pub fn with_keys(store: S, keys: StorageKeys) -> Self {
        Self { store, keys }
    }

    /// Backing key-value store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    fn backup_corrupt_blob(&self, raw: &str) {
        // A failed backup must not turn a recoverable load into an error.
        match self.store.set_item(&self.keys.corrupt_backup, raw) {
            Ok(()) => info!(
                "event=todos_backup module=repo status=ok key={} bytes={}",
                self.keys.corrupt_backup,
                raw.len()
            ),
            Err(err) => warn!(
                "event=todos_backup module=repo status=error key={} error={}",
                self.keys.corrupt_backup, err
            ),
        }
    }
}

impl<S: KeyValueStore> ToDoRepository for KvToDoRepository<S> {
    fn load_todos(&self) -> RepoResult<LoadOutcome<ToDoCollection>> {
        let outcome = match self.store.get_item(&self.keys.todos)? {
            None => LoadOutcome::Absent,
            Some(raw) => match decode_todos(&raw) {
                Ok(todos) => LoadOutcome::Loaded(todos),
                Err(reason) => {
                    self.backup_corrupt_blob(&raw);
                    LoadOutcome::Corrupted { reason }
                }
            },
        };

        match &outcome {
            LoadOutcome::Corrupted { reason } => warn!(
                "event=todos_load module=repo status=corrupted key={} error={}",
                self.keys.todos, reason
            ),
            other => info!(
                "event=todos_load module=repo status={} key={}",
                other.status_label(),
                self.keys.todos
            ),
        }
        Ok(outcome)
    }

    fn save_todos(&self, todos: &ToDoCollection) -> RepoResult<()> {
        let encoded = encode_todos(todos)?;
        self.store.set_item(&self.keys.todos, &encoded)?;
        Ok(())
    }

    fn load_active_category(&self) -> RepoResult<LoadOutcome<Category>> {
        let outcome = match self.store.get_item(&self.keys.active_category)? {
            None => LoadOutcome::Absent,
            Some(raw) => match Category::parse(&raw) {
                Ok(category) => LoadOutcome::Loaded(category),
                Err(err) => LoadOutcome::Corrupted {
                    reason: err.to_string(),
                },
            },
        };
        if outcome.is_corrupted() {
            warn!(
                "event=tab_load module=repo status=corrupted key={}",
                self.keys.active_category
            );
        }
        Ok(outcome)
    }

    fn save_active_category(&self, category: Category) -> RepoResult<()> {
        self.store
            .set_item(&self.keys.active_category, category.as_str())?;
        Ok(())
    }
}

#[derive(Serialize)]
struct StoredToDo<'a> {
    text: &'a str,
    category: Category,
    complete: bool,
}

#[derive(Deserialize)]
struct StoredToDoInput {
    text: String,
    #[serde(default)]
    category: Option<Category>,
    /// Legacy encoding: `true` for the work list.
    #[serde(default)]
    work: Option<bool>,
    #[serde(default)]
    complete: bool,
}

struct EncodedTodos<'a>(&'a ToDoCollection);

impl Serialize for EncodedTodos<'_> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_map(self.0.iter().map(|(id, record)| {
            (
                id,
                StoredToDo {
                    text: record.text.as_str(),
                    category: record.category,
                    complete: record.complete,
                },
            )
        }))
    }
}

/// Encodes the full collection as the persisted JSON object, in id order.
pub fn encode_todos(todos: &ToDoCollection) -> serde_json::Result<String> {
    serde_json::to_string(&EncodedTodos(todos))
}

/// Decodes a persisted collection blob.
///
/// Accepts both the current `category` field and the legacy `work` flag.
/// Returns a human-readable reason when the blob is unusable.
pub fn decode_todos(raw: &str) -> Result<ToDoCollection, String> {
    let stored: HashMap<ToDoId, StoredToDoInput> =
        serde_json::from_str(raw).map_err(|err| format!("invalid to-do blob: {err}"))?;

    stored
        .into_iter()
        .map(|(id, input)| {
            let category = match (input.category, input.work) {
                (Some(category), _) => category,
                (None, Some(true)) => Category::Work,
                (None, Some(false)) => Category::Travel,
                (None, None) => {
                    return Err(format!("to-do `{id}` has neither `category` nor `work`"));
                }
            };
            Ok((
                id,
                ToDoRecord {
                    text: input.text,
                    category,
                    complete: input.complete,
                },
            ))
        })
        .collect()
}
