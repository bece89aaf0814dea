//! To-do store: the single owner of list state.
//!
//! # Responsibility
//! - Hold the to-do collection, the active list and per-record editing flags.
//! - Mirror the full collection to the repository after every mutation.
//! - Expose a read-only projection for UI observers.
//!
//! # Invariants
//! - Mutations are write-then-commit: memory changes only after the
//!   repository accepted the new snapshot.
//! - Editing flags live only in memory and are cleared by `load`.
//! - Log lines carry ids and counts, never to-do text.

use crate::model::collection::ToDoCollection;
use crate::model::todo::{Category, ToDoId, ToDoRecord};
use crate::repo::todo_repo::{LoadOutcome, RepoError, ToDoRepository};
use log::{debug, error, info};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure.
#[derive(Debug)]
pub enum StoreError {
    /// Persistence failed; in-memory state was left unchanged.
    Repo(RepoError),
    /// No record with this id.
    NotFound(ToDoId),
    /// Text updates require `begin_edit` first.
    NotEditing(ToDoId),
    /// No creation-time id is left above the newest stored id.
    IdsExhausted,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "to-do not found: {id}"),
            Self::NotEditing(id) => write!(f, "to-do is not being edited: {id}"),
            Self::IdsExhausted => write!(f, "no unused to-do id is available"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::NotFound(_) | Self::NotEditing(_) | Self::IdsExhausted => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Per-slot outcome of [`ToDoStore::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Absent,
    Corrupted { reason: String },
    Loaded,
}

impl<T> From<&LoadOutcome<T>> for LoadStatus {
    fn from(value: &LoadOutcome<T>) -> Self {
        match value {
            LoadOutcome::Absent => Self::Absent,
            LoadOutcome::Corrupted { reason } => Self::Corrupted {
                reason: reason.clone(),
            },
            LoadOutcome::Loaded(_) => Self::Loaded,
        }
    }
}

/// What `load` found in storage. Callers decide how to surface corruption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub todos: LoadStatus,
    pub active_category: LoadStatus,
}

impl LoadReport {
    pub fn has_corruption(&self) -> bool {
        matches!(self.todos, LoadStatus::Corrupted { .. })
            || matches!(self.active_category, LoadStatus::Corrupted { .. })
    }
}

/// Confirmation dialog shown before deleting a to-do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletePrompt {
    pub title: &'static str,
    pub message: &'static str,
    pub cancel_label: &'static str,
    pub confirm_label: &'static str,
}

pub const DELETE_PROMPT: DeletePrompt = DeletePrompt {
    title: "Delete To Do?",
    message: "Are you sure?",
    cancel_label: "Cancel",
    confirm_label: "I'm Sure",
};

/// Yes/no collaborator consulted by [`ToDoStore::remove`].
pub trait ConfirmDelete {
    fn confirm_delete(&mut self, prompt: &DeletePrompt) -> bool;
}

impl<F: FnMut(&DeletePrompt) -> bool> ConfirmDelete for F {
    fn confirm_delete(&mut self, prompt: &DeletePrompt) -> bool {
        self(prompt)
    }
}

/// Result of a confirmed-or-declined delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The user declined; nothing changed.
    Cancelled,
    /// Confirmed, but the id was not in the collection.
    Missing,
    /// Confirmed and removed from memory and storage.
    Removed(ToDoRecord),
}

/// Read-only row for the active list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToDoView {
    pub id: ToDoId,
    pub text: String,
    pub complete: bool,
    pub editing: bool,
}

/// In-memory to-do state mirrored to a [`ToDoRepository`].
pub struct ToDoStore<R: ToDoRepository> {
    repo: R,
    todos: ToDoCollection,
    active: Category,
    editing: BTreeSet<ToDoId>,
}

impl<R: ToDoRepository> ToDoStore<R> {
    /// Creates an empty store on the Work list. Call [`Self::load`] to
    /// adopt persisted state.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            todos: ToDoCollection::new(),
            active: Category::default(),
            editing: BTreeSet::new(),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Reads persisted state and adopts it.
    ///
    /// Absent or corrupted slots fall back to defaults (empty collection,
    /// Work); the report tells which happened.
    ///
    /// # Errors
    /// - Returns `StoreError::Repo` when storage cannot be read; in-memory
    ///   state is untouched in that case.
    pub fn load(&mut self) -> StoreResult<LoadReport> {
        let started_at = Instant::now();
        let todos = self.repo.load_todos()?;
        let active = self.repo.load_active_category()?;

        let report = LoadReport {
            todos: LoadStatus::from(&todos),
            active_category: LoadStatus::from(&active),
        };
        self.todos = todos.into_loaded().unwrap_or_default();
        self.active = active.into_loaded().unwrap_or_default();
        self.editing.clear();

        info!(
            "event=store_load module=store status=ok count={} active={} corrupted={} duration_ms={}",
            self.todos.len(),
            self.active,
            report.has_corruption(),
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    pub fn active_category(&self) -> Category {
        self.active
    }

    /// Persists and switches the active list.
    pub fn set_active_category(&mut self, category: Category) -> StoreResult<()> {
        if let Err(err) = self.repo.save_active_category(category) {
            error!(
                "event=tab_set module=store status=error category={category} error={err}"
            );
            return Err(err.into());
        }
        self.active = category;
        info!("event=tab_set module=store status=ok category={category}");
        Ok(())
    }

    /// Adds an open to-do to `category` and returns its id.
    ///
    /// Returns `Ok(None)` without touching storage when `text` is blank.
    pub fn add(
        &mut self,
        text: impl Into<String>,
        category: Category,
    ) -> StoreResult<Option<ToDoId>> {
        let text = text.into();
        if text.trim().is_empty() {
            debug!("event=todo_add module=store status=skipped reason=empty_text");
            return Ok(None);
        }

        let id = self
            .todos
            .next_id(now_epoch_ms())
            .ok_or(StoreError::IdsExhausted)?;
        let mut next = self.todos.clone();
        next.insert(id.clone(), ToDoRecord::new(text, category));
        self.commit(next, "todo_add", &id)?;
        Ok(Some(id))
    }

    /// Deletes `id` after the collaborator confirms.
    pub fn remove(
        &mut self,
        id: &ToDoId,
        mut confirm: impl ConfirmDelete,
    ) -> StoreResult<RemoveOutcome> {
        if !confirm.confirm_delete(&DELETE_PROMPT) {
            debug!("event=todo_remove module=store status=cancelled id={id}");
            return Ok(RemoveOutcome::Cancelled);
        }

        let mut next = self.todos.clone();
        let Some(removed) = next.remove(id) else {
            debug!("event=todo_remove module=store status=missing id={id}");
            return Ok(RemoveOutcome::Missing);
        };
        self.commit(next, "todo_remove", id)?;
        self.editing.remove(id);
        Ok(RemoveOutcome::Removed(removed))
    }

    /// Flips completion and returns the new value.
    pub fn toggle_complete(&mut self, id: &ToDoId) -> StoreResult<bool> {
        let mut next = self.todos.clone();
        let record = next
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        record.complete = !record.complete;
        let complete = record.complete;
        self.commit(next, "todo_toggle", id)?;
        Ok(complete)
    }

    /// Marks `id` as being edited. Not persisted.
    pub fn begin_edit(&mut self, id: &ToDoId) -> StoreResult<()> {
        self.require(id)?;
        self.editing.insert(id.clone());
        debug!("event=todo_edit module=store status=begin id={id}");
        Ok(())
    }

    /// Replaces the text of a record being edited and persists immediately.
    pub fn update_text(&mut self, id: &ToDoId, text: impl Into<String>) -> StoreResult<()> {
        self.require(id)?;
        if !self.editing.contains(id) {
            return Err(StoreError::NotEditing(id.clone()));
        }

        let mut next = self.todos.clone();
        if let Some(record) = next.get_mut(id) {
            record.text = text.into();
        }
        self.commit(next, "todo_update_text", id)
    }

    /// Commits the current text and leaves editing state.
    ///
    /// The flag stays set when the write fails so the edit can be retried.
    pub fn end_edit(&mut self, id: &ToDoId) -> StoreResult<()> {
        self.require(id)?;
        let snapshot = self.todos.clone();
        self.commit(snapshot, "todo_end_edit", id)?;
        self.editing.remove(id);
        Ok(())
    }

    pub fn get(&self, id: &ToDoId) -> Option<&ToDoRecord> {
        self.todos.get(id)
    }

    pub fn is_editing(&self, id: &ToDoId) -> bool {
        self.editing.contains(id)
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Every record across both lists, in creation order.
    pub fn records(&self) -> &ToDoCollection {
        &self.todos
    }

    /// Rows of the active list, in creation order.
    pub fn visible(&self) -> Vec<ToDoView> {
        self.todos
            .in_category(self.active)
            .map(|(id, record)| ToDoView {
                id: id.clone(),
                text: record.text.clone(),
                complete: record.complete,
                editing: self.editing.contains(id),
            })
            .collect()
    }

    fn require(&self, id: &ToDoId) -> StoreResult<()> {
        if self.todos.contains(id) {
            Ok(())
        } else {
            Err(StoreError::NotFound(id.clone()))
        }
    }

    fn commit(&mut self, next: ToDoCollection, event: &str, id: &ToDoId) -> StoreResult<()> {
        let started_at = Instant::now();
        match self.repo.save_todos(&next) {
            Ok(()) => {
                self.todos = next;
                info!(
                    "event={event} module=store status=ok id={id} count={} duration_ms={}",
                    self.todos.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event={event} module=store status=error id={id} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err.into())
            }
        }
    }
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
