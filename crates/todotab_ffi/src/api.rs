//! FFI use-case API for the mobile to-do screen.
//!
//! # Responsibility
//! - Expose the process-wide to-do store to Dart via FRB.
//! - Convert store errors into response envelopes the UI can show.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - One store per process, opened lazily on first use.
//! - Ids and tabs cross the boundary as strings (`work` / `travel`).

use log::warn;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use todotab_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_store,
    ping as ping_inner, Category, DeletePrompt, LoadReport, LoadStatus, RemoveOutcome,
    SqliteToDoStore, ToDoId, DELETE_PROMPT,
};

const DB_FILE_NAME: &str = "todotab.sqlite3";
const DB_PATH_ENV: &str = "TODOTAB_DB_PATH";

static SESSION: Mutex<Option<Session>> = Mutex::new(None);

/// Process-wide store plus what its implicit first load found.
struct Session {
    store: SqliteToDoStore,
    /// Report of the load done on open; kept until `todo_load` hands it out.
    open_report: Option<LoadReport>,
}

impl Session {
    fn open(db_path: &Path) -> Result<Self, String> {
        let (store, report) =
            open_store(db_path).map_err(|err| format!("to-do store open failed: {err}"))?;
        if report.has_corruption() {
            warn!("event=ffi_open module=ffi status=corrupted");
        }
        Ok(Self {
            store,
            open_report: Some(report),
        })
    }

    /// Reloads from storage.
    ///
    /// The first call after open reports corruption found on open even when
    /// a mutation has since rewritten the slot.
    fn load(&mut self) -> Result<LoadReport, String> {
        let fresh = self.store.load().map_err(|err| err.to_string())?;
        match self.open_report.take() {
            Some(on_open) if on_open.has_corruption() => Ok(on_open),
            _ => Ok(fresh),
        }
    }
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// Returns an empty string on success and the error message on failure.
///
/// # FFI contract
/// - Sync call; may create the log directory.
/// - Idempotent for the same `level + log_dir`; reconfiguration returns an error.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One row of a to-do list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub id: String,
    pub text: String,
    pub complete: bool,
    /// Whether the row shows an inline text input.
    pub editing: bool,
}

/// List snapshot for one tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoListResponse {
    pub ok: bool,
    /// Tab the items belong to (`work|travel`).
    pub tab: String,
    /// Placeholder for the new to-do input on this tab.
    pub placeholder: String,
    pub items: Vec<TodoItem>,
    pub message: String,
}

/// Result of (re)loading persisted state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoLoadResponse {
    pub ok: bool,
    /// `absent|corrupted|loaded`.
    pub todos_status: String,
    /// `absent|corrupted|loaded`.
    pub tab_status: String,
    pub active_tab: String,
    pub message: String,
}

/// Generic action envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoActionResponse {
    pub ok: bool,
    /// Affected to-do id, when there is one.
    pub todo_id: Option<String>,
    pub message: String,
}

impl TodoActionResponse {
    fn success(message: impl Into<String>, todo_id: Option<String>) -> Self {
        Self {
            ok: true,
            todo_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            todo_id: None,
            message: message.into(),
        }
    }
}

/// Texts for the delete confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDeletePrompt {
    pub title: String,
    pub message: String,
    pub cancel_label: String,
    pub confirm_label: String,
}

/// Re-reads persisted state, discarding in-memory editing flags.
///
/// Corrupted data is reported, not raised: the UI decides whether to warn.
///
/// # FFI contract
/// - Sync call, DB-backed; opens the store on first use.
/// - The first call reports corruption found when the store was opened,
///   even if a mutation ran before it.
/// - Never panics; storage failures set `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_load() -> TodoLoadResponse {
    let result = with_session(|session| {
        let report = session.load()?;
        Ok((report, session.store.active_category()))
    });

    match result {
        Ok((report, active)) => {
            let message = if report.has_corruption() {
                warn!("event=ffi_load module=ffi status=corrupted");
                "Stored to-dos could not be read; starting empty.".to_string()
            } else {
                "Loaded.".to_string()
            };
            TodoLoadResponse {
                ok: true,
                todos_status: status_label(&report.todos).to_string(),
                tab_status: status_label(&report.active_category).to_string(),
                active_tab: active.as_str().to_string(),
                message,
            }
        }
        Err(err) => TodoLoadResponse {
            ok: false,
            todos_status: String::new(),
            tab_status: String::new(),
            active_tab: Category::default().as_str().to_string(),
            message: format!("todo_load failed: {err}"),
        },
    }
}

/// Lists one tab's to-dos in creation order. `None` lists the active tab.
///
/// # FFI contract
/// - Sync call, in-memory read after the store is open.
/// - Never panics; unknown tabs set `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_list(tab: Option<String>) -> TodoListResponse {
    let result = with_store(|store| {
        let category = match tab.as_deref() {
            Some(value) => parse_tab(value)?,
            None => store.active_category(),
        };
        let items = store
            .records()
            .in_category(category)
            .map(|(id, record)| TodoItem {
                id: id.to_string(),
                text: record.text.clone(),
                complete: record.complete,
                editing: store.is_editing(id),
            })
            .collect::<Vec<_>>();
        Ok((category, items))
    });

    match result {
        Ok((category, items)) => TodoListResponse {
            ok: true,
            tab: category.as_str().to_string(),
            placeholder: category.input_placeholder().to_string(),
            message: format!("{} item(s).", items.len()),
            items,
        },
        Err(err) => TodoListResponse {
            ok: false,
            tab: String::new(),
            placeholder: String::new(),
            items: Vec::new(),
            message: format!("todo_list failed: {err}"),
        },
    }
}

/// Active tab id; `work` when the store cannot be opened.
///
/// # FFI contract
/// - Sync call, in-memory read after the store is open.
/// - Never throws; always returns `work` or `travel`.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_active_tab() -> String {
    with_store(|store| Ok(store.active_category()))
        .unwrap_or_default()
        .as_str()
        .to_string()
}

/// Switches and persists the active tab.
///
/// # FFI contract
/// - Sync call, DB-backed write.
/// - Never panics; the tab only changes when the write succeeded.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_set_tab(tab: String) -> TodoActionResponse {
    let result = with_store(|store| {
        let category = parse_tab(&tab)?;
        store
            .set_active_category(category)
            .map_err(|err| err.to_string())?;
        Ok(category)
    });
    match result {
        Ok(category) => TodoActionResponse::success(format!("{} tab active.", category.label()), None),
        Err(err) => TodoActionResponse::failure(format!("todo_set_tab failed: {err}")),
    }
}

/// Adds a to-do to `tab`, or to the active tab when `None`.
///
/// Blank text is ignored: `ok` stays true and no id is returned.
///
/// # FFI contract
/// - Sync call, DB-backed write of the full collection.
/// - Never panics; returns the created id on success.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_add(text: String, tab: Option<String>) -> TodoActionResponse {
    let result = with_store(|store| {
        let category = match tab.as_deref() {
            Some(value) => parse_tab(value)?,
            None => store.active_category(),
        };
        store.add(text, category).map_err(|err| err.to_string())
    });
    match result {
        Ok(Some(id)) => TodoActionResponse::success("To-do added.", Some(id.to_string())),
        Ok(None) => TodoActionResponse::success("Empty to-do ignored.", None),
        Err(err) => TodoActionResponse::failure(format!("todo_add failed: {err}")),
    }
}

/// Flips completion of one to-do.
///
/// # FFI contract
/// - Sync call, DB-backed write of the full collection.
/// - Never panics; unknown ids set `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_toggle(id: String) -> TodoActionResponse {
    run_on_id("todo_toggle", &id, |store, todo_id| {
        let complete = store
            .toggle_complete(todo_id)
            .map_err(|err| err.to_string())?;
        Ok(if complete {
            "Marked complete."
        } else {
            "Marked open."
        })
    })
}

/// Opens inline editing for one to-do.
///
/// # FFI contract
/// - Sync call, in-memory only; nothing is persisted.
/// - Never panics; unknown ids set `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_begin_edit(id: String) -> TodoActionResponse {
    run_on_id("todo_begin_edit", &id, |store, todo_id| {
        store.begin_edit(todo_id).map_err(|err| err.to_string())?;
        Ok("Editing.")
    })
}

/// Live text update while editing; persisted on every call.
///
/// # FFI contract
/// - Sync call, DB-backed write per keystroke (no debounce).
/// - Requires a prior `todo_begin_edit`.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_update_text(id: String, text: String) -> TodoActionResponse {
    run_on_id("todo_update_text", &id, |store, todo_id| {
        store
            .update_text(todo_id, text)
            .map_err(|err| err.to_string())?;
        Ok("Text updated.")
    })
}

/// Commits the edited text and closes inline editing.
///
/// # FFI contract
/// - Sync call, DB-backed write.
/// - Editing stays open when the write fails.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_end_edit(id: String) -> TodoActionResponse {
    run_on_id("todo_end_edit", &id, |store, todo_id| {
        store.end_edit(todo_id).map_err(|err| err.to_string())?;
        Ok("Edit saved.")
    })
}

/// Dialog texts the UI shows before calling [`todo_remove`].
///
/// # FFI contract
/// - Sync call, non-blocking, no storage access.
/// - Never throws.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_delete_prompt() -> TodoDeletePrompt {
    to_ffi_prompt(&DELETE_PROMPT)
}

/// Deletes one to-do. `confirmed` is the user's answer to the delete prompt.
///
/// # FFI contract
/// - Sync call, DB-backed write when `confirmed` and the id exists.
/// - Never panics; a missing id is reported, not failed.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_remove(id: String, confirmed: bool) -> TodoActionResponse {
    run_on_id("todo_remove", &id, |store, todo_id| {
        let outcome = store
            .remove(todo_id, |_: &DeletePrompt| confirmed)
            .map_err(|err| err.to_string())?;
        Ok(match outcome {
            RemoveOutcome::Cancelled => "Delete cancelled.",
            RemoveOutcome::Missing => "Nothing to delete.",
            RemoveOutcome::Removed(_) => "To-do deleted.",
        })
    })
}

fn run_on_id(
    operation: &str,
    id: &str,
    f: impl FnOnce(&mut SqliteToDoStore, &ToDoId) -> Result<&'static str, String>,
) -> TodoActionResponse {
    let Some(todo_id) = ToDoId::parse(id) else {
        return TodoActionResponse::failure(format!("{operation} failed: to-do id cannot be empty"));
    };
    match with_store(|store| f(store, &todo_id)) {
        Ok(message) => TodoActionResponse::success(message, Some(todo_id.to_string())),
        Err(err) => TodoActionResponse::failure(format!("{operation} failed: {err}")),
    }
}

fn with_store<T>(f: impl FnOnce(&mut SqliteToDoStore) -> Result<T, String>) -> Result<T, String> {
    with_session(|session| f(&mut session.store))
}

fn with_session<T>(f: impl FnOnce(&mut Session) -> Result<T, String>) -> Result<T, String> {
    let mut guard = SESSION
        .lock()
        .map_err(|_| "to-do store lock poisoned".to_string())?;
    if guard.is_none() {
        *guard = Some(Session::open(&resolve_db_path())?);
    }
    let Some(session) = guard.as_mut() else {
        return Err("to-do store unavailable".to_string());
    };
    f(session)
}

fn resolve_db_path() -> PathBuf {
    if let Ok(raw) = std::env::var(DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(DB_FILE_NAME)
}

fn parse_tab(value: &str) -> Result<Category, String> {
    Category::parse(value).map_err(|err| err.to_string())
}

fn status_label(status: &LoadStatus) -> &'static str {
    match status {
        LoadStatus::Absent => "absent",
        LoadStatus::Corrupted { .. } => "corrupted",
        LoadStatus::Loaded => "loaded",
    }
}

fn to_ffi_prompt(prompt: &DeletePrompt) -> TodoDeletePrompt {
    TodoDeletePrompt {
        title: prompt.title.to_string(),
        message: prompt.message.to_string(),
        cancel_label: prompt.cancel_label.to_string(),
        confirm_label: prompt.confirm_label.to_string(),
    }
}
