//! To-do record, identifier and category types.
//!
//! # Invariants
//! - `ToDoId` values are never empty.
//! - Numeric ids order numerically and before non-numeric ids.
//! - `Category` has a stable lowercase wire form (`work` / `travel`).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed list a to-do belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Work list; the default active list.
    #[default]
    Work,
    /// Travel list.
    Travel,
}

impl Category {
    /// All categories in tab order.
    pub const ALL: [Category; 2] = [Category::Work, Category::Travel];

    /// Stable string id used in storage and FFI payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Travel => "travel",
        }
    }

    /// Tab label shown in the header.
    pub fn label(self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Travel => "Travel",
        }
    }

    /// Placeholder for the new to-do input while this list is active.
    pub fn input_placeholder(self) -> &'static str {
        match self {
            Self::Work => "Add a To Do",
            Self::Travel => "Where do you want to go?",
        }
    }

    /// Parses a stored or user-supplied category value.
    ///
    /// Accepts the stable id case-insensitively, surrounding whitespace ignored.
    pub fn parse(value: &str) -> Result<Self, CategoryParseError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(Self::Work),
            "travel" => Ok(Self::Travel),
            _ => Err(CategoryParseError(value.to_string())),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown category string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryParseError(pub String);

impl Display for CategoryParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported category `{}`; expected work|travel",
            self.0
        )
    }
}

impl Error for CategoryParseError {}

/// Opaque to-do identifier derived from creation time.
///
/// New ids are decimal epoch milliseconds. Arbitrary non-empty strings are
/// accepted when loading so previously stored entries keep their identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToDoId(String);

impl ToDoId {
    /// Builds an id from creation time in epoch milliseconds.
    pub fn from_millis(epoch_ms: u64) -> Self {
        Self(epoch_ms.to_string())
    }

    /// Parses an id from its exact string form.
    ///
    /// Returns `None` for empty or whitespace-only input. Other input is kept
    /// verbatim, so `"5"` and `" 5"` stay distinct ids.
    pub fn parse(value: &str) -> Option<Self> {
        if value.trim().is_empty() {
            return None;
        }
        Some(Self(value.to_string()))
    }

    /// Creation time when the id is a plain decimal number.
    pub fn as_millis(&self) -> Option<u64> {
        if self.0.bytes().all(|byte| byte.is_ascii_digit()) {
            self.0.parse().ok()
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for ToDoId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_millis(), other.as_millis()) {
            (Some(left), Some(right)) => left.cmp(&right).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for ToDoId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for ToDoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ToDoId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Err("to-do id cannot be empty".to_string());
        }
        Ok(Self(value))
    }
}

impl From<ToDoId> for String {
    fn from(value: ToDoId) -> Self {
        value.0
    }
}

/// Persisted to-do entry.
///
/// Editing state is intentionally absent; the store tracks it per id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToDoRecord {
    pub text: String,
    pub category: Category,
    pub complete: bool,
}

impl ToDoRecord {
    /// Creates an open (not complete) record.
    pub fn new(text: impl Into<String>, category: Category) -> Self {
        Self {
            text: text.into(),
            category,
            complete: false,
        }
    }
}
