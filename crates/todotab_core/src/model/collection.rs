//! Ordered mapping of to-do ids to records.

use super::todo::{Category, ToDoId, ToDoRecord};
use std::collections::btree_map::{self, BTreeMap};

/// Full to-do collection, iterated in id (creation) order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToDoCollection {
    entries: BTreeMap<ToDoId, ToDoRecord>,
}

impl ToDoCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &ToDoId) -> Option<&ToDoRecord> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &ToDoId) -> Option<&mut ToDoRecord> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &ToDoId) -> bool {
        self.entries.contains_key(id)
    }

    /// Inserts or replaces the record for `id`, returning the previous one.
    pub fn insert(&mut self, id: ToDoId, record: ToDoRecord) -> Option<ToDoRecord> {
        self.entries.insert(id, record)
    }

    pub fn remove(&mut self, id: &ToDoId) -> Option<ToDoRecord> {
        self.entries.remove(id)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ToDoId, ToDoRecord> {
        self.entries.iter()
    }

    /// Records belonging to `category`, in id order.
    pub fn in_category(
        &self,
        category: Category,
    ) -> impl Iterator<Item = (&ToDoId, &ToDoRecord)> + '_ {
        self.entries
            .iter()
            .filter(move |(_, record)| record.category == category)
    }

    /// Next creation-time id at or after `now_epoch_ms`.
    ///
    /// # Invariants
    /// - The returned id is strictly greater than every numeric id present,
    ///   so rapid successive adds (or a clock step backwards) never collide.
    /// - Returns `None` when the newest numeric id is already `u64::MAX`.
    pub fn next_id(&self, now_epoch_ms: u64) -> Option<ToDoId> {
        let floor = match self.entries.keys().rev().find_map(ToDoId::as_millis) {
            Some(latest) => latest.checked_add(1)?,
            None => 0,
        };
        Some(ToDoId::from_millis(now_epoch_ms.max(floor)))
    }
}

impl FromIterator<(ToDoId, ToDoRecord)> for ToDoCollection {
    fn from_iter<T: IntoIterator<Item = (ToDoId, ToDoRecord)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ToDoCollection {
    type Item = (&'a ToDoId, &'a ToDoRecord);
    type IntoIter = btree_map::Iter<'a, ToDoId, ToDoRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
