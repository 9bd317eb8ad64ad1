//! Quiz state and its transitions.
//!
//! Pure domain logic - the context wraps these in a watch channel.

use crate::record::{EntryId, ProgressPatch, ProgressRecord};
use chrono::{DateTime, Utc};
use miniapp_session::UserId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All progress entries plus the one currently in focus.
///
/// Invariant: `active_entry_id`, when set, keys an entry in `entries`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizState {
    entries: BTreeMap<EntryId, ProgressRecord>,
    active_entry_id: Option<EntryId>,
}

impl QuizState {
    pub fn entries(&self) -> &BTreeMap<EntryId, ProgressRecord> {
        &self.entries
    }

    pub fn entry(&self, id: &str) -> Option<&ProgressRecord> {
        self.entries.get(id)
    }

    pub fn active_entry_id(&self) -> Option<&str> {
        self.active_entry_id.as_deref()
    }

    pub fn active_entry(&self) -> Option<&ProgressRecord> {
        self.active_entry_id.as_deref().and_then(|id| self.entries.get(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_mut(&mut self, id: &str, owner: Option<UserId>, now: DateTime<Utc>) -> &mut ProgressRecord {
        self.entries
            .entry(id.to_string())
            .or_insert_with(|| ProgressRecord::new(id, owner, now))
    }

    /// Make `id` active. Returns `false` if it already was.
    pub fn start(&mut self, id: &str, owner: Option<UserId>, now: DateTime<Utc>) -> bool {
        if self.active_entry_id.as_deref() == Some(id) {
            return false;
        }

        let record = self.entry_mut(id, owner, now);
        if record.is_completed() {
            record.reopen(now);
        }
        self.active_entry_id = Some(id.to_string());
        true
    }

    /// Upsert `id` with `patch`. The active entry is not touched.
    pub fn update(&mut self, id: &str, patch: &ProgressPatch, owner: Option<UserId>, now: DateTime<Utc>) {
        self.entry_mut(id, owner, now).apply(patch, now);
    }

    /// Mark `id` complete, creating it if needed, and drop it from focus.
    pub fn complete(&mut self, id: &str, owner: Option<UserId>, now: DateTime<Utc>) {
        self.entry_mut(id, owner, now).complete(now);
        if self.active_entry_id.as_deref() == Some(id) {
            self.active_entry_id = None;
        }
    }

    pub fn clear_active(&mut self) -> bool {
        self.active_entry_id.take().is_some()
    }

    pub fn remove(&mut self, id: &str) -> bool {
        if self.entries.remove(id).is_none() {
            return false;
        }
        if self.active_entry_id.as_deref() == Some(id) {
            self.active_entry_id = None;
        }
        true
    }

    /// Merge records loaded from a backend. Local records that are at least
    /// as recent are kept. Returns how many records were taken.
    pub fn merge(&mut self, records: impl IntoIterator<Item = ProgressRecord>) -> usize {
        let mut taken = 0;
        for mut record in records {
            record.normalize();
            let newer = match self.entries.get(&record.id) {
                Some(local) => record.updated_at > local.updated_at,
                None => true,
            };
            if newer {
                self.entries.insert(record.id.clone(), record);
                taken += 1;
            }
        }
        taken
    }

    pub(crate) fn is_consistent(&self) -> bool {
        match &self.active_entry_id {
            Some(id) => self.entries.contains_key(id),
            None => true,
        }
    }
}
