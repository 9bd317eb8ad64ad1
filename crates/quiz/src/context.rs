//! Shared quiz progress context.

use crate::record::{EntryId, ProgressPatch, ProgressRecord};
use crate::state::QuizState;
use chrono::Utc;
use miniapp_events::CalendarEvent;
use miniapp_session::{UserContext, UserId};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;

/// Quiz and practice progress, read by many page subtrees.
///
/// New entries are stamped with the user current at the time of the call,
/// which is why this context is built on top of [`UserContext`]. Every
/// mutation is synchronous and notifies subscribers.
pub struct QuizDataContext {
    state: watch::Sender<QuizState>,
    user: Arc<UserContext>,
}

impl QuizDataContext {
    pub fn new(user: Arc<UserContext>) -> Self {
        let (state, _) = watch::channel(QuizState::default());
        Self { state, user }
    }

    pub fn snapshot(&self) -> QuizState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QuizState> {
        self.state.subscribe()
    }

    pub fn entries(&self) -> BTreeMap<EntryId, ProgressRecord> {
        self.state.borrow().entries().clone()
    }

    pub fn entry(&self, id: &str) -> Option<ProgressRecord> {
        self.state.borrow().entry(id).cloned()
    }

    pub fn active_entry_id(&self) -> Option<EntryId> {
        self.state.borrow().active_entry_id().map(str::to_owned)
    }

    pub fn active_entry(&self) -> Option<ProgressRecord> {
        self.state.borrow().active_entry().cloned()
    }

    /// Entries created for `user_id`.
    pub fn entries_for(&self, user_id: UserId) -> Vec<ProgressRecord> {
        self.state
            .borrow()
            .entries()
            .values()
            .filter(|r| r.owner == Some(user_id))
            .cloned()
            .collect()
    }

    /// Progress on the content a calendar event points at.
    pub fn progress_for_event(&self, event: &CalendarEvent) -> Option<ProgressRecord> {
        event.content_id.as_deref().and_then(|id| self.entry(id))
    }

    fn owner(&self) -> Option<UserId> {
        self.user.user_id()
    }

    /// Focus `id`, creating it if needed. No-op if it is already active.
    pub fn start_entry(&self, id: &str) -> bool {
        let owner = self.owner();
        let started = self
            .state
            .send_if_modified(|state| state.start(id, owner, Utc::now()));
        if started {
            tracing::debug!(entry = id, "quiz entry started");
        }
        started
    }

    /// Upsert `id`. Tolerates pages that report progress before any remote
    /// data was loaded.
    pub fn update_entry(&self, id: &str, patch: ProgressPatch) {
        let owner = self.owner();
        self.state
            .send_modify(|state| state.update(id, &patch, owner, Utc::now()));
    }

    /// Mark `id` complete; clears the active entry only if it was `id`.
    pub fn complete_entry(&self, id: &str) {
        let owner = self.owner();
        self.state
            .send_modify(|state| state.complete(id, owner, Utc::now()));
        tracing::debug!(entry = id, "quiz entry completed");
    }

    pub fn clear_active(&self) -> bool {
        self.state.send_if_modified(QuizState::clear_active)
    }

    pub fn remove_entry(&self, id: &str) -> bool {
        self.state.send_if_modified(|state| state.remove(id))
    }

    /// Merge records loaded from a backend, keeping newer local progress.
    pub fn hydrate(&self, records: Vec<ProgressRecord>) -> usize {
        let mut taken = 0;
        self.state.send_if_modified(|state| {
            taken = state.merge(records);
            taken > 0
        });
        tracing::debug!(taken, "hydrated quiz entries");
        taken
    }

    #[cfg(test)]
    fn is_consistent(&self) -> bool {
        self.state.borrow().is_consistent()
    }
}
