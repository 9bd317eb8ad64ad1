//! Progress records and patches.

use chrono::{DateTime, Utc};
use miniapp_session::UserId;
use serde::{Deserialize, Serialize};

/// Quiz or practice content id.
pub type EntryId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    #[default]
    InProgress,
    Completed,
}

/// Progress on one quiz or practice item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: EntryId,
    /// User the entry was created for.
    #[serde(default)]
    pub owner: Option<UserId>,
    #[serde(default)]
    pub status: EntryStatus,
    /// Fraction done, always within `[0, 1]`.
    #[serde(default)]
    pub progress: f32,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub correct_answers: Option<u32>,
    #[serde(default)]
    pub total_questions: Option<u32>,
    /// Page-specific state (selected answers, timers, ...).
    #[serde(default)]
    pub data: serde_json::Value,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProgressRecord {
    pub fn new(id: impl Into<EntryId>, owner: Option<UserId>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            owner,
            status: EntryStatus::InProgress,
            progress: 0.0,
            score: None,
            correct_answers: None,
            total_questions: None,
            data: serde_json::Value::Null,
            started_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == EntryStatus::Completed
    }

    /// Apply the fields set in `patch`.
    pub fn apply(&mut self, patch: &ProgressPatch, now: DateTime<Utc>) {
        if let Some(progress) = patch.progress {
            if progress.is_finite() {
                self.progress = progress.clamp(0.0, 1.0);
            } else {
                tracing::debug!(entry = %self.id, progress, "ignoring non-finite progress");
            }
        }
        if let Some(score) = patch.score {
            self.score = Some(score);
        }
        if let Some(correct) = patch.correct_answers {
            self.correct_answers = Some(correct);
        }
        if let Some(total) = patch.total_questions {
            self.total_questions = Some(total);
        }
        if let Some(data) = &patch.data {
            self.data = data.clone();
        }
        self.updated_at = now;
    }

    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.status = EntryStatus::Completed;
        self.progress = 1.0;
        self.completed_at = Some(now);
        self.updated_at = now;
    }

    /// Bring `progress` back into `[0, 1]`. Non-finite values become 1.0 for
    /// a completed record and 0.0 otherwise.
    pub fn normalize(&mut self) {
        if !self.progress.is_finite() {
            tracing::debug!(entry = %self.id, progress = self.progress, "replacing non-finite progress");
            self.progress = if self.is_completed() { 1.0 } else { 0.0 };
        }
        self.progress = self.progress.clamp(0.0, 1.0);
    }

    /// Back to in-progress, keeping what was recorded so far.
    pub fn reopen(&mut self, now: DateTime<Utc>) {
        self.status = EntryStatus::InProgress;
        self.completed_at = None;
        self.updated_at = now;
    }
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressPatch {
    #[serde(default)]
    pub progress: Option<f32>,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub correct_answers: Option<u32>,
    #[serde(default)]
    pub total_questions: Option<u32>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl ProgressPatch {
    pub fn progress(progress: f32) -> Self {
        Self {
            progress: Some(progress),
            ..Default::default()
        }
    }

    pub fn with_score(mut self, score: u32) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_answers(mut self, correct: u32, total: u32) -> Self {
        self.correct_answers = Some(correct);
        self.total_questions = Some(total);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}
