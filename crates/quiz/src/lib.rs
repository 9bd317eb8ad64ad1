//! Quiz and practice progress for the mini app.
//!
//! [`QuizDataContext`] holds progress for every quiz or practice item the
//! user touched plus the single active one. Pages mutate it only through
//! its methods and observe it through snapshots or subscriptions.

mod context;
mod record;
mod state;

pub use context::QuizDataContext;
pub use record::{EntryId, EntryStatus, ProgressPatch, ProgressRecord};
pub use state::QuizState;
