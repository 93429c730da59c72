//! Store state snapshot and change events.

use super::{TASKS_KEY, TOKENS_KEY, USER_KEY};
use crate::model::session::{TokenSet, UserProfile};
use crate::model::task::{Task, TaskId};

/// One independently persisted piece of store state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    Tasks,
    Tokens,
    User,
}

impl Slice {
    /// Durable store key for this slice.
    pub fn key(self) -> &'static str {
        match self {
            Self::Tasks => TASKS_KEY,
            Self::Tokens => TOKENS_KEY,
            Self::User => USER_KEY,
        }
    }
}

/// Why both session slices were cleared together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearReason {
    /// The user signed out explicitly.
    SignOut,
    /// The remote API rejected the session.
    AuthFailure,
}

/// Committed change delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    TaskAdded(TaskId),
    TaskUpdated(TaskId),
    TaskDeleted(TaskId),
    TokensChanged,
    UserChanged,
    SignedIn,
    SessionCleared(ClearReason),
}

impl StoreChange {
    /// Slices touched by this change.
    pub fn slices(&self) -> &'static [Slice] {
        match self {
            Self::TaskAdded(_) | Self::TaskUpdated(_) | Self::TaskDeleted(_) => &[Slice::Tasks],
            Self::TokensChanged => &[Slice::Tokens],
            Self::UserChanged => &[Slice::User],
            Self::SignedIn | Self::SessionCleared(_) => &[Slice::Tokens, Slice::User],
        }
    }
}

/// In-memory state owned by `TaskStore`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub(super) tasks: Vec<Task>,
    pub(super) tokens: TokenSet,
    pub(super) user: Option<UserProfile>,
}

impl StoreState {
    /// Tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn tokens(&self) -> &TokenSet {
        &self.tokens
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn find_task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }
}
