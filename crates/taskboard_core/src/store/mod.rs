//! Session & task store: the single source of truth for client state.
//!
//! # Responsibility
//! - Hold `tasks`, `tokens` and `user` in memory.
//! - Mirror every mutation into the durable store before it is visible.
//! - Notify subscribers after each committed change.
//!
//! # Invariants
//! - Each slice persists under its own key; an absent key means empty.
//! - `tasks` is always written, even when empty; `tokens` and `user`
//!   delete their key when empty.
//! - A failed durable write leaves in-memory state untouched.
//! - Rehydration never fails on persisted data; corrupt slices default.

use crate::repo::durable_store::StorageError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod rehydrate;
mod state;
mod subscription;
mod task_store;

pub use state::{ClearReason, Slice, StoreChange, StoreState};
pub use subscription::SubscriptionId;
pub use task_store::{ProfileFetch, TaskStore};

/// Durable key of the task collection.
pub const TASKS_KEY: &str = "tasks";
/// Durable key of the bearer token list.
pub const TOKENS_KEY: &str = "tokens";
/// Durable key of the signed-in user profile.
pub const USER_KEY: &str = "user";

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure while synchronizing a slice to the durable store.
#[derive(Debug)]
pub enum StoreError {
    Storage(StorageError),
    Encode(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode store slice: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}
