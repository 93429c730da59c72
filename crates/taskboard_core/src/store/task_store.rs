//! Task store implementation.
//!
//! # Responsibility
//! - Apply mutations to `StoreState` through a mutate, persist, commit,
//!   notify sequence.
//! - Guard session state against late profile fetch results.
//!
//! # Invariants
//! - Only the slice touched by a mutation is re-serialized.
//! - In-memory state is committed only after the durable write succeeds.
//! - Subscribers run after both the commit and the durable write.
//! - `session_epoch` increases once a session clear has been committed.

use super::rehydrate::rehydrate;
use super::state::{ClearReason, Slice, StoreChange, StoreState};
use super::subscription::{Subscribers, SubscriptionId};
use super::StoreResult;
use crate::model::session::{TokenSet, UserProfile};
use crate::model::task::{Task, TaskDraft, TaskFilter, TaskId};
use crate::repo::durable_store::DurableStore;
use log::{debug, error, info};

/// Ticket for an in-flight profile fetch.
///
/// Captures the credential used and the session epoch at the time the fetch
/// started. A result is applied only while both are still current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileFetch {
    token: String,
    epoch: u64,
}

impl ProfileFetch {
    /// Rebuilds a ticket handed out earlier as `(token, epoch)`.
    ///
    /// For callers that keep the ticket outside the process boundary, such
    /// as a UI holding it across an asynchronous request.
    pub fn from_parts(token: impl Into<String>, epoch: u64) -> Self {
        Self {
            token: token.into(),
            epoch,
        }
    }

    /// Bearer token the fetch must be sent with.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Authoritative store for tasks and the authentication session.
pub struct TaskStore<S: DurableStore> {
    durable: S,
    state: StoreState,
    subscribers: Subscribers,
    session_epoch: u64,
}

impl<S: DurableStore> TaskStore<S> {
    /// Builds a store and rehydrates every slice from `durable`.
    ///
    /// Corrupt or unreadable slices are logged and replaced with their empty
    /// default; this constructor never fails.
    pub fn open(mut durable: S) -> Self {
        let state = rehydrate(&mut durable);
        info!(
            "event=store_open module=store status=ok tasks={} tokens={} signed_in={}",
            state.tasks.len(),
            state.tokens.len(),
            state.user.is_some()
        );
        Self {
            durable,
            state,
            subscribers: Subscribers::default(),
            session_epoch: 0,
        }
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    /// Tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        self.state.tasks()
    }

    pub fn tokens(&self) -> &TokenSet {
        self.state.tokens()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.state.user()
    }

    /// Active credential for outgoing calls.
    pub fn primary_token(&self) -> Option<&str> {
        self.state.tokens.primary()
    }

    /// Whether a user profile is present.
    pub fn is_authenticated(&self) -> bool {
        self.state.user.is_some()
    }

    pub fn find_task(&self, id: &TaskId) -> Option<&Task> {
        self.state.find_task(id)
    }

    /// Tasks matching `filter`, in display order.
    pub fn filter_tasks(&self, filter: &TaskFilter) -> Vec<&Task> {
        self.state
            .tasks
            .iter()
            .filter(|task| filter.matches(task))
            .collect()
    }

    pub fn durable(&self) -> &S {
        &self.durable
    }

    /// Releases the durable adapter, dropping state and subscribers.
    pub fn into_durable(self) -> S {
        self.durable
    }

    /// Registers a listener called after every committed change.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&StoreChange, &StoreState) + Send + 'static,
    ) -> SubscriptionId {
        self.subscribers.add(Box::new(listener))
    }

    /// Removes a listener; returns `false` for an unknown handle.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Appends a new task with a freshly generated id.
    pub fn add_task(&mut self, draft: TaskDraft) -> StoreResult<Task> {
        let mut id = TaskId::generate();
        while self.state.find_task(&id).is_some() {
            id = TaskId::generate();
        }
        let task = draft.into_task(id.clone());

        let mut tasks = self.state.tasks.clone();
        tasks.push(task.clone());
        self.commit_tasks(tasks)?;
        self.notify(StoreChange::TaskAdded(id));
        Ok(task)
    }

    /// Replaces the task with the same id, keeping its position.
    ///
    /// Returns `false` and leaves the collection unchanged when no task has
    /// that id.
    pub fn update_task(&mut self, task: Task) -> StoreResult<bool> {
        let mut tasks = self.state.tasks.clone();
        let id = task.id.clone();
        let replaced = match tasks.iter_mut().find(|held| held.id == id) {
            Some(slot) => {
                *slot = task;
                true
            }
            None => false,
        };

        self.commit_tasks(tasks)?;
        if replaced {
            self.notify(StoreChange::TaskUpdated(id));
        }
        Ok(replaced)
    }

    /// Removes the task with `id`; returns `false` when none matched.
    pub fn delete_task(&mut self, id: &TaskId) -> StoreResult<bool> {
        let mut tasks = self.state.tasks.clone();
        let before = tasks.len();
        tasks.retain(|task| &task.id != id);
        let removed = tasks.len() != before;

        self.commit_tasks(tasks)?;
        if removed {
            self.notify(StoreChange::TaskDeleted(id.clone()));
        }
        Ok(removed)
    }

    /// Adds `token` unless already held; returns whether it was inserted.
    pub fn set_token(&mut self, token: impl Into<String>) -> StoreResult<bool> {
        let mut tokens = self.state.tokens.clone();
        let inserted = tokens.insert(token);

        self.commit_tokens(tokens)?;
        if inserted {
            self.notify(StoreChange::TokensChanged);
        }
        Ok(inserted)
    }

    /// Removes one token; returns whether it was held.
    pub fn clear_token(&mut self, token: &str) -> StoreResult<bool> {
        let mut tokens = self.state.tokens.clone();
        let removed = tokens.remove(token);

        self.commit_tokens(tokens)?;
        if removed {
            self.notify(StoreChange::TokensChanged);
        }
        Ok(removed)
    }

    /// Drops every token and deletes the durable key. `user` is untouched.
    pub fn clear_all_tokens(&mut self) -> StoreResult<()> {
        let had_tokens = !self.state.tokens.is_empty();

        self.commit_tokens(TokenSet::new())?;
        self.session_epoch += 1;
        if had_tokens {
            self.notify(StoreChange::TokensChanged);
        }
        Ok(())
    }

    /// Replaces the signed-in profile. `tokens` is untouched.
    pub fn set_user(&mut self, profile: UserProfile) -> StoreResult<()> {
        let changed = self.state.user.as_ref() != Some(&profile);

        self.commit_user(Some(profile))?;
        if changed {
            self.notify(StoreChange::UserChanged);
        }
        Ok(())
    }

    /// Clears the profile and deletes the durable key. `tokens` is untouched.
    pub fn clear_user(&mut self) -> StoreResult<()> {
        let had_user = self.state.user.is_some();

        self.commit_user(None)?;
        self.session_epoch += 1;
        if had_user {
            self.notify(StoreChange::UserChanged);
        }
        Ok(())
    }

    /// Records a successful authentication: adds `token` and sets `user`.
    pub fn sign_in(&mut self, profile: UserProfile, token: impl Into<String>) -> StoreResult<()> {
        let mut tokens = self.state.tokens.clone();
        tokens.insert(token);
        self.commit_tokens(tokens)?;

        if let Err(err) = self.commit_user(Some(profile)) {
            self.notify(StoreChange::TokensChanged);
            return Err(err);
        }
        self.notify(StoreChange::SignedIn);
        Ok(())
    }

    /// Clears tokens and user after an explicit sign-out.
    pub fn sign_out(&mut self) -> StoreResult<()> {
        self.clear_session(ClearReason::SignOut)
    }

    /// Clears tokens and user after the remote API rejected the session.
    pub fn invalidate_session(&mut self) -> StoreResult<()> {
        self.clear_session(ClearReason::AuthFailure)
    }

    /// Starts a profile fetch with the primary token.
    ///
    /// Returns `None` when no token is held.
    pub fn begin_profile_fetch(&self) -> Option<ProfileFetch> {
        self.primary_token().map(|token| ProfileFetch {
            token: token.to_string(),
            epoch: self.session_epoch,
        })
    }

    /// Whether a fetch result may still be applied.
    ///
    /// False once the session was cleared after the fetch began, or once the
    /// token it used is no longer held.
    pub fn is_fetch_current(&self, fetch: &ProfileFetch) -> bool {
        fetch.epoch == self.session_epoch && self.state.tokens.contains(&fetch.token)
    }

    fn clear_session(&mut self, reason: ClearReason) -> StoreResult<()> {
        let had_session = !self.state.tokens.is_empty() || self.state.user.is_some();

        self.commit_tokens(TokenSet::new())?;
        self.session_epoch += 1;
        if let Err(err) = self.commit_user(None) {
            self.notify(StoreChange::TokensChanged);
            return Err(err);
        }

        info!(
            "event=session_clear module=store status=ok reason={}",
            match reason {
                ClearReason::SignOut => "sign_out",
                ClearReason::AuthFailure => "auth_failure",
            }
        );
        if had_session {
            self.notify(StoreChange::SessionCleared(reason));
        }
        Ok(())
    }

    fn commit_tasks(&mut self, tasks: Vec<Task>) -> StoreResult<()> {
        let encoded = serde_json::to_string(&tasks)?;
        self.write_slice(Slice::Tasks, Some(encoded.as_str()))?;
        debug!(
            "event=store_sync module=store status=ok slice=tasks count={}",
            tasks.len()
        );
        self.state.tasks = tasks;
        Ok(())
    }

    fn commit_tokens(&mut self, tokens: TokenSet) -> StoreResult<()> {
        if tokens.is_empty() {
            self.write_slice(Slice::Tokens, None)?;
        } else {
            let encoded = serde_json::to_string(&tokens)?;
            self.write_slice(Slice::Tokens, Some(encoded.as_str()))?;
        }
        debug!(
            "event=store_sync module=store status=ok slice=tokens count={}",
            tokens.len()
        );
        self.state.tokens = tokens;
        Ok(())
    }

    fn commit_user(&mut self, user: Option<UserProfile>) -> StoreResult<()> {
        match &user {
            Some(profile) => {
                let encoded = serde_json::to_string(profile)?;
                self.write_slice(Slice::User, Some(encoded.as_str()))?;
            }
            None => self.write_slice(Slice::User, None)?,
        }
        debug!(
            "event=store_sync module=store status=ok slice=user present={}",
            user.is_some()
        );
        self.state.user = user;
        Ok(())
    }

    /// Writes `value` under the slice key, or deletes the key for `None`.
    fn write_slice(&mut self, slice: Slice, value: Option<&str>) -> StoreResult<()> {
        let key = slice.key();
        let result = match value {
            Some(value) => self.durable.write(key, value),
            None => self.durable.delete(key),
        };
        result.map_err(|err| {
            error!(
                "event=store_sync module=store status=error slice={key} error_code=write_failed error={err}"
            );
            err.into()
        })
    }

    fn notify(&mut self, change: StoreChange) {
        self.subscribers.notify(&change, &self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::TaskStore;
    use crate::model::session::UserProfile;
    use crate::model::task::TaskDraft;
    use crate::repo::durable_store::MemoryDurableStore;

    #[test]
    fn fetch_ticket_goes_stale_after_sign_out() {
        let mut store = TaskStore::open(MemoryDurableStore::new());
        store
            .sign_in(UserProfile::new("Alice", "a@x.com"), "tok1")
            .unwrap();

        let fetch = store.begin_profile_fetch().unwrap();
        assert_eq!(fetch.token(), "tok1");
        assert!(store.is_fetch_current(&fetch));

        store.sign_out().unwrap();
        store.set_token("tok1").unwrap();
        assert!(!store.is_fetch_current(&fetch));
    }

    #[test]
    fn begin_profile_fetch_requires_a_token() {
        let store = TaskStore::open(MemoryDurableStore::new());
        assert!(store.begin_profile_fetch().is_none());
    }

    #[test]
    fn add_task_assigns_distinct_ids() {
        let mut store = TaskStore::open(MemoryDurableStore::new());
        let first = store.add_task(TaskDraft::new("a")).unwrap();
        let second = store.add_task(TaskDraft::new("b")).unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(store.tasks().len(), 2);
    }
}
