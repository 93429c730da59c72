//! Synchronous change subscribers.

use super::state::{StoreChange, StoreState};

/// Handle returned by `TaskStore::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub(super) type Listener = Box<dyn FnMut(&StoreChange, &StoreState) + Send>;

/// Listeners in registration order.
#[derive(Default)]
pub(super) struct Subscribers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

impl Subscribers {
    pub(super) fn add(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(super) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(super) fn notify(&mut self, change: &StoreChange, state: &StoreState) {
        for (_, listener) in &mut self.entries {
            listener(change, state);
        }
    }
}
