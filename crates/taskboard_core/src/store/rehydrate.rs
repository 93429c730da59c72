//! Startup rehydration from the durable store.
//!
//! Every slice is loaded independently. A slice whose value cannot be read
//! or decoded falls back to its empty default and the corrupt key is removed,
//! so one bad slice never blocks the others. A slice that decoded with
//! duplicate entries is written back in its normalized form.

use super::state::{Slice, StoreState};
use crate::model::session::{TokenSet, UserProfile};
use crate::model::task::Task;
use crate::repo::durable_store::DurableStore;
use log::{error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;

pub(super) fn rehydrate<S: DurableStore>(durable: &mut S) -> StoreState {
    let tasks = match load_slice::<_, Vec<Task>>(durable, Slice::Tasks) {
        Some(loaded) => {
            let (tasks, duplicates) = dedupe_tasks(loaded);
            if duplicates > 0 {
                rewrite_normalized(durable, Slice::Tasks, &tasks, duplicates);
            }
            tasks
        }
        None => Vec::new(),
    };

    let tokens = match load_slice::<_, Vec<String>>(durable, Slice::Tokens) {
        Some(values) => {
            let (tokens, duplicates) = TokenSet::from_values(values);
            if duplicates > 0 {
                rewrite_normalized(durable, Slice::Tokens, &tokens, duplicates);
            }
            tokens
        }
        None => TokenSet::new(),
    };

    let user = load_slice::<_, Option<UserProfile>>(durable, Slice::User).flatten();

    StoreState {
        tasks,
        tokens,
        user,
    }
}

fn load_slice<S, T>(durable: &mut S, slice: Slice) -> Option<T>
where
    S: DurableStore,
    T: DeserializeOwned,
{
    let key = slice.key();
    let raw = match durable.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            error!(
                "event=store_rehydrate module=store status=error slice={key} error_code=read_failed error={err}"
            );
            return None;
        }
    };

    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                "event=store_rehydrate module=store status=corrupt slice={key} bytes={} error={err}",
                raw.len()
            );
            if let Err(delete_err) = durable.delete(key) {
                error!(
                    "event=store_rehydrate module=store status=error slice={key} error_code=discard_failed error={delete_err}"
                );
            }
            None
        }
    }
}

/// Keeps the first task for each id; also returns how many were dropped.
fn dedupe_tasks(tasks: Vec<Task>) -> (Vec<Task>, usize) {
    let total = tasks.len();
    let mut seen = HashSet::with_capacity(total);
    let unique: Vec<Task> = tasks
        .into_iter()
        .filter(|task| seen.insert(task.id.clone()))
        .collect();
    let dropped = total - unique.len();
    (unique, dropped)
}

fn rewrite_normalized<S, T>(durable: &mut S, slice: Slice, value: &T, duplicates: usize)
where
    S: DurableStore,
    T: Serialize + ?Sized,
{
    let key = slice.key();
    warn!(
        "event=store_rehydrate module=store status=normalized slice={key} duplicates={duplicates}"
    );
    let written = serde_json::to_string(value)
        .map_err(|err| err.to_string())
        .and_then(|encoded| {
            durable
                .write(key, &encoded)
                .map_err(|err| err.to_string())
        });
    if let Err(err) = written {
        error!(
            "event=store_rehydrate module=store status=error slice={key} error_code=rewrite_failed error={err}"
        );
    }
}
