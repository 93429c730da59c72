//! FFI use-case API for UI-facing calls.
//!
//! # Responsibility
//! - Expose task and session mutations to the UI layer via FRB.
//! - Keep error semantics simple: envelopes with `ok` and a message.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - One store per process, opened on first use and locked for each call;
//!   overlapping calls never interleave a read-modify-write of a slice.
//! - Profile results from the UI are applied only through a fetch ticket.
//! - Enum values cross the boundary as display labels.

use log::warn;
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use taskboard_core::{
    complete_profile_fetch, core_version as core_version_inner, decode_profile_response,
    init_logging as init_logging_inner, ping as ping_inner, ApiError, ProfileFetch,
    SessionOutcome, SqliteDurableStore, Task, TaskCategory, TaskDraft, TaskFilter, TaskId,
    TaskStatus, TaskStore, UserProfile,
};

const STORE_DB_FILE_NAME: &str = "taskboard_store.sqlite3";
const ALL_STATUSES_LABEL: &str = "All Task";
const ALL_CATEGORIES_LABEL: &str = "All Categories";
static TASK_STORE: OnceCell<Mutex<TaskStore<SqliteDurableStore>>> = OnceCell::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Returns an empty string on success and an error message otherwise.
/// Repeating the call with the same `level + log_dir` is a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Task as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: String,
    /// Status display label, e.g. `Collaborative Task`.
    pub status: String,
    /// Category display label, e.g. `Arts and Craft`.
    pub category: String,
    /// Data-URI image payload.
    pub image: Option<String>,
}

/// Envelope for calls that return one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    pub ok: bool,
    pub task: Option<TaskItem>,
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task: &Task) -> Self {
        Self {
            ok: true,
            task: Some(to_task_item(task)),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task: None,
            message: message.into(),
        }
    }
}

/// Envelope for task list calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub ok: bool,
    /// Tasks in display order.
    pub items: Vec<TaskItem>,
    pub message: String,
}

/// Envelope for calls without a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    pub message: String,
}

impl ActionResponse {
    fn from_result(result: Result<String, String>) -> Self {
        match result {
            Ok(message) => Self { ok: true, message },
            Err(message) => Self { ok: false, message },
        }
    }
}

/// Session state as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub ok: bool,
    pub signed_in: bool,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    /// Credential for outgoing API calls.
    pub primary_token: Option<String>,
    pub token_count: u32,
    pub message: String,
}

/// Fields shared by task create and update calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    pub title: String,
    pub description: String,
    pub date: String,
    pub status: String,
    pub category: String,
    pub image: Option<String>,
}

/// Appends a task and returns it with its generated id.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(input: TaskInput) -> TaskActionResponse {
    let draft = match to_task_draft(input) {
        Ok(draft) => draft,
        Err(message) => return TaskActionResponse::failure(message),
    };
    match with_task_store(|store| store.add_task(draft).map_err(|err| err.to_string())) {
        Ok(task) => TaskActionResponse::success("Task created.", &task),
        Err(err) => TaskActionResponse::failure(format!("task_add failed: {err}")),
    }
}

/// Replaces the task with `id`, keeping its position.
#[flutter_rust_bridge::frb(sync)]
pub fn task_update(id: String, input: TaskInput) -> TaskActionResponse {
    let task = match to_task_draft(input) {
        Ok(draft) => draft.into_task(TaskId::from(id.trim())),
        Err(message) => return TaskActionResponse::failure(message),
    };
    let result = with_task_store(|store| {
        store
            .update_task(task.clone())
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(true) => TaskActionResponse::success("Task updated.", &task),
        Ok(false) => TaskActionResponse::failure(format!("Task not found: {}", task.id)),
        Err(err) => TaskActionResponse::failure(format!("task_update failed: {err}")),
    }
}

/// Removes the task with `id`. Unknown ids succeed with a notice.
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(id: String) -> ActionResponse {
    let id = TaskId::from(id.trim());
    ActionResponse::from_result(
        with_task_store(|store| store.delete_task(&id).map_err(|err| err.to_string()))
            .map(|removed| {
                if removed {
                    "Task deleted.".to_string()
                } else {
                    "Task already absent.".to_string()
                }
            })
            .map_err(|err| format!("task_delete failed: {err}")),
    )
}

/// Looks up one task by id.
#[flutter_rust_bridge::frb(sync)]
pub fn task_get(id: String) -> TaskActionResponse {
    let id = TaskId::from(id.trim());
    match with_task_store(|store| Ok(store.find_task(&id).cloned())) {
        Ok(Some(task)) => TaskActionResponse::success("Task found.", &task),
        Ok(None) => TaskActionResponse::failure(format!("Task not found: {id}")),
        Err(err) => TaskActionResponse::failure(format!("task_get failed: {err}")),
    }
}

/// Lists tasks, optionally filtered by status and category labels.
///
/// `None`, `All Task` and `All Categories` match every task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list(status: Option<String>, category: Option<String>) -> TaskListResponse {
    let filter = match to_task_filter(status.as_deref(), category.as_deref()) {
        Ok(filter) => filter,
        Err(message) => {
            return TaskListResponse {
                ok: false,
                items: Vec::new(),
                message,
            }
        }
    };

    let result = with_task_store(|store| {
        Ok(store
            .filter_tasks(&filter)
            .into_iter()
            .map(to_task_item)
            .collect::<Vec<_>>())
    });
    match result {
        Ok(items) => {
            let message = if items.is_empty() {
                "No tasks.".to_string()
            } else {
                format!("Found {} task(s).", items.len())
            };
            TaskListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => TaskListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("task_list failed: {err}"),
        },
    }
}

/// Adds a bearer token; re-adding a held token is a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn session_set_token(token: String) -> ActionResponse {
    let token = token.trim().to_string();
    if token.is_empty() {
        return ActionResponse::from_result(Err("token cannot be empty".to_string()));
    }
    ActionResponse::from_result(
        with_task_store(|store| store.set_token(token).map_err(|err| err.to_string()))
            .map(|inserted| {
                if inserted {
                    "Token stored.".to_string()
                } else {
                    "Token already stored.".to_string()
                }
            })
            .map_err(|err| format!("session_set_token failed: {err}")),
    )
}

/// Removes one bearer token.
#[flutter_rust_bridge::frb(sync)]
pub fn session_clear_token(token: String) -> ActionResponse {
    ActionResponse::from_result(
        with_task_store(|store| {
            store
                .clear_token(token.trim())
                .map_err(|err| err.to_string())
        })
        .map(|_| "Token cleared.".to_string())
        .map_err(|err| format!("session_clear_token failed: {err}")),
    )
}

/// Removes every bearer token. The user profile is kept.
#[flutter_rust_bridge::frb(sync)]
pub fn session_clear_tokens() -> ActionResponse {
    ActionResponse::from_result(
        with_task_store(|store| store.clear_all_tokens().map_err(|err| err.to_string()))
            .map(|()| "Tokens cleared.".to_string())
            .map_err(|err| format!("session_clear_tokens failed: {err}")),
    )
}

/// Stores the signed-in user profile after a successful login.
///
/// Profile refresh results go through `session_complete_profile_fetch`.
#[flutter_rust_bridge::frb(sync)]
pub fn session_set_user(name: String, email: String) -> ActionResponse {
    let profile = UserProfile::new(name.trim(), email.trim());
    ActionResponse::from_result(
        with_task_store(|store| store.set_user(profile).map_err(|err| err.to_string()))
            .map(|()| "User stored.".to_string())
            .map_err(|err| format!("session_set_user failed: {err}")),
    )
}

/// Clears the user profile. Tokens are kept.
#[flutter_rust_bridge::frb(sync)]
pub fn session_clear_user() -> ActionResponse {
    ActionResponse::from_result(
        with_task_store(|store| store.clear_user().map_err(|err| err.to_string()))
            .map(|()| "User cleared.".to_string())
            .map_err(|err| format!("session_clear_user failed: {err}")),
    )
}

/// Clears tokens and user together after the UI signed out remotely.
#[flutter_rust_bridge::frb(sync)]
pub fn session_sign_out() -> ActionResponse {
    ActionResponse::from_result(
        with_task_store(|store| store.sign_out().map_err(|err| err.to_string()))
            .map(|()| "Signed out.".to_string())
            .map_err(|err| format!("session_sign_out failed: {err}")),
    )
}

/// Ticket for a `GET /user` request performed by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileFetchTicket {
    pub ok: bool,
    /// Bearer token to send; `None` when signed out.
    pub token: Option<String>,
    /// Session epoch the ticket was issued in; pass back unchanged.
    pub epoch: u64,
    pub message: String,
}

/// Result of applying a profile response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileFetchResponse {
    pub ok: bool,
    /// `refreshed`, `discarded` or `redirect_to_sign_in`.
    pub outcome: String,
    pub redirect_to_sign_in: bool,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub message: String,
}

/// Starts a profile refresh with the primary token.
#[flutter_rust_bridge::frb(sync)]
pub fn session_begin_profile_fetch() -> ProfileFetchTicket {
    match with_task_store(|store| Ok(store.begin_profile_fetch())) {
        Ok(Some(fetch)) => ProfileFetchTicket {
            ok: true,
            token: Some(fetch.token().to_string()),
            epoch: fetch.epoch(),
            message: String::new(),
        },
        Ok(None) => ProfileFetchTicket {
            ok: true,
            message: "Signed out.".to_string(),
            ..ProfileFetchTicket::default()
        },
        Err(err) => ProfileFetchTicket {
            message: format!("session_begin_profile_fetch failed: {err}"),
            ..ProfileFetchTicket::default()
        },
    }
}

/// Applies the outcome of a profile request started with
/// `session_begin_profile_fetch`.
///
/// `response_body` is the raw `GET /user` body, or `None` when the request
/// failed. A stale ticket is discarded without touching state; a failure or
/// malformed body clears the session.
#[flutter_rust_bridge::frb(sync)]
pub fn session_complete_profile_fetch(
    token: String,
    epoch: u64,
    response_body: Option<String>,
) -> ProfileFetchResponse {
    let fetch = ProfileFetch::from_parts(token, epoch);
    let result = match response_body {
        Some(body) => decode_profile_response(&body),
        None => Err(ApiError::Transport("profile request failed".to_string())),
    };

    match with_task_store(|store| {
        complete_profile_fetch(store, &fetch, result).map_err(|err| err.to_string())
    }) {
        Ok(SessionOutcome::Refreshed(profile)) => ProfileFetchResponse {
            ok: true,
            outcome: "refreshed".to_string(),
            user_name: Some(profile.name),
            user_email: Some(profile.email),
            message: "Profile refreshed.".to_string(),
            ..ProfileFetchResponse::default()
        },
        Ok(SessionOutcome::RedirectToSignIn) => ProfileFetchResponse {
            ok: true,
            outcome: "redirect_to_sign_in".to_string(),
            redirect_to_sign_in: true,
            message: "Session cleared.".to_string(),
            ..ProfileFetchResponse::default()
        },
        Ok(SessionOutcome::Discarded | SessionOutcome::SignedOut) => ProfileFetchResponse {
            ok: true,
            outcome: "discarded".to_string(),
            message: "Session changed; result ignored.".to_string(),
            ..ProfileFetchResponse::default()
        },
        Err(err) => ProfileFetchResponse {
            message: format!("session_complete_profile_fetch failed: {err}"),
            ..ProfileFetchResponse::default()
        },
    }
}

/// Returns the current session state.
#[flutter_rust_bridge::frb(sync)]
pub fn session_snapshot() -> SessionSnapshot {
    let result = with_task_store(|store| {
        let user = store.user();
        Ok(SessionSnapshot {
            ok: true,
            signed_in: store.is_authenticated(),
            user_name: user.map(|profile| profile.name.clone()),
            user_email: user.map(|profile| profile.email.clone()),
            primary_token: store.primary_token().map(str::to_string),
            token_count: u32::try_from(store.tokens().len()).unwrap_or(u32::MAX),
            message: String::new(),
        })
    });
    result.unwrap_or_else(|err| SessionSnapshot {
        message: format!("session_snapshot failed: {err}"),
        ..SessionSnapshot::default()
    })
}

fn store_db_path_from(configured: Option<String>) -> PathBuf {
    configured
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join(STORE_DB_FILE_NAME))
}

#[cfg(not(test))]
fn resolve_store_db_path() -> PathBuf {
    store_db_path_from(std::env::var(taskboard_core::config::ENV_DB_PATH).ok())
}

#[cfg(test)]
fn resolve_store_db_path() -> PathBuf {
    tests::isolated_db_path()
}

fn with_task_store<T>(
    f: impl FnOnce(&mut TaskStore<SqliteDurableStore>) -> Result<T, String>,
) -> Result<T, String> {
    let store = TASK_STORE.get_or_try_init(|| {
        let db_path = resolve_store_db_path();
        SqliteDurableStore::open(&db_path)
            .map(|durable| Mutex::new(TaskStore::open(durable)))
            .map_err(|err| {
                warn!("event=ffi_store_open module=ffi status=error error={err}");
                format!("store DB open failed: {err}")
            })
    })?;
    // Slices commit atomically, so a poisoned guard still holds consistent state.
    let mut guard = store.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}

fn to_task_draft(input: TaskInput) -> Result<TaskDraft, String> {
    let status = TaskStatus::parse_label(&input.status)
        .ok_or_else(|| format!("unknown task status `{}`", input.status))?;
    let category = TaskCategory::parse_label(&input.category)
        .ok_or_else(|| format!("unknown task category `{}`", input.category))?;
    Ok(TaskDraft {
        title: input.title.trim().to_string(),
        description: input.description.trim().to_string(),
        date: input.date.trim().to_string(),
        status,
        category,
        image: input.image.filter(|image| !image.is_empty()),
    })
}

fn to_task_filter(status: Option<&str>, category: Option<&str>) -> Result<TaskFilter, String> {
    let status = match status.map(str::trim) {
        None | Some(ALL_STATUSES_LABEL) => None,
        Some(label) => Some(
            TaskStatus::parse_label(label)
                .ok_or_else(|| format!("unknown task status `{label}`"))?,
        ),
    };
    let category = match category.map(str::trim) {
        None | Some(ALL_CATEGORIES_LABEL) => None,
        Some(label) => Some(
            TaskCategory::parse_label(label)
                .ok_or_else(|| format!("unknown task category `{label}`"))?,
        ),
    };
    Ok(TaskFilter { status, category })
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id.to_string(),
        title: task.title.clone(),
        description: task.description.clone(),
        date: task.date.clone(),
        status: task.status.label().to_string(),
        category: task.category.label().to_string(),
        image: task.image.clone(),
    }
}
