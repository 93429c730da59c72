//! Core state and persistence for the Taskboard client.
//! This crate is the single source of truth for tasks and the session.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{open_store, BoxedDurableStore, ConfigError, CoreConfig, StorageConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::session::{TokenSet, UserProfile};
pub use model::task::{Task, TaskCategory, TaskDraft, TaskFilter, TaskId, TaskStatus};
pub use repo::durable_store::{
    DurableStore, MemoryDurableStore, SqliteDurableStore, StorageError, StorageResult,
};
pub use service::session_service::{
    complete_profile_fetch, decode_login_response, decode_profile_response, ApiError, AuthApi,
    LoginResponse, SessionError, SessionOutcome, SessionService,
};
pub use store::{
    ClearReason, ProfileFetch, Slice, StoreChange, StoreError, StoreResult, StoreState,
    SubscriptionId, TaskStore, TASKS_KEY, TOKENS_KEY, USER_KEY,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
