//! Domain model for tasks and the authentication session.
//!
//! # Responsibility
//! - Define the canonical records held by the store and persisted as JSON.
//! - Keep wire labels stable so persisted data stays readable across builds.
//!
//! # Invariants
//! - Every task is identified by a `TaskId` that is unique in its collection.
//! - `TokenSet` never holds the same token twice.

pub mod session;
pub mod task;
