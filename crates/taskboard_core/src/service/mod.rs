//! Use-case services built on top of the task store.
//!
//! # Responsibility
//! - Orchestrate remote API calls and store mutations for session flows.
//! - Keep HTTP transport details outside the core.

pub mod session_service;
