//! FFI surface for the task board UI.
//!
//! # Responsibility
//! - Re-export use-case functions that FRB code generation binds to.

pub mod api;
