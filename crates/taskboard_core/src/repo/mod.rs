//! Durable persistence boundary.
//!
//! # Responsibility
//! - Define the key/value contract the store persists slices through.
//! - Provide in-memory and SQLite adapters behind that contract.
//!
//! # Invariants
//! - Reading or deleting an absent key is never an error.
//! - Values are opaque strings; adapters never interpret them.

pub mod durable_store;
