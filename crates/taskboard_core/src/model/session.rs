//! Authentication session model.
//!
//! # Responsibility
//! - Define the signed-in user profile record.
//! - Provide an insertion-ordered token set with set semantics.
//!
//! # Invariants
//! - `TokenSet` never contains duplicate values.
//! - `TokenSet::primary()` is the first inserted token still held.

use serde::{Deserialize, Serialize};

/// Signed-in user profile as returned by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
}

impl UserProfile {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Insertion-ordered set of bearer tokens.
///
/// Serialized as a plain JSON array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct TokenSet {
    tokens: Vec<String>,
}

impl TokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from raw values, dropping repeats.
    ///
    /// Returns the set and the number of duplicates that were collapsed.
    pub fn from_values(values: impl IntoIterator<Item = String>) -> (Self, usize) {
        let mut set = Self::new();
        let mut duplicates = 0;
        for value in values {
            if !set.insert(value) {
                duplicates += 1;
            }
        }
        (set, duplicates)
    }

    /// Inserts a token; returns `false` when it was already present.
    pub fn insert(&mut self, token: impl Into<String>) -> bool {
        let token = token.into();
        if self.contains(&token) {
            return false;
        }
        self.tokens.push(token);
        true
    }

    /// Removes a token; returns `false` when it was not present.
    pub fn remove(&mut self, token: &str) -> bool {
        match self.tokens.iter().position(|held| held == token) {
            Some(index) => {
                self.tokens.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|held| held == token)
    }

    /// Active credential used for outgoing calls.
    pub fn primary(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tokens
    }
}

impl<'de> Deserialize<'de> for TokenSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let values = Vec::<String>::deserialize(deserializer)?;
        Ok(Self::from_values(values).0)
    }
}
