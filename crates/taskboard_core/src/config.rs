//! Core runtime configuration.
//!
//! # Responsibility
//! - Describe where the durable store lives and how logging is set up.
//! - Load that description from JSON or from process environment.
//! - Open a `TaskStore` over the configured adapter.
//!
//! # Invariants
//! - A SQLite path must be non-empty.
//! - Environment values are trimmed; blank values count as unset.

use crate::db::DbError;
use crate::repo::durable_store::{DurableStore, MemoryDurableStore, SqliteDurableStore};
use crate::store::TaskStore;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "TASKBOARD_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "TASKBOARD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TASKBOARD_LOG_DIR";

/// Durable adapter trait object produced from configuration.
pub type BoxedDurableStore = Box<dyn DurableStore + Send>;

/// Durable store backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Process-local map; nothing survives a restart.
    #[default]
    Memory,
    /// SQLite database file.
    Sqlite { path: PathBuf },
}

/// Top-level core configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub storage: StorageConfig,
    /// One of `trace|debug|info|warn|error`; build default when unset.
    pub log_level: Option<String>,
    /// Absolute log directory; file logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    EmptyDbPath,
    Db(DbError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid core config: {err}"),
            Self::EmptyDbPath => write!(f, "sqlite storage path cannot be empty"),
            Self::Db(err) => write!(f, "failed to open durable store: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::EmptyDbPath => None,
        }
    }
}

impl From<DbError> for ConfigError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl CoreConfig {
    /// Parses a JSON config document. Missing fields take defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `TASKBOARD_DB_PATH`, `TASKBOARD_LOG_LEVEL` and `TASKBOARD_LOG_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env` with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let storage = match read(ENV_DB_PATH) {
            Some(path) => StorageConfig::Sqlite {
                path: PathBuf::from(path),
            },
            None => StorageConfig::Memory,
        };

        Self {
            storage,
            log_level: read(ENV_LOG_LEVEL),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.storage {
            StorageConfig::Sqlite { path } if path.as_os_str().is_empty() => {
                Err(ConfigError::EmptyDbPath)
            }
            _ => Ok(()),
        }
    }

    /// Effective log level: configured value or the build default.
    pub fn effective_log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or(crate::logging::default_log_level())
    }
}

/// Opens the configured adapter and rehydrates a store from it.
pub fn open_store(config: &CoreConfig) -> Result<TaskStore<BoxedDurableStore>, ConfigError> {
    config.validate()?;
    let durable: BoxedDurableStore = match &config.storage {
        StorageConfig::Memory => Box::new(MemoryDurableStore::new()),
        StorageConfig::Sqlite { path } => Box::new(SqliteDurableStore::open(path)?),
    };
    Ok(TaskStore::open(durable))
}
