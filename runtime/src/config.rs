//! TOML configuration for pool sizing and drain timeouts.
//!
//! ```toml
//! [drain]
//! grace_timeout_ms = 5000
//! force_timeout_ms = 5000
//!
//! [pool]
//! workers = 4
//! queue_capacity = 64
//! thread_name = "klient-worker"
//! ```
//!
//! Every key is optional. Missing keys fall back to [`DrainConfig::default`]
//! and [`PoolConfig::default`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use toml::de::Error as TomlError;

use crate::drain::DrainConfig;
use crate::pool::PoolConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse runtime config: {source}")]
    Parse {
        path: Option<PathBuf>,
        #[source]
        source: TomlError,
    },
    #[error("invalid runtime config: {0}")]
    Invalid(&'static str),
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. } => Some(path),
            Self::Parse { path, .. } => path.as_deref(),
            Self::Invalid(_) => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    drain: RawDrain,
    #[serde(default)]
    pool: RawPool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDrain {
    grace_timeout_ms: Option<u64>,
    force_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPool {
    workers: Option<usize>,
    queue_capacity: Option<usize>,
    thread_name: Option<String>,
}

/// Validated runtime settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub drain: DrainConfig,
    pub pool: PoolConfig,
}

impl RuntimeConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(input).map_err(|source| ConfigError::Parse { path: None, source })?;
        Self::from_raw(raw)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig = toml::from_str(&input).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })?;
        let config = Self::from_raw(raw)?;
        tracing::debug!(path = %path.display(), ?config, "Loaded runtime config");
        Ok(config)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let drain_defaults = DrainConfig::default();
        let pool_defaults = PoolConfig::default();

        let workers = raw.pool.workers.unwrap_or(pool_defaults.workers);
        if workers == 0 {
            return Err(ConfigError::Invalid("pool.workers must be at least 1"));
        }
        let queue_capacity = raw.pool.queue_capacity.unwrap_or(pool_defaults.queue_capacity);
        if queue_capacity == 0 {
            return Err(ConfigError::Invalid("pool.queue_capacity must be at least 1"));
        }
        let thread_name = match raw.pool.thread_name {
            Some(name) if name.trim().is_empty() => {
                return Err(ConfigError::Invalid("pool.thread_name must not be empty"));
            }
            Some(name) => name,
            None => pool_defaults.thread_name,
        };

        Ok(Self {
            drain: DrainConfig::new(
                raw.drain
                    .grace_timeout_ms
                    .map_or(drain_defaults.grace_timeout, Duration::from_millis),
                raw.drain
                    .force_timeout_ms
                    .map_or(drain_defaults.force_timeout, Duration::from_millis),
            ),
            pool: PoolConfig {
                workers,
                queue_capacity,
                thread_name,
            },
        })
    }
}
