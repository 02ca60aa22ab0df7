//! Configuration loading and validation
//!
//! The configuration is read once at startup. [`Config::load`] and
//! [`Config::parse`] seed the defaults, overlay the YAML document, and run
//! every check before handing out the result, so code that receives a
//! `Config` can rely on it without checking again.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::access::{self, AccessMode};
use crate::activation::SocketActivation;
use crate::error::ConfigError;
use crate::prefetch::RefreshPeriod;
use crate::repo::Repo;

pub const DEFAULT_PORT: u16 = 9129;
pub const DEFAULT_CACHE_DIR: &str = "/var/cache/pacoloco";
/// Prefetch database file, kept inside the cache directory
pub const DEFAULT_DB_NAME: &str = "sqlite-pkg-cache.db";

/// Shortest non-zero purge period, in seconds
pub const MIN_PURGE_FILES_AFTER_SECS: i64 = 10 * 60;

/// Service configuration
///
/// A key given with no value (YAML null) keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding cached packages, must be readable and writable
    #[serde(deserialize_with = "cache_dir_or_default")]
    pub cache_dir: PathBuf,
    #[serde(deserialize_with = "port_or_default")]
    pub port: u16,
    /// Upstream repositories by name
    #[serde(
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub repos: BTreeMap<String, Repo>,
    /// Seconds after which unused files are purged, 0 disables purging
    #[serde(deserialize_with = "null_as_default")]
    pub purge_files_after: i64,
    /// Seconds allowed for an upstream download
    #[serde(deserialize_with = "null_as_default")]
    pub download_timeout: i64,
    /// Background refresh of cached packages, disabled when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefetch: Option<RefreshPeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_proxy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub set_timestamp_to_logs: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub socket_activation: SocketActivation,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn cache_dir_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PathBuf, D::Error> {
    Ok(Option::<PathBuf>::deserialize(deserializer)?
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)))
}

fn port_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    Ok(Option::<u16>::deserialize(deserializer)?.unwrap_or(DEFAULT_PORT))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            port: DEFAULT_PORT,
            repos: BTreeMap::new(),
            purge_files_after: 0,
            download_timeout: 0,
            prefetch: None,
            http_proxy: None,
            user_agent: None,
            set_timestamp_to_logs: false,
            socket_activation: SocketActivation::default(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::parse(&content)
            .inspect_err(|e| warn!("Invalid configuration in {}: {}", path.display(), e))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        Self::from_yaml(raw)?.validate()
    }

    /// Overlay a YAML document on the defaults without validating it
    ///
    /// Unknown keys are ignored. A document with no content yields the
    /// defaults.
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        if is_blank_document(raw) {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Run every check, stopping at the first failure
    ///
    /// Prefetch TTLs left at 0 are replaced by their defaults.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        for (name, repo) in &self.repos {
            repo.validate(name)?;
        }

        if self.purge_files_after != 0 && self.purge_files_after < MIN_PURGE_FILES_AFTER_SECS {
            return Err(ConfigError::PurgeIntervalTooShort(self.purge_files_after));
        }

        access::check_access(&self.cache_dir, AccessMode::ReadWrite)?;

        if let Some(prefetch) = self.prefetch.as_mut() {
            prefetch.validate()?;
        }

        debug!(
            "Configuration valid: {} repo(s), cache dir {}",
            self.repos.len(),
            self.cache_dir.display()
        );
        Ok(self)
    }

    /// Serialize using the same keys the file is read with
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(ConfigError::Serialization)
    }

    /// Location of the prefetch database
    pub fn db_path(&self) -> PathBuf {
        self.cache_dir.join(DEFAULT_DB_NAME)
    }

    pub fn prefetch_enabled(&self) -> bool {
        self.prefetch.is_some()
    }

    /// Purge period, `None` when purging is disabled
    pub fn purge_interval(&self) -> Option<Duration> {
        u64::try_from(self.purge_files_after)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

fn is_blank_document(raw: &str) -> bool {
    raw.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}
