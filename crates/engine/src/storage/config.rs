//! Storage configuration via `schedstore.toml`
//!
//! On first open, a default `schedstore.toml` is created. To change settings,
//! edit the file and restart.

use serde::{Deserialize, Serialize};
use schedstore_core::{StorageError, StorageResult};
use std::path::Path;
use std::time::Duration;

/// Config file name used by [`super::TransactionalStorage::open_dir`].
pub const CONFIG_FILE_NAME: &str = "schedstore.toml";

/// Storage configuration loaded from `schedstore.toml`.
///
/// # Example
///
/// ```toml
/// # Refresh the weak-read replica every N commits
/// replica_refresh_commits = 1
///
/// # Warn when a write holds the writer lock longer than this
/// slow_write_threshold_ms = 1000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Commits between refreshes of the replica served to weak reads.
    #[serde(default = "default_replica_refresh_commits")]
    pub replica_refresh_commits: u64,
    /// Writes slower than this are logged at warn level.
    #[serde(default = "default_slow_write_threshold_ms")]
    pub slow_write_threshold_ms: u64,
}

fn default_replica_refresh_commits() -> u64 {
    1
}

fn default_slow_write_threshold_ms() -> u64 {
    1000
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            replica_refresh_commits: default_replica_refresh_commits(),
            slow_write_threshold_ms: default_slow_write_threshold_ms(),
        }
    }
}

impl StorageConfig {
    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if `replica_refresh_commits` is zero.
    pub fn validate(&self) -> StorageResult<()> {
        if self.replica_refresh_commits == 0 {
            return Err(StorageError::config(
                "replica_refresh_commits must be at least 1",
            ));
        }
        Ok(())
    }

    /// Slow write threshold as a `Duration`.
    pub fn slow_write_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_write_threshold_ms)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# schedstore configuration
#
# Weak reads are served from a replica snapshot that is refreshed every
# N commits (default: 1, i.e. after every commit). Larger values make weak
# reads staler and cheaper for writers.
replica_refresh_commits = 1

# Writes that hold the writer lock longer than this many milliseconds are
# logged at warn level (default: 1000).
slow_write_threshold_ms = 1000
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> StorageResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StorageError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: StorageConfig = toml::from_str(&content).map_err(|e| {
            StorageError::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> StorageResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> StorageResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| StorageError::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
