//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CAPACITY: usize = 100;
const DEFAULT_LOG_FILE: &str = "data/wal.log";
const DEFAULT_COMPACTION_INTERVAL: u64 = 300;
const DEFAULT_SERVER_PORT: u16 = 3000;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Path of the write-ahead log
    pub log_file: PathBuf,
    /// Interval in seconds between background compactions
    pub compaction_interval: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Whether every WAL append is followed by `sync_data`
    pub wal_fsync: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `STORE_CAPACITY` - Maximum cache entries (default: 100, zero is rejected)
    /// - `LOG_FILE` - WAL path (default: data/wal.log)
    /// - `COMPACTION_INTERVAL` - Compaction frequency in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `WAL_FSYNC` - `true` or `false` (default: true)
    pub fn from_env() -> Self {
        Self {
            capacity: env::var("STORE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&c: &usize| c > 0)
                .unwrap_or(DEFAULT_CAPACITY),
            log_file: env::var("LOG_FILE")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            compaction_interval: env::var("COMPACTION_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&s: &u64| s > 0)
                .unwrap_or(DEFAULT_COMPACTION_INTERVAL),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            wal_fsync: env::var("WAL_FSYNC")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }

    /// Compaction interval as a `Duration`.
    pub fn compaction_period(&self) -> Duration {
        Duration::from_secs(self.compaction_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            compaction_interval: DEFAULT_COMPACTION_INTERVAL,
            server_port: DEFAULT_SERVER_PORT,
            wal_fsync: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.capacity, 100);
        assert_eq!(config.log_file, PathBuf::from("data/wal.log"));
        assert_eq!(config.compaction_interval, 300);
        assert_eq!(config.server_port, 3000);
        assert!(config.wal_fsync);
        assert_eq!(config.compaction_period(), Duration::from_secs(300));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("STORE_CAPACITY");
        env::remove_var("LOG_FILE");
        env::remove_var("COMPACTION_INTERVAL");
        env::remove_var("SERVER_PORT");
        env::remove_var("WAL_FSYNC");

        let config = Config::from_env();
        assert_eq!(config.capacity, 100);
        assert_eq!(config.log_file, PathBuf::from("data/wal.log"));
        assert_eq!(config.compaction_interval, 300);
        assert_eq!(config.server_port, 3000);
        assert!(config.wal_fsync);
    }
}
