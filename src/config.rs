//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::DEFAULT_KEY_PREFIX;

/// Cache and diagnostics server configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Reserved prefix for every cache key in the persistent medium
    pub key_prefix: String,
    /// Location of the persistent store document
    pub storage_path: PathBuf,
    /// Byte quota for the persistent store, None = unlimited
    pub storage_quota: Option<usize>,
    /// Expiry sweep interval in seconds
    pub sweep_interval: u64,
    /// Diagnostics HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_KEY_PREFIX` - Reserved key prefix (default: `portal_`)
    /// - `STORAGE_PATH` - Persistent store file (default: `./data/portal-cache.json`)
    /// - `STORAGE_QUOTA_BYTES` - Store quota, `0` for unlimited (default: 5 MiB)
    /// - `SWEEP_INTERVAL` - Expiry sweep frequency in seconds (default: 600)
    /// - `SERVER_PORT` - Diagnostics HTTP port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            key_prefix: env::var("CACHE_KEY_PREFIX")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.key_prefix),
            storage_path: env::var("STORAGE_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            storage_quota: match env::var("STORAGE_QUOTA_BYTES")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
            {
                Some(0) => None,
                Some(bytes) => Some(bytes),
                None => defaults.storage_quota,
            },
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.sweep_interval),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            storage_path: PathBuf::from("./data/portal-cache.json"),
            storage_quota: Some(5 * 1024 * 1024),
            sweep_interval: 600,
            server_port: 3000,
        }
    }
}
