//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::service::{ReadFallback, ServiceOptions};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Whether list-reads go through the listing cache
    pub cache_enabled: bool,
    /// Deadline for each store or cache call in milliseconds
    pub operation_timeout_ms: u64,
    /// Behaviour of list-reads when the cache fails
    pub read_fallback: ReadFallback,
    /// Coalesce concurrent cache misses into one store query
    pub coalesce_misses: bool,
    /// JSON file backing the record store; in-memory store when unset
    pub data_file: Option<PathBuf>,
    /// Redis server holding the listing cache; in-process cache when unset
    pub redis_url: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `CACHE_ENABLED` - Enable the listing cache (default: true)
    /// - `OPERATION_TIMEOUT_MS` - Per-call deadline (default: 5000)
    /// - `CACHE_READ_FALLBACK` - `fail` or `store` (default: fail)
    /// - `COALESCE_CACHE_MISSES` - Single-flight snapshot rebuilds (default: true)
    /// - `DATA_FILE` - Path of the JSON record file (default: unset)
    /// - `REDIS_URL` - Redis server for the listing cache (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cache_enabled: parse_flag("CACHE_ENABLED").unwrap_or(defaults.cache_enabled),
            operation_timeout_ms: parse_var("OPERATION_TIMEOUT_MS")
                .unwrap_or(defaults.operation_timeout_ms),
            read_fallback: parse_var("CACHE_READ_FALLBACK").unwrap_or(defaults.read_fallback),
            coalesce_misses: parse_flag("COALESCE_CACHE_MISSES")
                .unwrap_or(defaults.coalesce_misses),
            data_file: non_empty_var("DATA_FILE").map(PathBuf::from),
            redis_url: non_empty_var("REDIS_URL"),
        }
    }

    /// Coordinator options derived from this configuration.
    pub fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            operation_timeout: Duration::from_millis(self.operation_timeout_ms),
            read_fallback: self.read_fallback,
            coalesce_misses: self.coalesce_misses,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            cache_enabled: true,
            operation_timeout_ms: 5000,
            read_fallback: ReadFallback::FailFast,
            coalesce_misses: true,
            data_file: None,
            redis_url: None,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value for {}: {:?}", name, raw);
            None
        }
    }
}

fn parse_flag(name: &str) -> Option<bool> {
    let raw = env::var(name).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!("Ignoring invalid value for {}: {:?}", name, raw);
            None
        }
    }
}
