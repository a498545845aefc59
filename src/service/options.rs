//! Coordinator tuning knobs

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// What a list-read does when the cache layer fails (as opposed to missing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadFallback {
    /// Surface the failure as `CacheUnavailable`
    #[default]
    FailFast,
    /// Log the failure and answer from the store without repopulating
    DegradeToStore,
}

impl FromStr for ReadFallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" | "fail-fast" | "fail_fast" => Ok(Self::FailFast),
            "store" | "degrade" | "degrade-to-store" | "degrade_to_store" => {
                Ok(Self::DegradeToStore)
            }
            other => Err(format!("unknown cache read fallback '{}'", other)),
        }
    }
}

impl fmt::Display for ReadFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FailFast => f.write_str("fail"),
            Self::DegradeToStore => f.write_str("store"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceOptions {
    /// Deadline applied to each individual store or cache call
    pub operation_timeout: Duration,
    pub read_fallback: ReadFallback,
    /// Let one task rebuild a missing snapshot while concurrent readers wait
    pub coalesce_misses: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            operation_timeout: Duration::from_secs(5),
            read_fallback: ReadFallback::FailFast,
            coalesce_misses: true,
        }
    }
}
