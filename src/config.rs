// src/config.rs
//! Runtime knobs, environment-sourced. Every value has a default that works
//! out of the box; the binary entrypoint loads `.env` first.

use std::path::PathBuf;

use crate::fetch::FetchConfig;

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub state_path: PathBuf,
    /// Fixed part of the inter-profile delay, seconds.
    pub pace_base_secs: u64,
    /// Upper bound of the random extra delay, seconds.
    pub pace_jitter_secs: u64,
    pub failure_ceiling: u32,
    pub fetch: FetchConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("state/profiles.json"),
            pace_base_secs: 15,
            pace_jitter_secs: 10,
            failure_ceiling: 5,
            fetch: FetchConfig::default(),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl MonitorConfig {
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            state_path: std::env::var("PROFILE_STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or(base.state_path),
            pace_base_secs: env_parsed("PACE_BASE_SECS", base.pace_base_secs),
            pace_jitter_secs: env_parsed("PACE_JITTER_SECS", base.pace_jitter_secs),
            failure_ceiling: env_parsed("FAILURE_CEILING", base.failure_ceiling),
            fetch: FetchConfig {
                max_attempts: env_parsed("FETCH_MAX_ATTEMPTS", base.fetch.max_attempts),
                timeout_secs: env_parsed("FETCH_TIMEOUT_SECS", base.fetch.timeout_secs),
                ..base.fetch
            },
        }
    }
}
