// src/store.rs
//! Profile state persistence: one JSON array on disk, read once at run start
//! and rewritten atomically at run end when anything changed.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs;
use tracing::{info, warn};

use crate::profile::{default_profiles, MonitoredProfile};

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<MonitoredProfile>>;
    async fn save_all(&self, profiles: &[MonitoredProfile]) -> Result<()>;
}

/// Raw on-disk shape. Deserialization is tolerant; every record then goes
/// back through the `MonitoredProfile` constructor, so a hand-edited file
/// cannot smuggle an invalid target past the URL gate.
#[derive(Debug, Deserialize)]
struct ProfileRecord {
    #[serde(default)]
    target_url: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    last_fingerprint: String,
    #[serde(default)]
    consecutive_failures: u32,
}

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ProfileStore for JsonFileStore {
    async fn load_all(&self) -> Result<Vec<MonitoredProfile>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let defaults = default_profiles();
                info!(
                    path = %self.path.display(),
                    count = defaults.len(),
                    "no state file yet, writing built-in defaults"
                );
                self.save_all(&defaults).await?;
                return Ok(defaults);
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("read profile state {}", self.path.display()))
            }
        };

        let records: Vec<ProfileRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("parse profile state {}", self.path.display()))?;

        let mut profiles = Vec::with_capacity(records.len());
        for rec in records {
            match MonitoredProfile::from_saved(
                &rec.target_url,
                &rec.display_name,
                &rec.last_fingerprint,
                rec.consecutive_failures,
            ) {
                Ok(p) => profiles.push(p),
                Err(e) => {
                    warn!(url = %rec.target_url, error = ?e, "dropping invalid profile record")
                }
            }
        }
        Ok(profiles)
    }

    async fn save_all(&self, profiles: &[MonitoredProfile]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("create state dir {}", parent.display()))?;
            }
        }
        let json = serde_json::to_vec_pretty(profiles).context("encode profile state")?;
        // Write-then-rename so an interrupted run can never truncate the
        // previous state.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replace {}", self.path.display()))?;
        Ok(())
    }
}
