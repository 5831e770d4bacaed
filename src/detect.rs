// src/detect.rs
//! Per-profile check: bench gate, fetch, extract, fingerprint compare.
//! This is the only place a `MonitoredProfile` mutates.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::extract::{extract, ContentItem, ExtractorConfig};
use crate::fetch::{Fetch, StatusClass};
use crate::fingerprint::fingerprint;
use crate::profile::MonitoredProfile;

#[derive(Debug, Clone)]
pub enum CheckOutcome {
    Unchanged,
    Changed { items: Vec<ContentItem> },
    FetchFailed { status: StatusClass },
    Skipped { failures: u32 },
}

pub struct ChangeDetector {
    fetcher: Arc<dyn Fetch>,
    extractor: ExtractorConfig,
    /// Profiles at or above this stored failure count are skipped until the
    /// count is reset by hand in the state file.
    failure_ceiling: u32,
}

impl ChangeDetector {
    pub fn new(fetcher: Arc<dyn Fetch>, extractor: ExtractorConfig, failure_ceiling: u32) -> Self {
        Self { fetcher, extractor, failure_ceiling }
    }

    pub async fn check(&self, profile: &mut MonitoredProfile) -> CheckOutcome {
        if profile.consecutive_failures >= self.failure_ceiling {
            info!(
                profile = %profile.display_name,
                failures = profile.consecutive_failures,
                "benched after repeated failures, reset the stored count to resume"
            );
            return CheckOutcome::Skipped { failures: profile.consecutive_failures };
        }

        let fetched = self.fetcher.fetch(&profile.target_url).await;
        if !fetched.succeeded {
            profile.consecutive_failures = profile.consecutive_failures.saturating_add(1);
            warn!(
                profile = %profile.display_name,
                status = ?fetched.status_class,
                failures = profile.consecutive_failures,
                "fetch failed"
            );
            return CheckOutcome::FetchFailed { status: fetched.status_class };
        }

        let extraction = extract(&fetched.body, profile, &self.extractor);
        let fp = fingerprint(&extraction.signals);

        profile.consecutive_failures = 0;
        if fp == profile.last_fingerprint {
            debug!(profile = %profile.display_name, "unchanged");
            return CheckOutcome::Unchanged;
        }

        info!(
            profile = %profile.display_name,
            fingerprint = %fp,
            items = extraction.items.len(),
            first_observation = profile.last_fingerprint.is_empty(),
            "change detected"
        );
        profile.last_fingerprint = fp;
        CheckOutcome::Changed { items: extraction.items }
    }
}
