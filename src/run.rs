// src/run.rs
//! One monitoring run end to end: sequential paced checks, one batched state
//! write, one consolidated notification.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use rand::Rng;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::MonitorConfig;
use crate::detect::{ChangeDetector, CheckOutcome};
use crate::extract::{ContentItem, ExtractorConfig};
use crate::fetch::Fetch;
use crate::notify::{compose, MailTransport};
use crate::store::ProfileStore;

/// What one run did, for logging and the exit decision.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub processed: usize,
    pub succeeded: usize,
    pub changed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub items: Vec<ContentItem>,
    pub state_persisted: bool,
    pub notification_sent: bool,
}

pub struct Monitor {
    detector: ChangeDetector,
    store: Box<dyn ProfileStore>,
    mailer: Box<dyn MailTransport>,
    cfg: MonitorConfig,
}

impl Monitor {
    pub fn new(
        fetcher: Arc<dyn Fetch>,
        store: Box<dyn ProfileStore>,
        mailer: Box<dyn MailTransport>,
        cfg: MonitorConfig,
        extractor: ExtractorConfig,
    ) -> Self {
        let detector = ChangeDetector::new(fetcher, extractor, cfg.failure_ceiling);
        Self { detector, store, mailer, cfg }
    }

    /// Check every profile once, in configuration order, with a randomized
    /// pause between consecutive profiles. Profile state is written at most
    /// once and the email leaves at most once, after the last check.
    pub async fn run_once(&self) -> Result<RunReport> {
        let mut profiles = self.store.load_all().await.context("load profiles")?;
        if profiles.is_empty() {
            bail!("no usable profiles in the state file");
        }

        let mut report = RunReport::default();
        let mut dirty = false;

        for (i, profile) in profiles.iter_mut().enumerate() {
            if i > 0 {
                let pause = self.cfg.pace_base_secs
                    + rand::rng().random_range(0..=self.cfg.pace_jitter_secs);
                tokio::time::sleep(Duration::from_secs(pause)).await;
            }

            let fingerprint_before = profile.last_fingerprint.clone();
            let failures_before = profile.consecutive_failures;

            let outcome = self.detector.check(profile).await;
            if profile.last_fingerprint != fingerprint_before
                || profile.consecutive_failures != failures_before
            {
                dirty = true;
            }

            report.processed += 1;
            match outcome {
                CheckOutcome::Unchanged => report.succeeded += 1,
                CheckOutcome::Changed { items } => {
                    report.succeeded += 1;
                    report.changed += 1;
                    report.items.extend(items);
                }
                CheckOutcome::FetchFailed { .. } => report.failed += 1,
                CheckOutcome::Skipped { .. } => report.skipped += 1,
            }
        }

        if dirty {
            match self.store.save_all(&profiles).await {
                Ok(()) => report.state_persisted = true,
                // Keep going: losing the write means the next run re-notifies,
                // which beats losing this run's findings entirely.
                Err(e) => error!(error = ?e, "state not persisted"),
            }
        }

        if !report.items.is_empty() {
            let message = compose(&report.items);
            match self.mailer.deliver(&message).await {
                Ok(()) => {
                    report.notification_sent = true;
                    info!(items = report.items.len(), "notification sent");
                }
                Err(e) => warn!(error = ?e, "notification delivery failed"),
            }
        }

        info!(
            processed = report.processed,
            succeeded = report.succeeded,
            changed = report.changed,
            failed = report.failed,
            skipped = report.skipped,
            state_persisted = report.state_persisted,
            notification_sent = report.notification_sent,
            "run complete"
        );
        Ok(report)
    }
}
