//! LinkedIn activity monitor — binary entrypoint.
//! One invocation is one run: load profile state, check every profile in
//! order, persist state once, send at most one consolidated email.
//!
//! See `README.md` for the environment variables.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use linkedin_activity_monitor::{
    EmailSender, ExtractorConfig, JsonFileStore, Monitor, MonitorConfig, PageFetcher, RunReport,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

async fn run() -> Result<RunReport> {
    let cfg = MonitorConfig::from_env();
    // SMTP config is checked up front so a bad mail setup fails the run
    // before any page is fetched.
    let mailer = Box::new(EmailSender::from_env()?);
    let fetcher = Arc::new(PageFetcher::new(cfg.fetch.clone())?);
    let store = Box::new(JsonFileStore::new(cfg.state_path.clone()));
    let monitor = Monitor::new(fetcher, store, mailer, cfg, ExtractorConfig::load());
    monitor.run_once().await
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    match run().await {
        Ok(report) if report.succeeded > 0 => ExitCode::SUCCESS,
        Ok(report) => {
            error!(
                failed = report.failed,
                skipped = report.skipped,
                "no profile checked successfully this run"
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = ?e, "run aborted");
            ExitCode::FAILURE
        }
    }
}
