// src/fetch.rs
//! Page retrieval with retry, throttle handling, and a rotating user-agent
//! pool. Failures are reported in-band as a `FetchResult` so the caller can
//! fold them into per-profile failure counts instead of aborting the run.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use tracing::{debug, warn};

const FALLBACK_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Coarse outcome class for one fetch. Drives backoff choice and shows up in
/// run logs; the pipeline itself only cares about `succeeded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Ok,
    RateLimited,
    Forbidden,
    OtherError,
    NetworkError,
}

#[derive(Debug, Clone)]
pub struct FetchResult {
    pub succeeded: bool,
    pub body: String,
    pub status_class: StatusClass,
}

impl FetchResult {
    pub fn ok(body: String) -> Self {
        Self { succeeded: true, body, status_class: StatusClass::Ok }
    }

    pub fn failed(status_class: StatusClass) -> Self {
        Self { succeeded: false, body: String::new(), status_class }
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub max_attempts: u32,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Base and per-attempt step for transient errors.
    pub retry_backoff_secs: u64,
    pub retry_backoff_step_secs: u64,
    /// Base and per-attempt step after an HTTP 429.
    pub throttle_backoff_secs: u64,
    pub throttle_backoff_step_secs: u64,
    /// Upper bound of the random extra delay added to every backoff, millis.
    pub retry_jitter_millis: u64,
    pub user_agents: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout_secs: 30,
            connect_timeout_secs: 10,
            retry_backoff_secs: 10,
            retry_backoff_step_secs: 10,
            throttle_backoff_secs: 60,
            throttle_backoff_step_secs: 30,
            retry_jitter_millis: 1000,
            user_agents: [
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0 Safari/537.36",
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_6) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Safari/605.1.15",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0",
                "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Map an HTTP status to its backoff class. 2xx is Ok, everything else is a
/// failure of some flavour.
pub fn classify_status(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Ok,
        429 => StatusClass::RateLimited,
        403 => StatusClass::Forbidden,
        _ => StatusClass::OtherError,
    }
}

/// Delay before the next attempt, given how many attempts already ran.
/// Throttled responses wait much longer than ordinary transient errors.
pub fn backoff_delay(cfg: &FetchConfig, attempts_done: u32, class: StatusClass) -> Duration {
    let secs = match class {
        StatusClass::RateLimited => {
            cfg.throttle_backoff_secs + cfg.throttle_backoff_step_secs * u64::from(attempts_done)
        }
        _ => cfg.retry_backoff_secs + cfg.retry_backoff_step_secs * u64::from(attempts_done),
    };
    Duration::from_secs(secs)
}

/// Pick the user agent for an attempt, cycling through the pool.
pub fn user_agent_for(cfg: &FetchConfig, attempt: u32) -> &str {
    if cfg.user_agents.is_empty() {
        return FALLBACK_USER_AGENT;
    }
    &cfg.user_agents[attempt as usize % cfg.user_agents.len()]
}

#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResult;
}

/// Production fetcher over reqwest. One client is shared across all profiles
/// in a run; only the user agent rotates per attempt.
pub struct PageFetcher {
    client: reqwest::Client,
    cfg: FetchConfig,
}

impl PageFetcher {
    pub fn new(cfg: FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .default_headers(headers)
            .build()
            .context("build http client")?;

        Ok(Self { client, cfg })
    }
}

#[async_trait]
impl Fetch for PageFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        let mut last_class = StatusClass::NetworkError;

        for attempt in 0..self.cfg.max_attempts {
            let ua = user_agent_for(&self.cfg, attempt);
            let response = self.client.get(url).header(USER_AGENT, ua).send().await;

            let class = match response {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    match classify_status(status) {
                        StatusClass::Ok => match resp.text().await {
                            Ok(body) => {
                                debug!(url, attempt, bytes = body.len(), "page fetched");
                                return FetchResult::ok(body);
                            }
                            Err(e) => {
                                warn!(url, attempt, error = ?e, "body read failed");
                                StatusClass::NetworkError
                            }
                        },
                        StatusClass::Forbidden => {
                            warn!(url, attempt, status, "access denied, not retrying");
                            return FetchResult::failed(StatusClass::Forbidden);
                        }
                        other => {
                            warn!(url, attempt, status, "unexpected http status");
                            other
                        }
                    }
                }
                Err(e) => {
                    warn!(url, attempt, error = ?e, "request failed");
                    StatusClass::NetworkError
                }
            };

            last_class = class;
            if attempt + 1 < self.cfg.max_attempts {
                let jitter = Duration::from_millis(
                    rand::rng().random_range(0..=self.cfg.retry_jitter_millis),
                );
                tokio::time::sleep(backoff_delay(&self.cfg, attempt, class) + jitter).await;
            }
        }

        FetchResult::failed(last_class)
    }
}
