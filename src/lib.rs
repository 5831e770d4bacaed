// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod detect;
pub mod extract;
pub mod fetch;
pub mod fingerprint;
pub mod notify;
pub mod profile;
pub mod run;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::config::MonitorConfig;
pub use crate::detect::{ChangeDetector, CheckOutcome};
pub use crate::extract::{extract, ContentItem, Extraction, ExtractorConfig, SignalSet};
pub use crate::fetch::{Fetch, FetchConfig, FetchResult, PageFetcher, StatusClass};
pub use crate::fingerprint::fingerprint;
pub use crate::notify::{compose, email::EmailSender, MailTransport, Notification};
pub use crate::profile::MonitoredProfile;
pub use crate::run::{Monitor, RunReport};
pub use crate::store::{JsonFileStore, ProfileStore};
