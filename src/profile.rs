// src/profile.rs
//! Monitored profile records: URL normalization and the accepted-target gate.
//! Invalid targets are rejected here, at load time, and never reach the pipeline.

use anyhow::{bail, Result};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Serialize;

/// URL shapes we are willing to poll: company feeds and member profiles.
fn accepted_patterns() -> &'static [Regex; 2] {
    static RES: OnceCell<[Regex; 2]> = OnceCell::new();
    RES.get_or_init(|| {
        [
            Regex::new(r"^https://www\.linkedin\.com/company/[^/]+/?(?:posts/?)?$")
                .expect("company url regex"),
            Regex::new(r"^https://www\.linkedin\.com/in/[^/]+/?$").expect("member url regex"),
        ]
    })
}

/// One profile under watch. Construction always normalizes and validates the
/// target URL, so holding a `MonitoredProfile` means the URL already passed
/// the gate. `last_fingerprint` is empty until the first successful check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitoredProfile {
    pub target_url: String,
    pub display_name: String,
    pub last_fingerprint: String,
    pub consecutive_failures: u32,
}

impl MonitoredProfile {
    pub fn new(url: &str, name: &str) -> Result<Self> {
        Self::from_saved(url, name, "", 0)
    }

    /// Rebuild a profile from stored fields, re-running normalization and the
    /// URL gate so a hand-edited state file cannot smuggle in a bad target.
    pub fn from_saved(
        url: &str,
        name: &str,
        last_fingerprint: &str,
        consecutive_failures: u32,
    ) -> Result<Self> {
        let target_url = normalize_url(url);
        let display_name = name.trim().to_string();
        if display_name.is_empty() {
            bail!("profile has no display name");
        }
        if !is_accepted_url(&target_url) {
            bail!("not an accepted LinkedIn target: {target_url}");
        }
        Ok(Self {
            target_url,
            display_name,
            last_fingerprint: last_fingerprint.trim().to_string(),
            consecutive_failures,
        })
    }
}

/// Normalize a raw target URL: trim, enforce https, and pin company pages to
/// their `/posts/` feed (the page that actually lists new activity).
pub fn normalize_url(raw: &str) -> String {
    let mut url = raw.trim().to_string();

    if let Some(rest) = url.strip_prefix("http://") {
        url = format!("https://{rest}");
    } else if !url.starts_with("https://") {
        url = format!("https://{url}");
    }

    if url.contains("/company/") && !url.ends_with("/posts/") && !url.ends_with("/posts") {
        if !url.ends_with('/') {
            url.push('/');
        }
        url.push_str("posts/");
    }

    url
}

pub fn is_accepted_url(url: &str) -> bool {
    accepted_patterns().iter().any(|re| re.is_match(url))
}

/// Built-in set written out when no state file exists yet.
pub fn default_profiles() -> Vec<MonitoredProfile> {
    [
        ("https://www.linkedin.com/company/microsoft/posts/", "Microsoft"),
        ("https://www.linkedin.com/company/google/posts/", "Google"),
        ("https://www.linkedin.com/company/tesla-motors/posts/", "Tesla"),
    ]
    .into_iter()
    .map(|(url, name)| MonitoredProfile::new(url, name).expect("built-in profile is valid"))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_upgrades_scheme_and_pins_posts() {
        assert_eq!(
            normalize_url("http://www.linkedin.com/company/acme"),
            "https://www.linkedin.com/company/acme/posts/"
        );
        assert_eq!(
            normalize_url("www.linkedin.com/company/acme/posts"),
            "https://www.linkedin.com/company/acme/posts"
        );
        assert_eq!(
            normalize_url("  https://www.linkedin.com/in/jane-doe/  "),
            "https://www.linkedin.com/in/jane-doe/"
        );
    }

    #[test]
    fn member_and_company_urls_pass_the_gate() {
        assert!(is_accepted_url("https://www.linkedin.com/in/jane-doe"));
        assert!(is_accepted_url("https://www.linkedin.com/company/acme/posts/"));
        assert!(is_accepted_url("https://www.linkedin.com/company/acme"));
    }

    #[test]
    fn foreign_urls_are_rejected() {
        assert!(!is_accepted_url("https://example.com/company/acme/posts/"));
        assert!(!is_accepted_url("https://www.linkedin.com/feed/"));
        assert!(!is_accepted_url("https://www.linkedin.com/company/acme/about/"));
    }

    #[test]
    fn constructor_rejects_blank_name_and_bad_url() {
        assert!(MonitoredProfile::new("https://www.linkedin.com/in/jane", "  ").is_err());
        assert!(MonitoredProfile::new("https://example.com/in/jane", "Jane").is_err());
    }

    #[test]
    fn constructor_normalizes_before_validating() {
        let p = MonitoredProfile::new("www.linkedin.com/company/acme", "Acme").unwrap();
        assert_eq!(p.target_url, "https://www.linkedin.com/company/acme/posts/");
        assert_eq!(p.last_fingerprint, "");
        assert_eq!(p.consecutive_failures, 0);
    }

    #[test]
    fn built_in_defaults_are_all_valid() {
        let defaults = default_profiles();
        assert_eq!(defaults.len(), 3);
        assert!(defaults.iter().all(|p| is_accepted_url(&p.target_url)));
    }
}
