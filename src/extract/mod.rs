// src/extract/mod.rs
//! Signal extraction: turn one fetched page body into (a) presentable content
//! items and (b) the canonical signal list the fingerprint is computed over.
//! Logged-out boilerplate must never surface as an item, so every candidate
//! fragment passes a validation policy before it counts.

pub mod strategies;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::profile::MonitoredProfile;
use self::strategies::{fragment_strategies, raw_activity_ids, raw_links};

/// Bodies shorter than this are treated as empty (consent interstitials and
/// error shells, not feeds).
const MIN_BODY_CHARS: usize = 100;
const MAX_ACTIVITY_IDS: usize = 5;
const MAX_LINK_SIGNALS: usize = 5;
const SIGNAL_TEXT_CHARS: usize = 160;
const BODY_SAMPLE_CHARS: usize = 400;
/// Stable signal for near-empty bodies. Constant on purpose so an empty page
/// fingerprints the same on every run.
const EMPTY_PAGE_SIGNAL: &str = "page:empty";

/// Validation thresholds and the boilerplate deny-list.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub min_fragment_chars: usize,
    pub min_token_chars: usize,
    pub min_meaningful_tokens: usize,
    /// Per profile, per run.
    pub max_items: usize,
    pub title_max_chars: usize,
    pub summary_max_chars: usize,
    pub deny_phrases: Vec<String>,
    pub deny_prefixes: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_fragment_chars: 20,
            min_token_chars: 4,
            min_meaningful_tokens: 3,
            max_items: 3,
            title_max_chars: 80,
            summary_max_chars: 200,
            deny_phrases: [
                "join linkedin",
                "sign in",
                "sign up",
                "create your account",
                "forgot password",
                "agree & join",
                "user agreement",
                "privacy policy",
                "cookie policy",
                "continue with google",
                "new to linkedin",
                "by clicking",
                "get the app",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            deny_prefixes: ["linkedin", "log in", "welcome back"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct DenylistFile {
    #[serde(default)]
    deny_phrases: Vec<String>,
    #[serde(default)]
    deny_prefixes: Vec<String>,
}

impl ExtractorConfig {
    /// Built-in config with the deny-list optionally replaced from a TOML
    /// file (`DENYLIST_PATH`, default `config/denylist.toml`). A missing file
    /// keeps the built-ins; a malformed one is logged and ignored.
    pub fn load() -> Self {
        let path = std::env::var("DENYLIST_PATH")
            .unwrap_or_else(|_| "config/denylist.toml".to_string());
        let mut cfg = Self::default();
        match std::fs::read_to_string(&path) {
            Ok(raw) => match toml::from_str::<DenylistFile>(&raw) {
                Ok(file) => {
                    if !file.deny_phrases.is_empty() {
                        cfg.deny_phrases =
                            file.deny_phrases.iter().map(|s| s.to_lowercase()).collect();
                    }
                    if !file.deny_prefixes.is_empty() {
                        cfg.deny_prefixes =
                            file.deny_prefixes.iter().map(|s| s.to_lowercase()).collect();
                    }
                    debug!(path = %path, phrases = cfg.deny_phrases.len(), "deny-list loaded");
                }
                Err(e) => warn!(path = %path, error = ?e, "deny-list unreadable, using built-ins"),
            },
            Err(_) => debug!(path = %path, "no deny-list file, using built-ins"),
        }
        cfg
    }
}

/// One presentable change, ready for the notification composer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentItem {
    pub source_profile: String,
    pub title: String,
    pub summary: String,
    pub canonical_url: String,
    pub detected_at: DateTime<Utc>,
}

/// Ordered canonical signal strings. Never empty after `extract`: the
/// fallback chain always produces at least one entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalSet(Vec<String>);

impl SignalSet {
    pub fn push(&mut self, signal: impl Into<String>) {
        self.0.push(signal.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub items: Vec<ContentItem>,
    pub signals: SignalSet,
}

fn tag_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"))
}

fn ws_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"))
}

/// Entity decode, tag strip, quote normalization, whitespace collapse.
/// Sentence terminators are kept; title and summary derivation needs them.
fn clean_fragment(raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw);
    let stripped = tag_re().replace_all(&decoded, " ");
    let normalized = stripped
        .replace('\u{2019}', "'")
        .replace('\u{2018}', "'")
        .replace('\u{201C}', "\"")
        .replace('\u{201D}', "\"");
    let collapsed = ws_re().replace_all(&normalized, " ");
    collapsed.trim().to_string()
}

fn is_boilerplate(text: &str, cfg: &ExtractorConfig) -> bool {
    let lower = text.to_lowercase();
    cfg.deny_phrases.iter().any(|p| lower.contains(p.as_str()))
        || cfg.deny_prefixes.iter().any(|p| lower.starts_with(p.as_str()))
}

fn distinct_meaningful_tokens(text: &str, cfg: &ExtractorConfig) -> usize {
    let mut seen = HashSet::new();
    for token in text.split(|c: char| !c.is_alphabetic()) {
        if token.chars().count() >= cfg.min_token_chars {
            seen.insert(token.to_lowercase());
        }
    }
    seen.len()
}

/// The gate every fragment, title sentence, and summary sentence must pass.
fn validate_fragment(text: &str, cfg: &ExtractorConfig) -> bool {
    text.chars().count() >= cfg.min_fragment_chars
        && !is_boilerplate(text, cfg)
        && distinct_meaningful_tokens(text, cfg) >= cfg.min_meaningful_tokens
}

/// Split on sentence terminators followed by whitespace, so decimals and
/// abbreviations inside a run stay together.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?' | '…') && chars.peek().map_or(true, |n| n.is_whitespace()) {
            let s = current.trim();
            if !s.is_empty() {
                sentences.push(s.to_string());
            }
            current.clear();
        }
    }
    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Whole leading words within the budget, then an ellipsis.
fn truncate_to_tokens(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let budget = max_chars.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0usize;
    for word in text.split_whitespace() {
        let word_chars = word.chars().count();
        let extra = if out.is_empty() { word_chars } else { word_chars + 1 };
        if used + extra > budget {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
        used += extra;
    }
    if out.is_empty() {
        out = text.chars().take(budget).collect();
    }
    out.push('…');
    out
}

fn take_chars(s: &str, n: usize) -> String {
    if s.chars().count() <= n {
        s.to_string()
    } else {
        s.chars().take(n).collect()
    }
}

fn derive_title(fragment: &str, cfg: &ExtractorConfig) -> String {
    let first_valid = split_sentences(fragment)
        .into_iter()
        .find(|s| validate_fragment(s, cfg));
    match first_valid {
        Some(s) if s.chars().count() <= cfg.title_max_chars => s,
        Some(s) => truncate_to_tokens(&s, cfg.title_max_chars),
        None => truncate_to_tokens(fragment, cfg.title_max_chars),
    }
}

fn derive_summary(fragment: &str, cfg: &ExtractorConfig) -> String {
    let mut out = String::new();
    let mut used = 0usize;
    let mut taken = 0usize;
    for sentence in split_sentences(fragment) {
        if taken == 2 {
            break;
        }
        if !validate_fragment(&sentence, cfg) {
            continue;
        }
        let sentence_chars = sentence.chars().count();
        let extra = if out.is_empty() { sentence_chars } else { sentence_chars + 1 };
        if used + extra > cfg.summary_max_chars {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&sentence);
        used += extra;
        taken += 1;
    }
    if out.is_empty() {
        out = truncate_to_tokens(fragment, cfg.summary_max_chars);
    }
    out
}

/// Run the full extraction over one page body.
///
/// Activity ids are deduplicated, sorted newest-first, and capped; fragment
/// strategies run in priority order and the first to yield a validated
/// fragment wins. The returned signal set is never empty, and fallback-only
/// extractions carry no items at all.
pub fn extract(body: &str, profile: &MonitoredProfile, cfg: &ExtractorConfig) -> Extraction {
    let trimmed = body.trim();
    if trimmed.chars().count() < MIN_BODY_CHARS {
        let mut signals = SignalSet::default();
        signals.push(EMPTY_PAGE_SIGNAL);
        return Extraction { items: Vec::new(), signals };
    }

    let mut seen_ids = HashSet::new();
    let mut ids: Vec<String> = raw_activity_ids(body)
        .into_iter()
        .filter(|id| seen_ids.insert(id.to_string()))
        .map(String::from)
        .collect();
    // Longer digit strings are numerically larger, so this is newest-first
    // without parsing ids that overflow u64.
    ids.sort_unstable_by(|a, b| (b.len(), b.as_str()).cmp(&(a.len(), a.as_str())));
    ids.truncate(MAX_ACTIVITY_IDS);

    let mut fragments: Vec<String> = Vec::new();
    for strategy in fragment_strategies() {
        let mut seen = HashSet::new();
        let validated: Vec<String> = strategy
            .capture_all(body)
            .into_iter()
            .map(clean_fragment)
            .filter(|f| validate_fragment(f, cfg))
            .filter(|f| seen.insert(f.clone()))
            .collect();
        if !validated.is_empty() {
            debug!(strategy = strategy.name, count = validated.len(), "fragments matched");
            fragments = validated;
            break;
        }
    }
    fragments.truncate(cfg.max_items);

    let now = Utc::now();
    let items: Vec<ContentItem> = fragments
        .iter()
        .enumerate()
        .map(|(i, fragment)| ContentItem {
            source_profile: profile.display_name.clone(),
            title: derive_title(fragment, cfg),
            summary: derive_summary(fragment, cfg),
            canonical_url: ids
                .get(i)
                .map(|id| format!("https://www.linkedin.com/posts/activity-{id}"))
                .unwrap_or_else(|| profile.target_url.clone()),
            detected_at: now,
        })
        .collect();

    let mut signals = SignalSet::default();
    for id in &ids {
        signals.push(format!("id:{id}"));
    }
    for fragment in &fragments {
        signals.push(format!("text:{}", take_chars(fragment, SIGNAL_TEXT_CHARS)));
    }

    if signals.is_empty() {
        let mut seen = HashSet::new();
        let links: Vec<&str> = raw_links(body)
            .into_iter()
            .filter(|l| seen.insert(*l))
            .take(MAX_LINK_SIGNALS)
            .collect();
        if !links.is_empty() {
            for link in links {
                signals.push(format!("sig:{link}"));
            }
        } else {
            let sample = take_chars(&clean_fragment(trimmed), BODY_SAMPLE_CHARS);
            if sample.is_empty() {
                signals.push(EMPTY_PAGE_SIGNAL);
            } else {
                signals.push(format!("sig:{sample}"));
            }
        }
    }

    Extraction { items, signals }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> MonitoredProfile {
        MonitoredProfile::new("https://www.linkedin.com/company/acme/posts/", "Acme").unwrap()
    }

    #[test]
    fn cleaning_decodes_strips_and_collapses() {
        let raw = "Breaking&nbsp;news: we&#39;re <b>hiring</b>\n\n  engineers \u{201C}now\u{201D}";
        assert_eq!(
            clean_fragment(raw),
            "Breaking news: we're hiring engineers \"now\""
        );
    }

    #[test]
    fn boilerplate_phrases_and_prefixes_are_rejected() {
        let cfg = ExtractorConfig::default();
        assert!(is_boilerplate("Please sign in to view this content today", &cfg));
        assert!(is_boilerplate("LinkedIn Corporation navigation header", &cfg));
        assert!(!is_boilerplate("Quarterly results announced this morning", &cfg));
    }

    #[test]
    fn token_policy_requires_distinct_meaningful_words() {
        let cfg = ExtractorConfig::default();
        // Two distinct tokens repeated, still only two.
        assert!(!validate_fragment("wordword other wordword other wordword", &cfg));
        assert!(validate_fragment("Quarterly results announced this morning", &cfg));
    }

    #[test]
    fn title_prefers_the_first_valid_sentence() {
        let cfg = ExtractorConfig::default();
        let fragment = "Quarterly results announced this morning. More details follow below.";
        assert_eq!(derive_title(fragment, &cfg), "Quarterly results announced this morning.");
    }

    #[test]
    fn overlong_fragments_are_token_truncated_with_ellipsis() {
        let cfg = ExtractorConfig::default();
        let fragment =
            "Announcing partnership expansion across fourteen european markets together with established manufacturing leaders during the upcoming fiscal period";
        let title = derive_title(fragment, &cfg);
        assert!(title.chars().count() <= cfg.title_max_chars);
        assert!(title.ends_with('…'));
        assert!(title.starts_with("Announcing partnership"));
    }

    #[test]
    fn summary_takes_at_most_two_sentences_within_budget() {
        let cfg = ExtractorConfig::default();
        let fragment = "Quarterly results announced this morning. Revenue climbed across every segment worldwide. Further details arrive next week.";
        let summary = derive_summary(fragment, &cfg);
        assert_eq!(
            summary,
            "Quarterly results announced this morning. Revenue climbed across every segment worldwide."
        );
    }

    #[test]
    fn near_empty_bodies_yield_the_stable_empty_signal() {
        let out = extract("<html><body></body></html>", &profile(), &ExtractorConfig::default());
        assert!(out.items.is_empty());
        assert_eq!(out.signals.iter().collect::<Vec<_>>(), vec![EMPTY_PAGE_SIGNAL]);
    }

    #[test]
    fn ids_are_deduplicated_sorted_newest_first_and_capped() {
        let mut body = String::from("<html><body>");
        for id in ["900", "7003", "7001", "7002", "7001", "7004", "7005", "7006"] {
            body.push_str(&format!(r#"<div data-urn="urn:li:activity:{id}"></div>"#));
        }
        body.push_str(&" filler text to get past the empty page floor ".repeat(3));
        body.push_str("</body></html>");

        let out = extract(&body, &profile(), &ExtractorConfig::default());
        let signals: Vec<_> = out.signals.iter().collect();
        assert_eq!(signals, vec!["id:7006", "id:7005", "id:7004", "id:7003", "id:7002"]);
    }

    #[test]
    fn longer_ids_sort_before_shorter_ones() {
        let body = format!(
            r#"<div data-urn="urn:li:activity:999"></div><div data-urn="urn:li:activity:10000"></div>{}"#,
            " padding so the body clears the minimum length floor ".repeat(3)
        );
        let out = extract(&body, &profile(), &ExtractorConfig::default());
        let signals: Vec<_> = out.signals.iter().collect();
        assert_eq!(signals, vec!["id:10000", "id:999"]);
    }

    #[test]
    fn first_strategy_with_validated_fragments_wins() {
        let body = format!(
            r#"<span class="update-components-text">Please sign in to view this full content</span>
               {{"text":"Our new research lab opens next month in Austin"}}
               {}"#,
            " padding so the body clears the minimum length floor ".repeat(2)
        );
        let out = extract(&body, &profile(), &ExtractorConfig::default());
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].title, "Our new research lab opens next month in Austin");
    }

    #[test]
    fn items_are_capped_and_mapped_to_activity_urls_in_order() {
        let mut body = String::new();
        for id in ["7004", "7003", "7002", "7001"] {
            body.push_str(&format!(r#"<div data-urn="urn:li:activity:{id}"></div>"#));
        }
        for n in ["first", "second", "third", "fourth"] {
            body.push_str(&format!(
                r#"<span class="update-components-text">Product update number {n} covering fresh engineering milestones</span>"#
            ));
        }

        let out = extract(&body, &profile(), &ExtractorConfig::default());
        assert_eq!(out.items.len(), 3);
        assert_eq!(
            out.items[0].canonical_url,
            "https://www.linkedin.com/posts/activity-7004"
        );
        assert_eq!(
            out.items[2].canonical_url,
            "https://www.linkedin.com/posts/activity-7002"
        );
        // id signals first, then one text signal per kept fragment
        assert_eq!(out.signals.len(), 4 + 3);
    }

    #[test]
    fn items_without_ids_link_back_to_the_profile() {
        let body = format!(
            r#"<span class="update-components-text">Weekend hackathon produced several promising prototypes</span>{}"#,
            " padding so the body clears the minimum length floor ".repeat(2)
        );
        let out = extract(&body, &profile(), &ExtractorConfig::default());
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].canonical_url, "https://www.linkedin.com/company/acme/posts/");
    }

    #[test]
    fn link_fallback_fires_when_nothing_else_matches() {
        let body = format!(
            r#"<a href="https://www.linkedin.com/company/acme/about/">about</a>{}"#,
            " padding so the body clears the minimum length floor ".repeat(3)
        );
        let out = extract(&body, &profile(), &ExtractorConfig::default());
        assert!(out.items.is_empty());
        let signals: Vec<_> = out.signals.iter().collect();
        assert_eq!(signals.len(), 1);
        assert!(signals[0].starts_with("sig:linkedin.com/company/acme"));
    }

    #[test]
    fn body_sample_fallback_is_bounded() {
        let body = "lorem ipsum dolor sit amet consectetur adipiscing elit ".repeat(20);
        let out = extract(&body, &profile(), &ExtractorConfig::default());
        assert!(out.items.is_empty());
        let signals: Vec<_> = out.signals.iter().collect();
        assert_eq!(signals.len(), 1);
        assert!(signals[0].starts_with("sig:lorem ipsum"));
        assert!(signals[0].chars().count() <= BODY_SAMPLE_CHARS + "sig:".len());
    }
}
