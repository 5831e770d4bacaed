// src/extract/strategies.rs
//! Pattern inventory for the extractor: activity URN shapes, ordered content
//! fragment strategies, and the page link signature. Raw scanning only; the
//! parent module applies cleaning, validation, and caps.

use once_cell::sync::OnceCell;
use regex::Regex;

/// One way of pulling post text out of the markup. Strategies are tried in
/// declaration order and the first one that yields a validated fragment wins.
pub struct FragmentStrategy {
    pub name: &'static str,
    re: Regex,
}

impl FragmentStrategy {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self { name, re: Regex::new(pattern).expect("fragment pattern") }
    }

    /// All capture-group matches in document order, uncleaned.
    pub fn capture_all<'a>(&self, body: &'a str) -> Vec<&'a str> {
        self.re
            .captures_iter(body)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect()
    }
}

pub fn fragment_strategies() -> &'static [FragmentStrategy; 3] {
    static STRATEGIES: OnceCell<[FragmentStrategy; 3]> = OnceCell::new();
    STRATEGIES.get_or_init(|| {
        [
            FragmentStrategy::new(
                "update-span",
                r#"(?i)<span[^>]*update-components-text[^>]*>([^<]{20,200})</span>"#,
            ),
            FragmentStrategy::new("json-text", r#""text":"([^"]{20,200})""#),
            FragmentStrategy::new(
                "shared-div",
                r#"(?i)<div[^>]*feed-shared-text[^>]*>([^<]{20,200})</div>"#,
            ),
        ]
    })
}

/// Activity URN shapes, most specific first. All capture the numeric id.
fn activity_id_patterns() -> &'static [Regex; 4] {
    static PATTERNS: OnceCell<[Regex; 4]> = OnceCell::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r#"data-urn="urn:li:activity:(\d+)""#).expect("activity pattern"),
            Regex::new(r#""activityUrn":"urn:li:activity:(\d+)""#).expect("activity pattern"),
            Regex::new(r"urn:li:activity:(\d+)").expect("activity pattern"),
            Regex::new(r"activity-(\d+)").expect("activity pattern"),
        ]
    })
}

fn page_link_pattern() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r#"linkedin\.com/[^"'>\s]+"#).expect("link pattern"))
}

/// Every activity id match across all patterns, pattern order then document
/// order. Duplicates included; the caller dedupes and sorts.
pub fn raw_activity_ids(body: &str) -> Vec<&str> {
    let mut ids = Vec::new();
    for re in activity_id_patterns() {
        for caps in re.captures_iter(body) {
            if let Some(m) = caps.get(1) {
                ids.push(m.as_str());
            }
        }
    }
    ids
}

/// Raw `linkedin.com/...` tokens in document order, duplicates included.
pub fn raw_links(body: &str) -> Vec<&str> {
    page_link_pattern().find_iter(body).map(|m| m.as_str()).collect()
}
