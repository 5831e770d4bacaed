// tests/extract_fixtures.rs
// Extraction against captured logged-out LinkedIn markup: a company feed, a
// cosmetic-noise rendering of the same feed, the same feed with one newer
// post, and the authwall shown when the feed is withheld.

use linkedin_activity_monitor::{extract, fingerprint, ExtractorConfig, MonitoredProfile};

const FEED: &str = include_str!("fixtures/company_feed.html");
const FEED_NOISE: &str = include_str!("fixtures/company_feed_noise.html");
const FEED_UPDATED: &str = include_str!("fixtures/company_feed_updated.html");
const WALL: &str = include_str!("fixtures/logged_out_wall.html");

fn profile() -> MonitoredProfile {
    MonitoredProfile::new("https://www.linkedin.com/company/acme-corp/posts/", "Acme Corp")
        .expect("fixture profile is valid")
}

#[test]
fn feed_fixture_yields_validated_items_with_post_links() {
    let out = extract(FEED, &profile(), &ExtractorConfig::default());

    assert_eq!(out.items.len(), 2);
    assert_eq!(out.items[0].source_profile, "Acme Corp");
    assert_eq!(
        out.items[0].title,
        "We are thrilled to announce our new engineering hub in Lisbon."
    );
    assert_eq!(
        out.items[0].summary,
        "We are thrilled to announce our new engineering hub in Lisbon. \
         Over forty roles are open across platform and data teams."
    );
    assert_eq!(
        out.items[0].canonical_url,
        "https://www.linkedin.com/posts/activity-7215563412345678902"
    );
    assert_eq!(
        out.items[1].canonical_url,
        "https://www.linkedin.com/posts/activity-7215563412345678901"
    );

    // Two deduplicated ids plus one text signal per kept fragment.
    let signals: Vec<_> = out.signals.iter().collect();
    assert_eq!(signals.len(), 4);
    assert_eq!(signals[0], "id:7215563412345678902");
    assert_eq!(signals[1], "id:7215563412345678901");
    assert!(signals[2].starts_with("text:We are thrilled"));
}

#[test]
fn title_skips_a_leading_sentence_that_fails_validation() {
    // "Quarterly results are in." has only two meaningful tokens, so the
    // second sentence becomes the title.
    let out = extract(FEED, &profile(), &ExtractorConfig::default());
    assert_eq!(
        out.items[1].title,
        "Revenue grew eighteen percent year over year, led by our cloud division."
    );
}

#[test]
fn boilerplate_span_in_the_feed_never_becomes_an_item() {
    let out = extract(FEED, &profile(), &ExtractorConfig::default());
    assert!(out
        .items
        .iter()
        .all(|item| !item.title.contains("Sign in") && !item.summary.contains("Sign in")));
}

#[test]
fn cosmetic_markup_noise_keeps_the_fingerprint_stable() {
    let cfg = ExtractorConfig::default();
    let base = extract(FEED, &profile(), &cfg);
    let noisy = extract(FEED_NOISE, &profile(), &cfg);

    assert_eq!(base.signals, noisy.signals);
    assert_eq!(fingerprint(&base.signals), fingerprint(&noisy.signals));
}

#[test]
fn a_new_post_changes_the_fingerprint_and_leads_the_items() {
    let cfg = ExtractorConfig::default();
    let before = extract(FEED, &profile(), &cfg);
    let after = extract(FEED_UPDATED, &profile(), &cfg);

    assert_ne!(fingerprint(&before.signals), fingerprint(&after.signals));
    assert_eq!(after.items.len(), 3);
    assert_eq!(
        after.items[0].title,
        "Team expands to 200 people worldwide as hiring accelerates into autumn."
    );
    assert_eq!(
        after.items[0].canonical_url,
        "https://www.linkedin.com/posts/activity-7215563412345678903"
    );
}

#[test]
fn logged_out_wall_yields_signals_but_no_items() {
    let out = extract(WALL, &profile(), &ExtractorConfig::default());

    assert!(out.items.is_empty());
    assert!(!out.signals.is_empty());
    // Fallback page-signature signals, never item signals.
    assert!(out.signals.iter().all(|s| s.starts_with("sig:")));
}

#[test]
fn wall_fingerprint_is_deterministic_across_extractions() {
    let cfg = ExtractorConfig::default();
    let first = extract(WALL, &profile(), &cfg);
    let second = extract(WALL, &profile(), &cfg);
    assert_eq!(fingerprint(&first.signals), fingerprint(&second.signals));
    assert_ne!(
        fingerprint(&first.signals),
        fingerprint(&extract(FEED, &profile(), &cfg).signals)
    );
}
