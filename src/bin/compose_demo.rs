//! Renders a sample consolidated notification to stdout without sending.
//! Handy for eyeballing subject and body layout after composer changes.

use chrono::Utc;
use linkedin_activity_monitor::{compose, ContentItem};

fn main() {
    let now = Utc::now();
    let items = vec![
        ContentItem {
            source_profile: "Microsoft".to_string(),
            title: "Introducing the next wave of developer tooling.".to_string(),
            summary: "Introducing the next wave of developer tooling. Rolling out to all regions during September.".to_string(),
            canonical_url: "https://www.linkedin.com/posts/activity-7210000000000000001".to_string(),
            detected_at: now,
        },
        ContentItem {
            source_profile: "Microsoft".to_string(),
            title: "Quarterly engineering update is live.".to_string(),
            summary: "Quarterly engineering update is live. Highlights from platform, cloud and research teams.".to_string(),
            canonical_url: "https://www.linkedin.com/posts/activity-7210000000000000002".to_string(),
            detected_at: now,
        },
        ContentItem {
            source_profile: "Tesla".to_string(),
            title: "Factory expansion reaches the next milestone.".to_string(),
            summary: "Factory expansion reaches the next milestone. Production capacity grows again this winter.".to_string(),
            canonical_url: "https://www.linkedin.com/company/tesla-motors/posts/".to_string(),
            detected_at: now,
        },
    ];

    let message = compose(&items);
    println!("Subject: {}\n", message.subject);
    println!("{}", message.text_body);
    println!("--- html ({} bytes) ---", message.html_body.len());
}
