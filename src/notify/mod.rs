// src/notify/mod.rs
//! Notification assembly and dispatch. The orchestrator hands the composer a
//! non-empty item batch and exactly one message leaves per run.

pub mod email;

use std::fmt::Write as _;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::extract::ContentItem;

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, message: &Notification) -> Result<()>;
}

/// Group items by source profile in first-seen order, keeping detection
/// order within each group.
fn group_by_profile(items: &[ContentItem]) -> Vec<(&str, Vec<&ContentItem>)> {
    let mut groups: Vec<(&str, Vec<&ContentItem>)> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|(name, _)| *name == item.source_profile) {
            Some((_, bucket)) => bucket.push(item),
            None => groups.push((item.source_profile.as_str(), vec![item])),
        }
    }
    groups
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Build the consolidated report. Callers guarantee a non-empty batch; an
/// empty one would produce a contentless email, so it is a programming error.
pub fn compose(items: &[ContentItem]) -> Notification {
    debug_assert!(!items.is_empty(), "composer requires at least one item");

    let groups = group_by_profile(items);
    let subject = format!(
        "LinkedIn activity: {} new post{} from {} profile{}",
        items.len(),
        plural(items.len()),
        groups.len(),
        plural(groups.len()),
    );

    let today = Utc::now().format("%Y-%m-%d");
    let mut text = String::new();
    let _ = writeln!(text, "LinkedIn activity report, {today}");
    let _ = writeln!(
        text,
        "{} new post{} across {} profile{}",
        items.len(),
        plural(items.len()),
        groups.len(),
        plural(groups.len()),
    );
    let mut n = 0usize;
    for (name, bucket) in &groups {
        let _ = writeln!(text, "\n== {name} ==");
        for item in bucket {
            n += 1;
            let _ = writeln!(text, "{n}. {}", item.title);
            let _ = writeln!(text, "   {}", item.summary);
            let _ = writeln!(text, "   {}", item.canonical_url);
            let _ = writeln!(
                text,
                "   detected {}",
                item.detected_at.format("%Y-%m-%d %H:%M UTC")
            );
        }
    }
    let _ = writeln!(text, "\nAutomated report, one message per run.");

    let mut html = String::new();
    html.push_str(
        "<!DOCTYPE html><html><body style=\"margin:0;padding:0;background-color:#f3f2ef;font-family:Arial,Helvetica,sans-serif;\">",
    );
    let _ = write!(
        html,
        "<div style=\"background-color:#0077b5;color:#ffffff;padding:16px 24px;\"><h2 style=\"margin:0;font-size:20px;\">New LinkedIn posts</h2><p style=\"margin:4px 0 0;font-size:13px;\">{} new post{} from {} profile{}, {today}</p></div>",
        items.len(),
        plural(items.len()),
        groups.len(),
        plural(groups.len()),
    );
    html.push_str("<div style=\"padding:16px 24px;\">");
    for (name, bucket) in &groups {
        let _ = write!(
            html,
            "<h3 style=\"color:#0077b5;margin:16px 0 8px;font-size:16px;\">{}</h3>",
            encode_text(name)
        );
        for item in bucket {
            let _ = write!(
                html,
                "<div style=\"background-color:#ffffff;border-left:4px solid #0077b5;margin:0 0 12px;padding:12px 16px;\">\
                 <p style=\"margin:0;font-weight:bold;font-size:14px;\">{}</p>\
                 <p style=\"margin:6px 0;font-size:13px;color:#333333;\">{}</p>\
                 <p style=\"margin:0;font-size:12px;\"><a href=\"{}\" style=\"color:#0077b5;\">View post</a> \
                 <span style=\"color:#999999;\">detected {}</span></p></div>",
                encode_text(&item.title),
                encode_text(&item.summary),
                // Attribute context, not text context: quotes must not end
                // the href early.
                encode_double_quoted_attribute(&item.canonical_url),
                item.detected_at.format("%Y-%m-%d %H:%M UTC"),
            );
        }
    }
    html.push_str(
        "</div><div style=\"padding:12px 24px;color:#999999;font-size:11px;\">Automated LinkedIn activity monitor. One consolidated report per run.</div></body></html>",
    );

    Notification { subject, text_body: text, html_body: html }
}
