// src/guide/mod.rs
pub mod config;
pub mod fetch;
pub mod providers;
pub mod rollover;
pub mod types;
pub mod xmltv;

use std::collections::HashSet;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use crate::guide::types::{ChannelRef, GuideItem, Programme, Provider};

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("guide_events_total", "Events parsed from upstream payloads.");
        describe_counter!("guide_items_total", "Normalized items produced by providers.");
        describe_counter!(
            "guide_filtered_total",
            "Programmes dropped by the channel allow-list."
        );
        describe_counter!(
            "guide_provider_errors_total",
            "Provider fetch/parse/task errors."
        );
        describe_counter!("guide_fetch_retries_total", "Upstream request retries.");
        describe_histogram!("guide_parse_ms", "Provider parse time in milliseconds.");
        describe_gauge!("guide_last_run_ts", "Unix ts when the guide pipeline last ran.");
    });
}

/// Squeeze presentation text: decode entities, collapse runs of whitespace
/// (including NBSP), trim.
pub fn squish(s: &str) -> String {
    let out = html_escape::decode_html_entities(s).to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"[\s\u{a0}]+").unwrap());
    re_ws.replace_all(&out, " ").trim().to_string()
}

/// Run every registered provider, one task each, and concatenate their
/// items in registration order. A failing provider is logged and skipped;
/// siblings are unaffected.
pub async fn run_all(providers: Vec<Box<dyn Provider>>) -> Vec<GuideItem> {
    ensure_metrics_described();

    let mut handles = Vec::with_capacity(providers.len());
    for p in providers {
        let name = p.name();
        handles.push((name, tokio::spawn(async move { p.run().await })));
    }

    let mut items = Vec::new();
    for (name, handle) in handles {
        match handle.await {
            Ok(Ok(mut v)) => {
                counter!("guide_items_total").increment(v.len() as u64);
                tracing::info!(provider = name, items = v.len(), "provider done");
                items.append(&mut v);
            }
            Ok(Err(e)) => {
                tracing::warn!(error = ?e, provider = name, "provider failed");
                counter!("guide_provider_errors_total").increment(1);
            }
            Err(e) => {
                tracing::warn!(error = ?e, provider = name, "provider task aborted");
                counter!("guide_provider_errors_total").increment(1);
            }
        }
    }

    gauge!("guide_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
    items
}

/// Channel set in first-seen order, deduplicated by id.
pub fn channels(items: &[GuideItem]) -> Vec<ChannelRef> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if seen.insert(item.channel.id.clone()) {
            out.push(item.channel.clone());
        }
    }
    out
}

/// Derive the final (channels, programmes) pair: dedup channels, keep only
/// those whose name is on the allow-list, drop programmes referencing any
/// other channel, trim every string field last.
pub fn build_guide(items: &[GuideItem], allow: &[String]) -> (Vec<ChannelRef>, Vec<Programme>) {
    let mut chans = channels(items);
    chans.retain(|c| allow.iter().any(|name| name == c.name.trim()));

    let allowed_ids: HashSet<&str> = chans.iter().map(|c| c.id.as_str()).collect();

    let chans: Vec<ChannelRef> = chans
        .iter()
        .map(|c| ChannelRef {
            id: c.id.trim().to_string(),
            name: c.name.trim().to_string(),
        })
        .collect();

    let mut dropped = 0usize;
    let mut progs = Vec::new();
    for item in items {
        if !allowed_ids.contains(item.programme.channel.as_str()) {
            dropped += 1;
            continue;
        }
        let p = &item.programme;
        progs.push(Programme {
            channel: p.channel.trim().to_string(),
            start: p.start,
            stop: p.stop,
            title: p.title.trim().to_string(),
            desc: p.desc.trim().to_string(),
        });
    }
    counter!("guide_filtered_total").increment(dropped as u64);

    (chans, progs)
}
