// src/guide/types.rs
use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use metrics::counter;

use crate::guide::config::athens;

/// Upstream channel key -> (channel id, display name).
pub type ChannelMap = BTreeMap<String, (String, String)>;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChannelRef {
    pub id: String,   // e.g. "gr.ert1"
    pub name: String, // e.g. "ERT1"
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Programme {
    pub channel: String, // ChannelRef.id
    pub start: DateTime<FixedOffset>,
    pub stop: DateTime<FixedOffset>,
    pub title: String,
    pub desc: String,
}

/// One normalized (channel, programme) pair as produced by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideItem {
    pub channel: ChannelRef,
    pub programme: Programme,
}

/// Rolling query window: yesterday through seven days ahead. Tolerates
/// upstreams whose "today" grid trails real time and keeps cross-midnight
/// rows from leaking out of the reporting boundary.
pub fn guide_window() -> Vec<NaiveDate> {
    let today = Utc::now().with_timezone(&athens()).date_naive();
    (-1..=7).map(|off| today + Duration::days(off)).collect()
}

/// Contract every upstream source implements. The default `run` drives
/// matrix -> fetch -> extract -> finish and never aborts the whole run for
/// one bad date: fetch failures are logged and that date is skipped.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;

    fn mapping(&self) -> &ChannelMap;

    /// Calendar dates to query.
    fn matrix(&self) -> Vec<NaiveDate> {
        guide_window()
    }

    /// Raw upstream payload for one date. Idempotent; retried at the
    /// transport layer.
    async fn fetch(&self, date: NaiveDate) -> Result<String>;

    /// Decode one date's payload into normalized items, dropping records
    /// that map to no configured channel. A malformed payload yields an
    /// empty vec, not an error.
    fn extract(&self, date: NaiveDate, payload: &str) -> Vec<GuideItem>;

    /// Post-pass over the full run output. HTML-grid sources use this to
    /// backfill stop times from the next row per channel.
    fn finish(&self, items: Vec<GuideItem>) -> Vec<GuideItem> {
        items
    }

    async fn run(&self) -> Result<Vec<GuideItem>> {
        if self.mapping().is_empty() {
            tracing::debug!(provider = self.name(), "empty mapping, nothing to do");
            return Ok(Vec::new());
        }

        let mut items = Vec::new();
        for date in self.matrix() {
            let payload = match self.fetch(date).await {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(error = ?e, provider = self.name(), date = %date, "provider fetch error");
                    counter!("guide_provider_errors_total").increment(1);
                    continue;
                }
            };
            items.extend(self.extract(date, &payload));
        }

        Ok(self.finish(items))
    }
}
