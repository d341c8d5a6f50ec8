// src/guide/providers/cosmote.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};

use crate::guide::config::{at_athens, ProviderConfig};
use crate::guide::fetch::HttpSource;
use crate::guide::rollover::parse_clock;
use crate::guide::squish;
use crate::guide::types::{ChannelMap, ChannelRef, GuideItem, Programme, Provider};

/// Pagination backstop; the upstream reports a handful of pages per day.
const MAX_PAGES: u32 = 20;

/// One page of the paginated day listing.
#[derive(Debug, Deserialize)]
struct CosmotePage {
    #[serde(default = "one")]
    page: u32,
    #[serde(default = "one", rename = "totalPages")]
    total_pages: u32,
    #[serde(default)]
    events: Vec<CosmoteEvent>,
}

fn one() -> u32 {
    1
}

/// Events carry clock values on the queried date; an end clock smaller than
/// the start clock means the slot runs past midnight.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CosmoteEvent {
    #[serde(rename = "channelId")]
    channel_id: Option<String>,
    #[serde(rename = "startTime")]
    start_time: Option<String>, // "HH:MM"
    #[serde(rename = "endTime")]
    end_time: Option<String>,
    title: Option<String>,
    #[serde(rename = "shortSynopsis")]
    synopsis: Option<String>,
}

pub struct Cosmote {
    mapping: ChannelMap,
    mode: Mode,
}

enum Mode {
    Http(HttpSource),
    Fixture(String),
}

impl Cosmote {
    pub fn from_config(cfg: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            mapping: cfg.mapping.clone(),
            mode: Mode::Http(HttpSource::new(cfg)?),
        })
    }

    /// Fixture payload is a plain JSON array of events (pages already merged).
    pub fn from_fixture(mapping: ChannelMap, payload: &str) -> Self {
        Self {
            mapping,
            mode: Mode::Fixture(payload.to_string()),
        }
    }

    fn parse(payload: &str) -> Vec<CosmoteEvent> {
        match serde_json::from_str(payload) {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(error = ?e, provider = "cosmote", "unparsable payload, skipping date");
                Vec::new()
            }
        }
    }

    fn process(&self, date: NaiveDate, event: CosmoteEvent) -> Option<GuideItem> {
        let (id, name) = self.mapping.get(event.channel_id.as_deref()?)?;

        let start = at_athens(date, parse_clock(event.start_time.as_deref()?)?);
        let mut stop = at_athens(date, parse_clock(event.end_time.as_deref()?)?);
        if stop < start {
            stop += Duration::days(1);
        }
        if stop <= start {
            return None;
        }

        let title = squish(event.title.as_deref()?);
        if title.is_empty() {
            return None;
        }
        let desc = event
            .synopsis
            .as_deref()
            .map(squish)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| title.clone());

        Some(GuideItem {
            channel: ChannelRef {
                id: id.clone(),
                name: name.clone(),
            },
            programme: Programme {
                channel: id.clone(),
                start,
                stop,
                title,
                desc,
            },
        })
    }
}

#[async_trait]
impl Provider for Cosmote {
    fn name(&self) -> &'static str {
        "cosmote"
    }

    fn mapping(&self) -> &ChannelMap {
        &self.mapping
    }

    /// Walks the day's pages and merges their events into one JSON array.
    async fn fetch(&self, date: NaiveDate) -> Result<String> {
        match &self.mode {
            Mode::Fixture(s) => Ok(s.clone()),
            Mode::Http(src) => {
                let day = date.format("%Y-%m-%d").to_string();
                let mut events: Vec<CosmoteEvent> = Vec::new();
                let mut page = 1u32;
                loop {
                    let body = src
                        .get("", &[("date", day.clone()), ("page", page.to_string())])
                        .await?;
                    let parsed: CosmotePage =
                        serde_json::from_str(&body).context("parsing cosmote page")?;
                    events.extend(parsed.events);
                    if parsed.page >= parsed.total_pages || page >= MAX_PAGES {
                        break;
                    }
                    page += 1;
                }
                serde_json::to_string(&events).context("merging cosmote pages")
            }
        }
    }

    fn extract(&self, date: NaiveDate, payload: &str) -> Vec<GuideItem> {
        let t0 = std::time::Instant::now();
        let items: Vec<GuideItem> = Self::parse(payload)
            .into_iter()
            .filter_map(|e| self.process(date, e))
            .collect();
        histogram!("guide_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("guide_events_total").increment(items.len() as u64);
        items
    }
}
