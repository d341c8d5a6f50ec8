// src/guide/providers/digea.rs
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::guide::config::{athens, ProviderConfig};
use crate::guide::fetch::HttpSource;
use crate::guide::squish;
use crate::guide::types::{ChannelMap, ChannelRef, GuideItem, Programme, Provider};

/// Digea renders the national DTT schedule as one JSON array per date, with
/// explicit start and end timestamps per event.
#[derive(Debug, Deserialize)]
struct DigeaEvent {
    channel_id: Option<String>,
    actual_time: Option<String>, // "2025-03-01 20:00:00"
    end_time: Option<String>,
    title_gre: Option<String>,
    long_synopsis_gre: Option<String>,
}

fn parse_wall_time(s: &str) -> Option<DateTime<FixedOffset>> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S").ok()?;
    athens().from_local_datetime(&naive).single()
}

pub struct Digea {
    mapping: ChannelMap,
    mode: Mode,
}

enum Mode {
    Http(HttpSource),
    Fixture(String),
}

impl Digea {
    pub fn from_config(cfg: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            mapping: cfg.mapping.clone(),
            mode: Mode::Http(HttpSource::new(cfg)?),
        })
    }

    pub fn from_fixture(mapping: ChannelMap, payload: &str) -> Self {
        Self {
            mapping,
            mode: Mode::Fixture(payload.to_string()),
        }
    }

    fn parse(payload: &str) -> Vec<DigeaEvent> {
        match serde_json::from_str(payload) {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(error = ?e, provider = "digea", "unparsable payload, skipping date");
                Vec::new()
            }
        }
    }

    fn process(&self, event: DigeaEvent) -> Option<GuideItem> {
        let (id, name) = self.mapping.get(event.channel_id.as_deref()?)?;

        let start = parse_wall_time(event.actual_time.as_deref()?)?;
        let stop = parse_wall_time(event.end_time.as_deref()?)?;
        if stop <= start {
            return None;
        }

        let title = squish(event.title_gre.as_deref()?);
        if title.is_empty() {
            return None;
        }
        let desc = event
            .long_synopsis_gre
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
impl Provider for Digea {
    fn name(&self) -> &'static str {
        "digea"
    }

    fn mapping(&self) -> &ChannelMap {
        &self.mapping
    }

    async fn fetch(&self, date: NaiveDate) -> Result<String> {
        match &self.mode {
            Mode::Fixture(s) => Ok(s.clone()),
            Mode::Http(src) => {
                src.post_form(&[
                    ("action", "get_events".to_string()),
                    ("date", date.format("%Y-%m-%d").to_string()),
                ])
                .await
            }
        }
    }

    fn extract(&self, _date: NaiveDate, payload: &str) -> Vec<GuideItem> {
        let t0 = std::time::Instant::now();
        let items: Vec<GuideItem> = Self::parse(payload)
            .into_iter()
            .filter_map(|e| self.process(e))
            .collect();
        histogram!("guide_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("guide_events_total").increment(items.len() as u64);
        items
    }
}
