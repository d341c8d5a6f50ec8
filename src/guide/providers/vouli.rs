// src/guide/providers/vouli.rs
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use metrics::{counter, histogram};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::guide::config::{at_athens, ProviderConfig};
use crate::guide::fetch::HttpSource;
use crate::guide::rollover::{backfill_stops, parse_clock, DayCursor};
use crate::guide::squish;
use crate::guide::types::{ChannelMap, ChannelRef, GuideItem, Programme, Provider};

/// Mapping key for the single parliament channel.
const CHANNEL_KEY: &str = "vouli";

// One schedule table per day: a time cell and a title cell per row, rows in
// broadcast order, no dates or end times anywhere.
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("table.program tr").unwrap());
static TIME: Lazy<Selector> = Lazy::new(|| Selector::parse("td.time").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("td.title").unwrap());

fn element_text(el: ElementRef<'_>) -> String {
    squish(&el.text().collect::<String>())
}

pub struct Vouli {
    mapping: ChannelMap,
    mode: Mode,
}

enum Mode {
    Http(HttpSource),
    Fixture(String),
}

impl Vouli {
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
}

#[async_trait]
impl Provider for Vouli {
    fn name(&self) -> &'static str {
        "vouli"
    }

    fn mapping(&self) -> &ChannelMap {
        &self.mapping
    }

    async fn fetch(&self, date: NaiveDate) -> Result<String> {
        match &self.mode {
            Mode::Fixture(s) => Ok(s.clone()),
            Mode::Http(src) => {
                src.get("", &[("date", date.format("%Y-%m-%d").to_string())])
                    .await
            }
        }
    }

    fn extract(&self, date: NaiveDate, payload: &str) -> Vec<GuideItem> {
        let Some((id, name)) = self.mapping.get(CHANNEL_KEY) else {
            return Vec::new();
        };

        let t0 = std::time::Instant::now();
        let doc = Html::parse_document(payload);

        let mut cursor = DayCursor::new(date);
        let mut items = Vec::new();
        for row in doc.select(&ROW) {
            let Some(clock) = row.select(&TIME).next().and_then(|c| parse_clock(&element_text(c)))
            else {
                continue;
            };
            let Some(title) = row
                .select(&TITLE)
                .next()
                .map(element_text)
                .filter(|t| !t.is_empty())
            else {
                continue;
            };

            let start = at_athens(cursor.advance(clock), clock);
            items.push(GuideItem {
                channel: ChannelRef {
                    id: id.clone(),
                    name: name.clone(),
                },
                programme: Programme {
                    channel: id.clone(),
                    start,
                    stop: start,
                    title: title.clone(),
                    desc: title,
                },
            });
        }

        histogram!("guide_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("guide_events_total").increment(items.len() as u64);
        items
    }

    fn finish(&self, items: Vec<GuideItem>) -> Vec<GuideItem> {
        backfill_stops(items)
    }
}
