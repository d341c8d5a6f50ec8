// src/guide/providers/ert.rs
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use metrics::{counter, histogram};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::guide::config::{at_athens, ProviderConfig};
use crate::guide::fetch::HttpSource;
use crate::guide::rollover::{backfill_stops, parse_clock, CursorMap, DayCursor};
use crate::guide::squish;
use crate::guide::types::{ChannelMap, ChannelRef, GuideItem, Programme, Provider};

// The ERT programme search renders one day per POST as a table: every row
// carries a clock cell, a channel-scoped programme link and an optional
// synopsis. No dates, no end times.
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr[bgcolor]").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a.black").unwrap());
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static SYNOPSIS: Lazy<Selector> = Lazy::new(|| Selector::parse("font").unwrap());
static CHID: Lazy<Regex> = Lazy::new(|| Regex::new(r"chid=(\d+)").unwrap());

fn element_text(el: ElementRef<'_>) -> String {
    squish(&el.text().collect::<String>())
}

pub struct Ert {
    mapping: ChannelMap,
    mode: Mode,
}

enum Mode {
    Http(HttpSource),
    Fixture(String),
}

impl Ert {
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

    fn process(
        &self,
        cursors: &mut CursorMap,
        date: NaiveDate,
        row: ElementRef<'_>,
    ) -> Option<GuideItem> {
        let link = row.select(&LINK).next()?;
        let chid = CHID
            .captures(link.value().attr("href").unwrap_or_default())?
            .get(1)?
            .as_str();
        let (id, name) = self.mapping.get(chid)?;

        let clock = parse_clock(&element_text(row.select(&CELL).next()?))?;
        let cursor = cursors
            .entry(chid.to_string())
            .or_insert_with(|| DayCursor::new(date));
        let start = at_athens(cursor.advance(clock), clock);

        let title = element_text(link);
        if title.is_empty() {
            return None;
        }
        let desc = row
            .select(&SYNOPSIS)
            .next()
            .map(element_text)
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
                stop: start,
                title,
                desc,
            },
        })
    }
}

#[async_trait]
impl Provider for Ert {
    fn name(&self) -> &'static str {
        "ert"
    }

    fn mapping(&self) -> &ChannelMap {
        &self.mapping
    }

    async fn fetch(&self, date: NaiveDate) -> Result<String> {
        match &self.mode {
            Mode::Fixture(s) => Ok(s.clone()),
            Mode::Http(src) => {
                src.post_form(&[
                    ("frmDates", date.format("%j").to_string()),
                    ("frmChannels", String::new()),
                    ("frmSearch", String::new()),
                    ("x", "14".to_string()),
                    ("y", "6".to_string()),
                ])
                .await
            }
        }
    }

    fn extract(&self, date: NaiveDate, payload: &str) -> Vec<GuideItem> {
        let t0 = std::time::Instant::now();
        let doc = Html::parse_document(payload);

        // Cursor per channel, alive for this grid only.
        let mut cursors = CursorMap::new();
        let items: Vec<GuideItem> = doc
            .select(&ROW)
            .filter_map(|row| self.process(&mut cursors, date, row))
            .collect();

        histogram!("guide_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("guide_events_total").increment(items.len() as u64);
        items
    }

    fn finish(&self, items: Vec<GuideItem>) -> Vec<GuideItem> {
        backfill_stops(items)
    }
}
