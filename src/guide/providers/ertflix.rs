// src/guide/providers/ertflix.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};
use metrics::{counter, histogram};
use serde::Deserialize;
use serde_json::json;

use crate::guide::config::{at_athens, athens, ProviderConfig};
use crate::guide::fetch::HttpSource;
use crate::guide::squish;
use crate::guide::types::{ChannelMap, ChannelRef, GuideItem, Programme, Provider};

/// Ertflix resolves a schedule in two round trips: the first request lists
/// the tile ids scheduled in a date range, the second resolves those ids to
/// full tile details. Channels are keyed by codename.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TileListing {
    #[serde(default)]
    tiles: Vec<TileRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TileRef {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TileDetails {
    #[serde(default)]
    tiles: Vec<Tile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Tile {
    channel_codename: Option<String>,
    start: Option<String>, // RFC 3339
    end: Option<String>,
    title: Option<String>,
    description: Option<String>,
}

fn parse_iso(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&athens()))
}

pub struct Ertflix {
    mapping: ChannelMap,
    mode: Mode,
}

enum Mode {
    Http(HttpSource),
    /// (listing payload, tile-details payload) pair; the id chaining still
    /// runs against the listing.
    Fixture(String, String),
}

impl Ertflix {
    pub fn from_config(cfg: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            mapping: cfg.mapping.clone(),
            mode: Mode::Http(HttpSource::new(cfg)?),
        })
    }

    pub fn from_fixture(mapping: ChannelMap, listing: &str, tiles: &str) -> Self {
        Self {
            mapping,
            mode: Mode::Fixture(listing.to_string(), tiles.to_string()),
        }
    }

    fn tile_ids(listing: &str) -> Result<Vec<String>> {
        let parsed: TileListing =
            serde_json::from_str(listing).context("parsing ertflix tile listing")?;
        Ok(parsed.tiles.into_iter().filter_map(|t| t.id).collect())
    }

    fn parse(payload: &str) -> Vec<Tile> {
        match serde_json::from_str::<TileDetails>(payload) {
            Ok(details) => details.tiles,
            Err(e) => {
                tracing::warn!(error = ?e, provider = "ertflix", "unparsable payload, skipping date");
                Vec::new()
            }
        }
    }

    fn process(&self, tile: Tile) -> Option<GuideItem> {
        let (id, name) = self.mapping.get(tile.channel_codename.as_deref()?)?;

        let start = parse_iso(tile.start.as_deref()?)?;
        let stop = parse_iso(tile.end.as_deref()?)?;
        if stop <= start {
            return None;
        }

        let title = squish(tile.title.as_deref()?);
        if title.is_empty() {
            return None;
        }
        let desc = tile
            .description
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
impl Provider for Ertflix {
    fn name(&self) -> &'static str {
        "ertflix"
    }

    fn mapping(&self) -> &ChannelMap {
        &self.mapping
    }

    async fn fetch(&self, date: NaiveDate) -> Result<String> {
        let midnight = NaiveTime::from_hms_opt(0, 0, 0).expect("valid time");
        let from = at_athens(date, midnight);
        let to = from + Duration::days(1);

        match &self.mode {
            Mode::Fixture(listing, tiles) => {
                let ids = Self::tile_ids(listing)?;
                if ids.is_empty() {
                    return Ok(r#"{"Tiles":[]}"#.to_string());
                }
                Ok(tiles.clone())
            }
            Mode::Http(src) => {
                let listing = src
                    .post_json(
                        "/EpgTile/FilterProgramTiles",
                        &json!({
                            "ChannelCodenames": self.mapping.keys().collect::<Vec<_>>(),
                            "From": from.to_rfc3339(),
                            "To": to.to_rfc3339(),
                        }),
                    )
                    .await?;
                let ids = Self::tile_ids(&listing)?;
                if ids.is_empty() {
                    return Ok(r#"{"Tiles":[]}"#.to_string());
                }
                src.post_json("/Tile/GetTiles", &json!({ "Ids": ids })).await
            }
        }
    }

    fn extract(&self, _date: NaiveDate, payload: &str) -> Vec<GuideItem> {
        let t0 = std::time::Instant::now();
        let items: Vec<GuideItem> = Self::parse(payload)
            .into_iter()
            .filter_map(|t| self.process(t))
            .collect();
        histogram!("guide_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("guide_events_total").increment(items.len() as u64);
        items
    }
}
