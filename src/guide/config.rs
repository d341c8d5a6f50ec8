// src/guide/config.rs
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};

use crate::guide::types::ChannelMap;

const ENV_GUIDE_PATH: &str = "TVGUIDE_CONFIG_PATH";
const ENV_CHANNELS_PATH: &str = "TVGUIDE_CHANNELS_PATH";

/// Language attribute on XMLTV text nodes.
pub const LOCALE: &str = "el";

/// Athens wall clock as a fixed offset; the wire format wants a positional
/// `+0300`, not a DST-aware zone.
pub fn athens() -> FixedOffset {
    FixedOffset::east_opt(3 * 3600).expect("offset in range")
}

/// A naive local date+time pinned to the Athens offset.
pub fn at_athens(date: NaiveDate, time: NaiveTime) -> DateTime<FixedOffset> {
    athens()
        .from_local_datetime(&date.and_time(time))
        .single()
        .expect("fixed offset has no ambiguous local times")
}

/// Static-source programme entry, given literally in the config block.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct StaticEntry {
    pub id: String,
    pub start: String, // "HH:MM"
    pub end: String,   // "HH:MM"
    pub title: String,
    #[serde(default)]
    pub desc: Option<String>,
}

/// One provider's static configuration block.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub mapping: ChannelMap,
    #[serde(default)]
    pub programme: Vec<StaticEntry>,
}

/// Whole guide configuration, keyed by provider name.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct GuideConfig {
    #[serde(flatten)]
    providers: BTreeMap<String, ProviderConfig>,
}

impl GuideConfig {
    /// A missing block is a configuration error, caught before any network
    /// activity for that provider.
    pub fn provider(&self, name: &str) -> Result<&ProviderConfig> {
        self.providers
            .get(name)
            .ok_or_else(|| anyhow!("missing provider config block: {name}"))
    }
}

/// Load guide config from an explicit path. Supports JSON or TOML.
pub fn load_guide_config_from(path: &Path) -> Result<GuideConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading guide config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if ext == "toml" {
        toml::from_str(&content).context("parsing guide config toml")
    } else {
        serde_json::from_str(&content).context("parsing guide config json")
    }
}

/// Load guide config using env var + fallbacks:
/// 1) $TVGUIDE_CONFIG_PATH
/// 2) config/tvguide.json
/// 3) config/tvguide.toml
pub fn load_guide_config() -> Result<GuideConfig> {
    if let Ok(p) = std::env::var(ENV_GUIDE_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_guide_config_from(&pb);
        }
        return Err(anyhow!("TVGUIDE_CONFIG_PATH points to non-existent path"));
    }
    for candidate in ["config/tvguide.json", "config/tvguide.toml"] {
        let pb = PathBuf::from(candidate);
        if pb.exists() {
            return load_guide_config_from(&pb);
        }
    }
    Err(anyhow!("no guide config found under config/"))
}

/// One curated channel: guide identity plus playlist metadata.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ChannelEntry {
    pub title: String,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub web: Option<String>,
    #[serde(default)]
    pub m3u: Option<String>,
}

/// Load the curated channel list from an explicit path (JSON array).
pub fn load_channels_from(path: &Path) -> Result<Vec<ChannelEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading channel list from {}", path.display()))?;
    serde_json::from_str(&content).context("parsing channel list json")
}

/// Load the curated channel list using env var + fallback:
/// 1) $TVGUIDE_CHANNELS_PATH
/// 2) config/channels.json
pub fn load_channels() -> Result<Vec<ChannelEntry>> {
    if let Ok(p) = std::env::var(ENV_CHANNELS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_channels_from(&pb);
        }
        return Err(anyhow!("TVGUIDE_CHANNELS_PATH points to non-existent path"));
    }
    load_channels_from(Path::new("config/channels.json"))
}

/// Ordered allow-list of channel names: trimmed, empties dropped, first
/// occurrence wins.
pub fn allow_list(entries: &[ChannelEntry]) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    let mut out = Vec::with_capacity(entries.len());
    for e in entries {
        let name = e.name.trim();
        if !name.is_empty() && seen.insert(name.to_string()) {
            out.push(name.to_string());
        }
    }
    out
}
