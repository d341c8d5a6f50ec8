// src/playlist.rs
//
// Companion playlist generator: pairs the curated channel list with stream
// URLs in M3U form, pointing players at the published guide for EPG data.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::guide::config::ChannelEntry;

pub const TVG_URL: &str =
    "https://github.com/lumlich/tvguide-aggregator/releases/download/epg/tvguide.xml.gz";
pub const LOGO_BASE_URL: &str =
    "https://raw.githubusercontent.com/lumlich/tvguide-aggregator/master";
pub const GROUP_TITLE: &str = "Greece";

/// Render the playlist. Channels without a stream URL are left out.
pub fn render(channels: &[ChannelEntry]) -> String {
    let mut out = format!("#EXTM3U url-tvg=\"{TVG_URL}\"\n");

    for ch in channels {
        let Some(stream) = ch.m3u.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            continue;
        };
        let logo = ch
            .logo
            .as_deref()
            .map(|l| format!("{LOGO_BASE_URL}/logos/{l}"))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "#EXTINF:-1 group-title=\"{GROUP_TITLE}\" tvg-name=\"{}\" tvg-logo=\"{}\",{}",
            ch.name.trim(),
            logo,
            ch.title.trim()
        );
        out.push_str(stream);
        out.push('\n');
    }

    out
}

pub fn write_playlist(path: &Path, channels: &[ChannelEntry]) -> Result<()> {
    std::fs::write(path, render(channels))
        .with_context(|| format!("writing playlist to {}", path.display()))
}
