// src/guide/xmltv.rs
use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::escape::escape;

use crate::guide::config::LOCALE;
use crate::guide::types::{ChannelRef, Programme};

pub const GENERATOR_NAME: &str = "tvguide-aggregator";
pub const GENERATOR_URL: &str = "https://github.com/lumlich/tvguide-aggregator";

/// Positional wire format downstream EPG consumers parse, e.g.
/// `20250301200000 +0300`.
pub const WIRE_TIME_FORMAT: &str = "%Y%m%d%H%M%S %z";

/// Render the XMLTV document: channels first, then programmes, both in
/// input order.
pub fn render(channels: &[ChannelRef], programmes: &[Programme]) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<!DOCTYPE tv SYSTEM \"xmltv.dtd\">\n");
    let _ = writeln!(
        out,
        "<tv generator-info-name=\"{GENERATOR_NAME}\" generator-info-url=\"{GENERATOR_URL}\">"
    );

    for ch in channels {
        let _ = writeln!(out, "  <channel id=\"{}\">", escape(&ch.id));
        let _ = writeln!(
            out,
            "    <display-name lang=\"{LOCALE}\">{}</display-name>",
            escape(&ch.name)
        );
        out.push_str("  </channel>\n");
    }

    for pr in programmes {
        let _ = writeln!(
            out,
            "  <programme start=\"{}\" stop=\"{}\" channel=\"{}\">",
            pr.start.format(WIRE_TIME_FORMAT),
            pr.stop.format(WIRE_TIME_FORMAT),
            escape(&pr.channel)
        );
        let _ = writeln!(out, "    <title lang=\"{LOCALE}\">{}</title>", escape(&pr.title));
        let _ = writeln!(out, "    <desc>{}</desc>", escape(&pr.desc));
        out.push_str("  </programme>\n");
    }

    out.push_str("</tv>\n");
    out
}

pub fn write_guide(path: &Path, channels: &[ChannelRef], programmes: &[Programme]) -> Result<()> {
    std::fs::write(path, render(channels, programmes))
        .with_context(|| format!("writing guide to {}", path.display()))
}
