//! TV Guide Aggregator — Binary Entrypoint
//! Runs the multi-source EPG pipeline and writes `tvguide.xml`, or the
//! companion playlist generator (`playlist` argument) for `playlist.m3u`.

use std::path::Path;

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tvguide_aggregator::{guide, playlist};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tvguide_aggregator=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

async fn generate_guide() -> Result<()> {
    let cfg = guide::config::load_guide_config()?;
    let entries = guide::config::load_channels()?;
    let allow = guide::config::allow_list(&entries);

    let providers = guide::providers::registry(&cfg)?;
    let items = guide::run_all(providers).await;
    let (channels, programmes) = guide::build_guide(&items, &allow);

    guide::xmltv::write_guide(Path::new("tvguide.xml"), &channels, &programmes)?;
    tracing::info!(
        channels = channels.len(),
        programmes = programmes.len(),
        "guide written"
    );
    Ok(())
}

fn generate_playlist() -> Result<()> {
    let entries = guide::config::load_channels()?;
    playlist::write_playlist(Path::new("playlist.m3u"), &entries)?;
    tracing::info!(channels = entries.len(), "playlist written");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op elsewhere.
    let _ = dotenvy::dotenv();
    init_tracing();

    match std::env::args().nth(1).as_deref() {
        Some("playlist") => generate_playlist(),
        _ => generate_guide().await,
    }
}
