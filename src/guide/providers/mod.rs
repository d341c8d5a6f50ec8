// src/guide/providers/mod.rs
pub mod cosmote;
pub mod digea;
pub mod ert;
pub mod ertflix;
pub mod statics;
pub mod vouli;

use anyhow::Result;

use crate::guide::config::GuideConfig;
use crate::guide::types::Provider;

/// The closed set of upstream sources, constructed up front in a fixed
/// order. Registration order decides which name wins when two sources emit
/// the same channel id.
pub fn registry(cfg: &GuideConfig) -> Result<Vec<Box<dyn Provider>>> {
    Ok(vec![
        Box::new(digea::Digea::from_config(cfg.provider("digea")?)?),
        Box::new(cosmote::Cosmote::from_config(cfg.provider("cosmote")?)?),
        Box::new(ertflix::Ertflix::from_config(cfg.provider("ertflix")?)?),
        Box::new(statics::StaticSource::from_config(cfg.provider("static")?)),
        Box::new(ert::Ert::from_config(cfg.provider("ert")?)?),
        Box::new(vouli::Vouli::from_config(cfg.provider("vouli")?)?),
    ])
}
