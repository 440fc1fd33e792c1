//! Routing config file (TOML). Every key is optional:
//!
//! ```toml
//! setup = "producer"
//! arch_height = 0.3
//! cable_points = 48
//! ```

use std::path::Path;

use anyhow::Context;
use rig_core::RoutingParams;

pub fn load(path: &Path) -> anyhow::Result<RoutingParams> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading routing config {}", path.display()))?;
    parse(&text).with_context(|| format!("parsing routing config {}", path.display()))
}

pub fn parse(text: &str) -> anyhow::Result<RoutingParams> {
    let params: RoutingParams = toml::from_str(text)?;
    if params.cable_points < 2 {
        anyhow::bail!("cable_points must be at least 2, got {}", params.cable_points);
    }
    if !(params.arch_height.is_finite() && params.channel_arch_step.is_finite()) {
        anyhow::bail!("arch heights must be finite");
    }
    Ok(params)
}
