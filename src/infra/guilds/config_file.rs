use crate::core::guilds::GuildsConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Load the per-community configuration from a JSON file.
///
/// A missing file is an empty configuration; a malformed one is an error.
pub fn load_guilds_config(path: impl AsRef<Path>) -> Result<GuildsConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "No guild configuration at {}, every community is unconfigured",
            path.display()
        );
        return Ok(GuildsConfig::default());
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read guild configuration {}", path.display()))?;
    let config: GuildsConfig = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse guild configuration {}", path.display()))?;

    tracing::info!(guilds = config.guilds.len(), "Loaded guild configuration");
    Ok(config)
}
