use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Rules text posted by the `suggestionsrules` command.
pub const SUGGESTION_RULES: &str = "text/suggestions.md";
/// Thumbnail attached to verdict announcements.
pub const ALERT_ICON: &str = "img/alert.png";

/// Read-only, file-backed text and image content.
pub struct StaticAssets {
    root: PathBuf,
}

impl StaticAssets {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self, asset: &str) -> PathBuf {
        self.root.join(asset)
    }

    pub async fn read_text(&self, asset: &str) -> Result<String> {
        let path = self.path(asset);
        fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read static asset {}", path.display()))
    }
}
