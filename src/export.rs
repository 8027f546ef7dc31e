use crate::model::ResultView;
use anyhow::{Context, Result};
use std::path::Path;

/// Write the normalized result as pretty JSON, creating parent directories as needed.
pub fn export_json(path: &Path, view: &ResultView) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create export directory {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(view).context("serialize result")?;
    std::fs::write(path, body).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), "result exported");
    Ok(())
}
