//! Shared helper functions for CLI commands.

use std::path::Path;

use anyhow::Context;
use serde::Serialize;

/// Truncate a string for table display, appending "..." when cut.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Pretty JSON to `path`, or to stdout when `path` is `None`.
pub async fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize result")?;
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            tokio::fs::write(path, json + "\n")
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => println!("{json}"),
    }
    Ok(())
}
