//! Rendering engine configuration.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Rendering engine configuration (`[browser]` section).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserEngineConfig {
    /// Use the rendering engine for allow-listed sites.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Run in headless mode (default: true).
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to existing browser instead of launching one.
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Navigation timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Quiescence delay after load, in milliseconds.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// URL patterns blocked in rendered pages (images, fonts, media).
    #[serde(default = "default_blocked_resources")]
    pub blocked_resources: Vec<String>,
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            headless: default_headless(),
            remote_url: None,
            timeout_secs: default_timeout(),
            settle_ms: default_settle_ms(),
            chrome_args: Vec::new(),
            blocked_resources: default_blocked_resources(),
        }
    }
}

pub fn default_enabled() -> bool {
    true
}

pub fn default_headless() -> bool {
    true
}

pub fn default_timeout() -> u64 {
    15
}

pub fn default_settle_ms() -> u64 {
    3000
}

pub fn default_blocked_resources() -> Vec<String> {
    [
        "png", "jpg", "jpeg", "gif", "svg", "webp", "woff", "woff2", "ttf", "mp4", "webm",
    ]
    .iter()
    .map(|ext| format!("*.{ext}*"))
    .collect()
}

impl BrowserEngineConfig {
    /// Upper bound on one rendered fetch: navigation, settle delay and
    /// content read.
    pub fn render_budget(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.saturating_mul(2))
            + Duration::from_millis(self.settle_ms)
    }

    /// Apply `BROWSER_URL` and `DEALCRAWL_NO_BROWSER`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var("BROWSER_URL") {
            if !url.is_empty() {
                self.remote_url = Some(url);
            }
        }

        if env::var("DEALCRAWL_NO_BROWSER")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
        {
            self.enabled = false;
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BrowserEngineConfig::default();
        assert!(config.enabled);
        assert!(config.headless);
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.settle_ms, 3000);
        assert!(config.blocked_resources.contains(&"*.woff2*".to_string()));
        assert_eq!(config.blocked_resources.len(), 11);
    }

    #[test]
    fn test_render_budget() {
        let config = BrowserEngineConfig::default();
        assert_eq!(config.render_budget(), Duration::from_secs(33));
    }

    #[test]
    fn test_partial_toml() {
        let config: BrowserEngineConfig =
            toml::from_str("remote_url = \"ws://localhost:9222\"\nsettle_ms = 500").unwrap();
        assert_eq!(config.remote_url.as_deref(), Some("ws://localhost:9222"));
        assert_eq!(config.settle_ms, 500);
        assert_eq!(config.timeout_secs, 15);
        assert!(config.enabled);
    }
}
