//! User agent handling for page requests.

/// Desktop Chrome on Windows, the most common shopper profile.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default `Accept-Language`, biased toward Finnish.
pub const ACCEPT_LANGUAGE: &str = "fi-FI,fi;q=0.9,en;q=0.8";

/// Configured user agent, or the default desktop Chrome one.
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config.map(str::trim) {
        Some(custom) if !custom.is_empty() => custom.to_string(),
        _ => USER_AGENT.to_string(),
    }
}
