//! Which sites need a rendering engine to expose their content.

use url::Url;

/// Retailers whose storefronts are rendered client-side.
pub const DEFAULT_RENDER_DOMAINS: &[&str] = &[
    "zara.com",
    "hm.com",
    "nike.com",
    "cos.com",
    "stories.com",
    "weekday.com",
    "arket.com",
    "monki.com",
    "mango.com",
    "hugoboss.com",
    "filippa-k.com",
    "uniqlo.com",
];

/// Static allow-list of domains fetched with the rendering engine.
///
/// A domain matches itself and any subdomain: `zara.com` covers
/// `www.zara.com` but not `notzara.com`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPolicy {
    domains: Vec<String>,
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RENDER_DOMAINS.iter().map(|d| d.to_string()))
    }
}

impl RenderPolicy {
    pub fn new(domains: impl IntoIterator<Item = String>) -> Self {
        Self {
            domains: domains
                .into_iter()
                .map(|d| d.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    pub fn prefers_rendering(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        self.domains.iter().any(|d| {
            host == *d
                || host
                    .strip_suffix(d.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_matches_domain_and_subdomains() {
        let policy = RenderPolicy::default();
        assert!(policy.prefers_rendering(&url("https://www.zara.com/fi/")));
        assert!(policy.prefers_rendering(&url("https://hm.com/")));
        assert!(policy.prefers_rendering(&url("https://WWW2.HM.COM/fi_fi/sale")));
    }

    #[test]
    fn test_rejects_lookalike_hosts() {
        let policy = RenderPolicy::default();
        assert!(!policy.prefers_rendering(&url("https://notzara.com/")));
        assert!(!policy.prefers_rendering(&url("https://zara.com.example/")));
        assert!(!policy.prefers_rendering(&url("https://kauppa.example/")));
    }

    #[test]
    fn test_custom_list_normalized() {
        let policy = RenderPolicy::new(vec![" .Kauppa.Example ".to_string(), String::new()]);
        assert!(policy.prefers_rendering(&url("https://shop.kauppa.example/")));
        assert!(!policy.prefers_rendering(&url("https://zara.com/")));
    }
}
