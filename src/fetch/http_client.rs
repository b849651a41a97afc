//! Plain HTTP GET strategy.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use super::user_agent::{resolve_user_agent, ACCEPT_LANGUAGE as DEFAULT_ACCEPT_LANGUAGE};
use super::HtmlSource;
use crate::config::FetchConfig;
use crate::error::FetchError;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// HTTP client presenting as a desktop browser.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let user_agent = resolve_user_agent(config.user_agent.as_deref());

        let accept_language = HeaderValue::from_str(&config.accept_language).unwrap_or_else(|_| {
            warn!(
                "Ignoring invalid accept_language {:?}",
                config.accept_language
            );
            HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE)
        });
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, accept_language);

        let client = Client::builder()
            .user_agent(&user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HtmlSource for HttpClient {
    async fn get_html(&self, url: &Url) -> Result<String, FetchError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }
}
