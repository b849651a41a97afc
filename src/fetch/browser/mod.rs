//! Rendered fetch strategy.
//!
//! Uses chromiumoxide (CDP). One browser is shared by the whole run; every
//! fetch gets its own browser context and page. The context is disposed
//! when the fetch returns, and also when the fetch future is dropped early
//! (e.g. by a per-site timeout).

mod config;

pub use config::BrowserEngineConfig;

use anyhow::Result;
use async_trait::async_trait;
use url::Url;

use super::Renderer;

#[cfg(feature = "browser")]
use std::future::Future;
#[cfg(feature = "browser")]
use std::sync::Arc;
#[cfg(feature = "browser")]
use std::time::Duration;

#[cfg(feature = "browser")]
use anyhow::Context;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, SetBlockedUrLsParams, SetUserAgentOverrideParams,
};
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::future::BoxFuture;
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use tokio::sync::Mutex;
#[cfg(feature = "browser")]
use tokio::task::JoinHandle;
#[cfg(feature = "browser")]
use tracing::{debug, info};

/// Headless Chrome renderer.
#[cfg(feature = "browser")]
pub struct BrowserRenderer {
    config: BrowserEngineConfig,
    user_agent: String,
    accept_language: String,
    browser: Arc<Mutex<Browser>>,
    handler: Mutex<Option<JoinHandle<()>>>,
    /// We launched the process (as opposed to attaching to a remote one).
    owned: bool,
}

#[cfg(feature = "browser")]
impl BrowserRenderer {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    /// Launch a local browser, or attach to `config.remote_url`.
    pub async fn launch(
        config: BrowserEngineConfig,
        user_agent: &str,
        accept_language: &str,
    ) -> Result<Self> {
        let (browser, handler, owned) = match config.remote_url.clone() {
            Some(remote_url) => {
                let (browser, handler) = Self::connect_remote(&remote_url, &config).await?;
                (browser, handler, false)
            }
            None => {
                let (browser, handler) = Self::launch_local(&config).await?;
                (browser, handler, true)
            }
        };

        Ok(Self {
            config,
            user_agent: user_agent.to_string(),
            accept_language: accept_language.to_string(),
            browser: Arc::new(Mutex::new(browser)),
            handler: Mutex::new(Some(handler)),
            owned,
        })
    }

    fn find_chrome() -> Result<std::path::PathBuf> {
        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path.is_empty() {
                        info!("Found Chrome in PATH: {}", path);
                        return Ok(std::path::PathBuf::from(path));
                    }
                }
            }
        }

        Err(anyhow::anyhow!(
            "Chrome/Chromium not found; install it or set BROWSER_URL to a remote browser"
        ))
    }

    async fn launch_local(config: &BrowserEngineConfig) -> Result<(Browser, JoinHandle<()>)> {
        info!("Launching browser (headless={})", config.headless);

        let chrome_path = Self::find_chrome()?;
        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .request_timeout(Duration::from_secs(config.timeout_secs));

        // with_head means NOT headless
        if !config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-software-rasterizer");

        for arg in &config.chrome_args {
            builder = builder.arg(arg);
        }

        let browser_config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .context("Failed to launch browser")?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok((browser, handle))
    }

    async fn connect_remote(
        url: &str,
        config: &BrowserEngineConfig,
    ) -> Result<(Browser, JoinHandle<()>)> {
        info!("Connecting to remote browser at {}", url);

        // WebSocket URL comes from the /json/version endpoint
        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let resp: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .timeout(Duration::from_secs(config.timeout_secs))
            .send()
            .await
            .context("Failed to connect to remote browser")?
            .json()
            .await
            .context("Failed to parse browser version info")?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("No webSocketDebuggerUrl in response"))?;

        debug!("Connecting to WebSocket: {}", ws_url);

        let handler_config = chromiumoxide::handler::HandlerConfig {
            request_timeout: Duration::from_secs(config.timeout_secs),
            ..Default::default()
        };

        let (browser, mut handler) = Browser::connect_with_config(ws_url, handler_config)
            .await
            .context("Failed to connect to remote browser")?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok((browser, handle))
    }

    /// Open an isolated context with a blank page in it. The returned
    /// [`Teardown`] disposes the context.
    async fn open_page(&self) -> Result<(Teardown, Page)> {
        let context_id = {
            let browser = self.browser.lock().await;
            browser
                .execute(CreateBrowserContextParams::default())
                .await
                .context("Failed to create browser context")?
                .result
                .browser_context_id
        };
        let teardown = Teardown::new(dispose_context(
            Arc::clone(&self.browser),
            context_id.clone(),
        ));

        let target = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context_id)
            .build()
            .map_err(|e| anyhow::anyhow!("Invalid target params: {}", e))?;
        let page = {
            let browser = self.browser.lock().await;
            browser.new_page(target).await.context("Failed to open page")?
        };
        Ok((teardown, page))
    }

    async fn load(&self, page: &Page, url: &Url) -> Result<String> {
        let user_agent = SetUserAgentOverrideParams::builder()
            .user_agent(self.user_agent.clone())
            .accept_language(self.accept_language.clone())
            .build()
            .map_err(|e| anyhow::anyhow!("Invalid user agent override: {}", e))?;
        page.execute(user_agent).await?;

        if !self.config.blocked_resources.is_empty() {
            page.execute(EnableParams::default()).await?;
            page.execute(SetBlockedUrLsParams::new(
                self.config.blocked_resources.clone(),
            ))
            .await?;
        }

        let timeout = Duration::from_secs(self.config.timeout_secs);
        tokio::time::timeout(timeout, page.goto(url.as_str()))
            .await
            .map_err(|_| anyhow::anyhow!("Timed out loading {}", url))?
            .with_context(|| format!("Navigation to {} failed", url))?;

        tokio::time::sleep(Duration::from_millis(self.config.settle_ms)).await;

        let html = tokio::time::timeout(timeout, page.content())
            .await
            .map_err(|_| anyhow::anyhow!("Timed out reading {}", url))??;
        Ok(html)
    }

    async fn try_render(&self, url: &Url) -> Result<String> {
        let (teardown, page) = self.open_page().await?;
        let result = self.load(&page, url).await;

        if let Err(e) = page.close().await {
            debug!("Closing page for {} failed: {}", url, e);
        }
        teardown.finish().await;

        result
    }
}

#[cfg(feature = "browser")]
async fn dispose_context(browser: Arc<Mutex<Browser>>, context_id: BrowserContextId) {
    let browser = browser.lock().await;
    if let Err(e) = browser
        .execute(DisposeBrowserContextParams::new(context_id))
        .await
    {
        debug!("Disposing browser context failed: {}", e);
    }
}

/// Cleanup that must run exactly once: awaited by [`Teardown::finish`], or
/// spawned onto the runtime if the owner is dropped first.
#[cfg(feature = "browser")]
struct Teardown {
    task: Option<BoxFuture<'static, ()>>,
}

#[cfg(feature = "browser")]
impl Teardown {
    fn new(task: impl Future<Output = ()> + Send + 'static) -> Self {
        Self {
            task: Some(Box::pin(task)),
        }
    }

    async fn finish(mut self) {
        if let Some(task) = self.task.take() {
            task.await;
        }
    }
}

#[cfg(feature = "browser")]
impl Drop for Teardown {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(task);
                }
                Err(_) => debug!("No runtime left to dispose browser context"),
            }
        }
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl Renderer for BrowserRenderer {
    async fn render(&self, url: &Url) -> Option<String> {
        let budget = self.config.render_budget();
        match tokio::time::timeout(budget, self.try_render(url)).await {
            Ok(Ok(html)) => {
                debug!("Rendered {} ({} bytes)", url, html.len());
                Some(html)
            }
            Ok(Err(e)) => {
                debug!("Rendered fetch of {} failed: {:#}", url, e);
                None
            }
            Err(_) => {
                debug!("Rendered fetch of {} exceeded {}s", url, budget.as_secs());
                None
            }
        }
    }

    async fn close(&self) {
        if self.owned {
            let mut browser = self.browser.lock().await;
            if let Err(e) = browser.close().await {
                debug!("Closing browser failed: {}", e);
            }
            let _ = browser.wait().await;
        }
        if let Some(handle) = self.handler.lock().await.take() {
            handle.abort();
        }
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
pub struct BrowserRenderer;

#[cfg(not(feature = "browser"))]
impl BrowserRenderer {
    pub async fn launch(
        _config: BrowserEngineConfig,
        _user_agent: &str,
        _accept_language: &str,
    ) -> Result<Self> {
        Err(anyhow::anyhow!(
            "Browser support not compiled. Rebuild with: cargo build --features browser"
        ))
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl Renderer for BrowserRenderer {
    async fn render(&self, _url: &Url) -> Option<String> {
        None
    }
}
