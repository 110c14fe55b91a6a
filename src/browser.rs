//! Browser abstraction for the directions-page scrape.
//!
//! Defines the `BrowserLauncher`/`DirectionsBrowser`/`DirectionsPage` traits
//! that abstract over the browser engine (currently Chromium via
//! chromiumoxide), so the crawl driver can be exercised against a fake in
//! tests and the release invariant stays provable without a real browser.

use crate::error::{Error, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. PENDLER_CHROMIUM_PATH env
    if let Ok(p) = std::env::var(crate::config::CHROMIUM_PATH_ENV) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.pendler/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = [
            home.join(".pendler/chromium/chrome-linux64/chrome"),
            home.join(".pendler/chromium/chrome"),
        ];
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common container location
    let common = PathBuf::from("/usr/bin/chromium");
    if common.exists() {
        return Some(common);
    }

    None
}

/// Launches one exclusive browser instance per crawl invocation.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn DirectionsBrowser>>;
}

/// An exclusive browser session. Closed exactly once per crawl, on every
/// exit path.
#[async_trait]
pub trait DirectionsBrowser: Send + Sync {
    /// Open the single page used by this crawl.
    async fn new_page(&self) -> Result<Box<dyn DirectionsPage>>;
    /// Release the browser. Consumes the session so a second close cannot
    /// compile.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// The one page of a crawl session.
#[async_trait]
pub trait DirectionsPage: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;
    /// Click the first element matching the XPath expression, if any.
    /// Returns whether a click happened; absence is not an error.
    async fn click_first(&self, xpath: &str) -> Result<bool>;
    /// Poll until the CSS selector matches. The caller bounds this with its
    /// own deadline; this method polls indefinitely.
    async fn wait_for_selector(&self, selector: &str) -> Result<()>;
    /// Evaluate JavaScript in the page and return the JSON result.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;
}

/// Chromium launcher used in production.
pub struct ChromiumLauncher;

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn DirectionsBrowser>> {
        let chrome_path = find_chromium().ok_or_else(|| {
            Error::Navigation(format!(
                "Chromium not found. Set {} or install chromium",
                crate::config::CHROMIUM_PATH_ENV
            ))
        })?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .window_size(1024, 768)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(|e| Error::Navigation(format!("failed to build browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::Navigation(format!("failed to launch Chromium: {e}")))?;

        // Drain CDP events for the lifetime of the session.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Box::new(ChromiumBrowser {
            browser,
            handler_task,
        }))
    }
}

/// A launched Chromium instance plus its event-drain task.
pub struct ChromiumBrowser {
    browser: Browser,
    handler_task: tokio::task::JoinHandle<()>,
}

#[async_trait]
impl DirectionsBrowser for ChromiumBrowser {
    async fn new_page(&self) -> Result<Box<dyn DirectionsPage>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| Error::Navigation(format!("failed to create page: {e}")))?;
        Ok(Box::new(ChromiumPage { page }))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let ChromiumBrowser {
            mut browser,
            handler_task,
        } = *self;
        let _ = browser.close().await;
        let _ = browser.wait().await;
        handler_task.abort();
        Ok(())
    }
}

/// A single Chromium page.
pub struct ChromiumPage {
    page: Page,
}

#[async_trait]
impl DirectionsPage for ChromiumPage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| Error::Navigation(format!("goto {url}: {e}")))?;
        Ok(())
    }

    async fn click_first(&self, xpath: &str) -> Result<bool> {
        let script = format!(
            "(() => {{
                const hit = document.evaluate('{xpath}', document, null,
                    XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;
                if (hit) {{ hit.click(); return true; }}
                return false;
            }})()"
        );
        Ok(self.evaluate(&script).await?.as_bool().unwrap_or(false))
    }

    async fn wait_for_selector(&self, selector: &str) -> Result<()> {
        let probe = format!("!!document.querySelector('{selector}')");
        loop {
            if self.evaluate(&probe).await?.as_bool().unwrap_or(false) {
                return Ok(());
            }
            tokio::time::sleep(std::time::Duration::from_millis(250)).await;
        }
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| Error::Extraction(format!("evaluate: {e}")))?;
        result
            .into_value()
            .map_err(|e| Error::Extraction(format!("evaluate result: {e:?}")))
    }
}
