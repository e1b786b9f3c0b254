//! Chromium-backed automation surface using chromiumoxide (CDP).

use super::{Browser, BrowserProfile, Page, Selector};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig};
use chromiumoxide::page::{Page as CdpPage, ScreenshotParams};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const ENV_CHROMIUM_PATH: &str = "CHROMIUM_PATH";

/// Poll interval while waiting for a selector to resolve.
const WAIT_POLL: Duration = Duration::from_millis(100);

/// Find the Chromium binary: `$CHROMIUM_PATH`, then the system PATH.
pub fn find_chromium() -> Option<PathBuf> {
    if let Ok(p) = std::env::var(ENV_CHROMIUM_PATH) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }
    None
}

/// A launched headless Chromium instance handing out one page per scrape.
pub struct ChromiumBrowser {
    browser: CdpBrowser,
}

impl ChromiumBrowser {
    pub async fn launch(profile: &BrowserProfile) -> Result<Self> {
        let chrome_path = find_chromium()
            .context("Chromium not found; set CHROMIUM_PATH or install chromium")?;

        let (w, h) = profile.window_size;
        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg(format!("--window-size={w},{h}"));
        if profile.headless {
            builder = builder.arg("--headless=new");
        } else {
            builder = builder.with_head();
        }
        if let Some(ua) = &profile.user_agent {
            builder = builder.arg(format!("--user-agent={ua}"));
        }
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = CdpBrowser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Drive the CDP event stream for the lifetime of the browser.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self { browser })
    }
}

#[async_trait]
impl Browser for ChromiumBrowser {
    async fn open_page(&self) -> Result<Box<dyn Page>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;
        Ok(Box::new(ChromiumPage { page }))
    }
}

pub struct ChromiumPage {
    page: CdpPage,
}

#[async_trait]
impl Page for ChromiumPage {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        let result = tokio::time::timeout(timeout, self.page.goto(url)).await;
        match result {
            Ok(Ok(_)) => {
                let _ = self.page.wait_for_navigation().await;
                Ok(())
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {}ms", timeout.as_millis()),
        }
    }

    async fn wait_for(&self, selector: &Selector, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.inner_html(selector).await?.is_some() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(WAIT_POLL).await;
        }
    }

    async fn inner_html(&self, selector: &Selector) -> Result<Option<String>> {
        let result = self
            .page
            .evaluate(selector.read_js())
            .await
            .context("JS evaluation failed")?;
        result
            .into_value::<Option<String>>()
            .map_err(|e| anyhow::anyhow!("failed to convert JS result: {e:?}"))
    }

    async fn scroll_by(&self, pixels: u32) -> Result<()> {
        self.page
            .evaluate(format!("window.scrollBy(0, {pixels});"))
            .await
            .context("scroll failed")?;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
            .context("screenshot failed")
    }

    async fn current_url(&self) -> String {
        self.page
            .url()
            .await
            .unwrap_or_default()
            .map(|u| u.to_string())
            .unwrap_or_default()
    }

    async fn close(self: Box<Self>) {
        let _ = self.page.close().await;
    }
}
