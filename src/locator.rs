// src/locator.rs
// Resilient element location: bounded wait-and-scroll cycles against slow or
// lazily-rendered pages, with a best-effort diagnostic screenshot on
// exhaustion keyed by the active correlation id.

use crate::browser::{Page, Selector};
use crate::correlation::CorrelationId;
use crate::error::ScrapeError;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_SCREENSHOT_DIR: &str = "SCREENSHOT_DIR";
const DEFAULT_SCREENSHOT_DIR: &str = "error_screenshots";

#[derive(Debug, Clone, Copy)]
pub struct LocatorOptions {
    pub max_attempts: u32,
    /// Viewport nudge between attempts, in pixels.
    pub scroll_step: u32,
    pub attempt_timeout: Duration,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            scroll_step: 500,
            attempt_timeout: Duration::from_secs(1),
        }
    }
}

fn screenshot_dir() -> PathBuf {
    std::env::var(ENV_SCREENSHOT_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SCREENSHOT_DIR))
}

/// Wait for `selector` and return its inner HTML, scrolling the viewport
/// forward after each timed-out attempt. Exhaustion yields `ElementNotFound`
/// with the selector, page URL and correlation id attached; the diagnostic
/// capture is attempted but its own failure never replaces that error.
pub async fn fetch_element_inner_html(
    page: &dyn Page,
    selector: &Selector,
    opts: LocatorOptions,
    cid: &CorrelationId,
) -> Result<String, ScrapeError> {
    for attempt in 1..=opts.max_attempts {
        match page.wait_for(selector, opts.attempt_timeout).await {
            Ok(true) => {
                if let Ok(Some(html)) = page.inner_html(selector).await {
                    tracing::debug!(
                        target: "locator",
                        correlation_id = %cid,
                        selector = %selector,
                        attempt,
                        "element located"
                    );
                    return Ok(html);
                }
            }
            Ok(false) => {}
            Err(e) => {
                tracing::debug!(
                    target: "locator",
                    correlation_id = %cid,
                    selector = %selector,
                    error = %e,
                    "wait attempt failed"
                );
            }
        }
        if let Err(e) = page.scroll_by(opts.scroll_step).await {
            tracing::debug!(target: "locator", correlation_id = %cid, error = %e, "scroll failed");
        }
    }

    let url = page.current_url().await;
    capture_diagnostic(page, cid).await;
    tracing::error!(
        target: "locator",
        correlation_id = %cid,
        selector = %selector,
        page_url = %url,
        attempts = opts.max_attempts,
        "element not found after scroll retries"
    );
    Err(ScrapeError::ElementNotFound {
        selector: selector.to_string(),
        url,
        correlation_id: cid.to_string(),
    })
}

/// Best-effort screenshot of the page at failure time, written to
/// `<screenshot_dir>/<correlation_id>.png`.
async fn capture_diagnostic(page: &dyn Page, cid: &CorrelationId) {
    let dir = screenshot_dir();
    let path = dir.join(format!("{cid}.png"));
    match page.screenshot().await {
        Ok(bytes) => {
            if let Err(e) = write_screenshot(&dir, &path, &bytes).await {
                tracing::warn!(
                    target: "locator",
                    correlation_id = %cid,
                    error = %e,
                    "failed to write diagnostic screenshot"
                );
            } else {
                tracing::info!(
                    target: "locator",
                    correlation_id = %cid,
                    screenshot = %path.display(),
                    "diagnostic screenshot captured"
                );
            }
        }
        Err(e) => {
            tracing::warn!(
                target: "locator",
                correlation_id = %cid,
                error = %e,
                "failed to capture diagnostic screenshot"
            );
        }
    }
}

async fn write_screenshot(dir: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(path, bytes).await
}
