// src/browser/mod.rs
// Narrow browser automation surface. The pipeline depends only on these
// capabilities; any engine that can navigate, wait for a selector, read
// inner HTML, scroll, and screenshot is substitutable.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

pub use chromium::ChromiumBrowser;

/// How the browser presents itself to sources. This is the only concession
/// to anti-automation: no fingerprint games beyond launch arguments.
#[derive(Debug, Clone)]
pub struct BrowserProfile {
    pub headless: bool,
    pub user_agent: Option<String>,
    pub window_size: (u32, u32),
}

impl Default for BrowserProfile {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: None,
            window_size: (1440, 900),
        }
    }
}

/// Element selector understood by the automation surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Css(String),
    XPath(String),
}

impl Selector {
    pub fn css(s: impl Into<String>) -> Self {
        Self::Css(s.into())
    }

    pub fn xpath(s: impl Into<String>) -> Self {
        Self::XPath(s.into())
    }

    /// JS expression evaluating to the element's inner HTML, or null.
    pub(crate) fn read_js(&self) -> String {
        match self {
            Self::Css(css) => {
                let q = serde_json::Value::from(css.as_str());
                format!(
                    "(() => {{ const el = document.querySelector({q}); \
                     return el ? el.innerHTML : null; }})()"
                )
            }
            Self::XPath(xpath) => {
                let q = serde_json::Value::from(xpath.as_str());
                format!(
                    "(() => {{ const el = document.evaluate({q}, document, null, \
                     XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue; \
                     return el ? el.innerHTML : null; }})()"
                )
            }
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
        }
    }
}

/// A live browser able to hand out pages. Pages are never shared between
/// scrapers; each scrape owns its page exclusively for its lifetime.
#[async_trait]
pub trait Browser: Send + Sync {
    async fn open_page(&self) -> Result<Box<dyn Page>>;
}

/// One browser page/session.
#[async_trait]
pub trait Page: Send + Sync {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Wait up to `timeout` for the selector to resolve. `Ok(false)` is an
    /// ordinary miss, not an error.
    async fn wait_for(&self, selector: &Selector, timeout: Duration) -> Result<bool>;

    /// Inner HTML of the first match, or `None` when absent.
    async fn inner_html(&self, selector: &Selector) -> Result<Option<String>>;

    async fn scroll_by(&self, pixels: u32) -> Result<()>;

    /// PNG capture of the current viewport state.
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Current page URL, best-effort (diagnostics only).
    async fn current_url(&self) -> String;

    async fn close(self: Box<Self>);
}
