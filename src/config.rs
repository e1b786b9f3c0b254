// src/config.rs
// Process configuration from the environment. `.env` is loaded by the
// binary before this runs; every knob has a sensible default.

use crate::browser::BrowserProfile;
use crate::catalog;
use std::path::PathBuf;

const ENV_PRICES_PATH: &str = "PRICES_PATH";
const ENV_HEADLESS: &str = "BROWSER_HEADLESS";
const ENV_USER_AGENT: &str = "BROWSER_USER_AGENT";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog_path: PathBuf,
    /// Where successful observations are appended, JSON lines.
    pub prices_path: PathBuf,
    pub browser: BrowserProfile,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut browser = BrowserProfile::default();
        if let Ok(v) = std::env::var(ENV_HEADLESS) {
            browser.headless = v != "0";
        }
        if let Ok(ua) = std::env::var(ENV_USER_AGENT) {
            if !ua.is_empty() {
                browser.user_agent = Some(ua);
            }
        }
        Self {
            catalog_path: catalog::default_path(),
            prices_path: std::env::var(ENV_PRICES_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/prices.jsonl")),
            browser,
        }
    }
}
