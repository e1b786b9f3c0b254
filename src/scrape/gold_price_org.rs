// src/scrape/gold_price_org.rs
// goldprice.org: gram price sits in a fixed table cell; the table footer
// carries a New-York-local timestamp like "Feb 3rd 2025, 04:12:45 PM NY time".

use super::{PriceObservation, PriceScraper, NAV_TIMEOUT};
use crate::browser::{Browser, Page, Selector};
use crate::catalog::SourceConfig;
use crate::correlation::CorrelationId;
use crate::error::ScrapeError;
use crate::locator::{fetch_element_inner_html, LocatorOptions};
use crate::normalize::{parse_price_text, parse_timestamp, TimestampRules, ZoneRule};
use chrono::Utc;
use std::sync::Arc;

const PRICE_XPATH: &str = "/html/body/main/div[2]/div/div/div[2]/div/article/div/div[3]/div[2]/div[1]/div/div/div/table/tbody/tr[2]/td[2]";
const TIME_XPATH: &str = "/html/body/main/div[2]/div/div/div[2]/div/article/div/div[3]/div[2]/div[1]/div/div/div/table/tfoot/tr/td/div";

const TIME_RULES: TimestampRules = TimestampRules {
    format: "%b %d %Y, %I:%M:%S %p",
    zone: ZoneRule::Fixed(chrono_tz::America::New_York),
};

pub struct GoldPriceOrgScraper {
    site: String,
    browser: Arc<dyn Browser>,
    locator: LocatorOptions,
}

impl GoldPriceOrgScraper {
    pub fn new(cfg: SourceConfig, browser: Arc<dyn Browser>) -> Self {
        Self {
            site: cfg.site,
            browser,
            locator: LocatorOptions::default(),
        }
    }

    pub fn with_locator_options(mut self, opts: LocatorOptions) -> Self {
        self.locator = opts;
        self
    }

    async fn scrape_page(
        &self,
        page: &dyn Page,
        cid: &CorrelationId,
    ) -> Result<PriceObservation, ScrapeError> {
        page.navigate(&self.site, NAV_TIMEOUT)
            .await
            .map_err(|e| ScrapeError::Navigation {
                url: self.site.clone(),
                cause: e.to_string(),
            })?;

        let price_text =
            fetch_element_inner_html(page, &Selector::xpath(PRICE_XPATH), self.locator, cid)
                .await?;
        let price = parse_price_text(&price_text).map_err(|e| ScrapeError::parse("price", e))?;

        // The site sometimes renders without the footer timestamp; substitute
        // the extraction instant rather than failing.
        let observed_at =
            match fetch_element_inner_html(page, &Selector::xpath(TIME_XPATH), self.locator, cid)
                .await
            {
                Ok(raw) => {
                    let cleaned = clean_time_text(&raw);
                    parse_timestamp(&cleaned, &TIME_RULES)
                        .map_err(|e| ScrapeError::parse("timestamp", e))?
                }
                Err(ScrapeError::ElementNotFound { .. }) => Utc::now(),
                Err(e) => return Err(e),
            };

        Ok(PriceObservation { price, observed_at })
    }
}

/// Strip the ordinal suffix and the trailing zone label the site appends.
fn clean_time_text(raw: &str) -> String {
    raw.replace("th", "")
        .replace("st", "")
        .replace("nd", "")
        .replace("rd", "")
        .replace(" NY time", "")
}

#[async_trait::async_trait]
impl PriceScraper for GoldPriceOrgScraper {
    async fn scrape(&self, cid: &CorrelationId) -> Result<PriceObservation, ScrapeError> {
        let page = self
            .browser
            .open_page()
            .await
            .map_err(|e| ScrapeError::Navigation {
                url: self.site.clone(),
                cause: e.to_string(),
            })?;
        let result = self.scrape_page(page.as_ref(), cid).await;
        page.close().await;
        result
    }

    fn name(&self) -> &'static str {
        "gold_price_org"
    }
}
