// src/scrape/bullion_vault.rs
// bullionvault.com: the price table renders asynchronously after the initial
// page load, so the scrape polls it a bounded number of times. The row is
// found by its header label; the timestamp cell carries an optional
// `(GMT±HH:MM)` annotation.

use super::{PriceObservation, PriceScraper, NAV_TIMEOUT};
use crate::browser::{Browser, Page, Selector};
use crate::catalog::SourceConfig;
use crate::correlation::CorrelationId;
use crate::error::ScrapeError;
use crate::locator::{fetch_element_inner_html, LocatorOptions};
use crate::normalize::{parse_price_text, parse_timestamp, TimestampRules, ZoneRule};
use chrono::Utc;
use scraper::{Html, Selector as CssSelector};
use std::sync::Arc;
use std::time::Duration;

const TABLE_XPATH: &str = "/html/body/main/div[2]/div[3]/div[1]/div/div/div/table";
const GRAM_ROW_LABEL: &str = "Gold Price per Gram";

/// The table is polled until the price span is populated.
const POLL_ATTEMPTS: u32 = 10;
const DEFAULT_POLL_DELAY: Duration = Duration::from_secs(5);

const TIME_RULES: TimestampRules = TimestampRules {
    format: "%d %B %Y, %H:%M:%S",
    zone: ZoneRule::GmtAnnotation,
};

pub struct BullionVaultScraper {
    site: String,
    browser: Arc<dyn Browser>,
    locator: LocatorOptions,
    poll_delay: Duration,
}

impl BullionVaultScraper {
    pub fn new(cfg: SourceConfig, browser: Arc<dyn Browser>) -> Self {
        Self {
            site: cfg.site,
            browser,
            locator: LocatorOptions::default(),
            poll_delay: DEFAULT_POLL_DELAY,
        }
    }

    pub fn with_locator_options(mut self, opts: LocatorOptions) -> Self {
        self.locator = opts;
        self
    }

    pub fn with_poll_delay(mut self, delay: Duration) -> Self {
        self.poll_delay = delay;
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

        let table_selector = Selector::xpath(TABLE_XPATH);
        let mut found: Option<(String, Option<String>)> = None;
        for attempt in 1..=POLL_ATTEMPTS {
            match fetch_element_inner_html(page, &table_selector, self.locator, cid).await {
                Ok(table_html) => {
                    let (price, time) = find_price_and_time(&table_html);
                    if let Some(price) = price {
                        found = Some((price, time));
                        break;
                    }
                    tracing::debug!(
                        target: "scrape",
                        correlation_id = %cid,
                        attempt,
                        "price cell still empty"
                    );
                }
                // Table not rendered yet counts as an empty poll attempt.
                Err(ScrapeError::ElementNotFound { .. }) => {}
                Err(e) => return Err(e),
            }
            if attempt < POLL_ATTEMPTS {
                tokio::time::sleep(self.poll_delay).await;
            }
        }

        // Empty after every attempt is ordinary locator exhaustion, not a
        // distinct error kind.
        let Some((price_text, time_text)) = found else {
            return Err(ScrapeError::ElementNotFound {
                selector: table_selector.to_string(),
                url: page.current_url().await,
                correlation_id: cid.to_string(),
            });
        };

        let price = parse_price_text(&price_text).map_err(|e| ScrapeError::parse("price", e))?;
        let observed_at = match time_text {
            Some(t) => {
                parse_timestamp(&t, &TIME_RULES).map_err(|e| ScrapeError::parse("timestamp", e))?
            }
            None => Utc::now(),
        };

        Ok(PriceObservation { price, observed_at })
    }
}

/// Extract the gram price and timestamp texts from the live price table
/// markup. The price row is the one whose `<th>` carries the gram label;
/// the value sits in a span tagged with weight and currency attributes.
fn find_price_and_time(table_html: &str) -> (Option<String>, Option<String>) {
    // Table inner HTML only; re-wrap so the HTML5 parser keeps the rows.
    let doc = Html::parse_fragment(&format!("<table>{table_html}</table>"));
    let row_sel = CssSelector::parse("tr").expect("static selector");
    let th_sel = CssSelector::parse("th").expect("static selector");
    let span_sel =
        CssSelector::parse(r#"span[data-weight="G"][data-currency="USD"]"#).expect("static selector");
    let time_sel = CssSelector::parse("td.bullion-price-timestamp").expect("static selector");

    let mut price = None;
    for row in doc.select(&row_sel) {
        let labeled = row
            .select(&th_sel)
            .any(|th| th.text().collect::<String>().contains(GRAM_ROW_LABEL));
        if !labeled {
            continue;
        }
        if let Some(span) = row.select(&span_sel).next() {
            let text: String = span.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                price = Some(text);
            }
        }
        break;
    }

    let time = doc
        .select(&time_sel)
        .next()
        .map(|td| td.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());

    (price, time)
}

#[async_trait::async_trait]
impl PriceScraper for BullionVaultScraper {
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
        "bullion_vault"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"
        <tbody>
            <tr>
                <th>Gold Price per Ounce</th>
                <td><span data-weight="OZ" data-currency="USD">$3,110.35</span></td>
            </tr>
            <tr>
                <th>Gold Price per Gram</th>
                <td><span data-weight="G" data-currency="USD">$100.01</span></td>
            </tr>
        </tbody>
        <tfoot>
            <tr><td class="bullion-price-timestamp">14 March 2025, 12:30:05 (GMT+01:00)</td></tr>
        </tfoot>
    "#;

    #[test]
    fn finds_gram_row_and_timestamp() {
        let (price, time) = find_price_and_time(TABLE);
        assert_eq!(price.as_deref(), Some("$100.01"));
        assert_eq!(time.as_deref(), Some("14 March 2025, 12:30:05 (GMT+01:00)"));
    }

    #[test]
    fn empty_price_span_reads_as_missing() {
        let html = r#"
            <tr><th>Gold Price per Gram</th>
            <td><span data-weight="G" data-currency="USD"></span></td></tr>
        "#;
        let (price, time) = find_price_and_time(html);
        assert!(price.is_none());
        assert!(time.is_none());
    }

    #[test]
    fn ounce_row_alone_is_not_a_match() {
        let html = r#"
            <tr><th>Gold Price per Ounce</th>
            <td><span data-weight="OZ" data-currency="USD">$3,110.35</span></td></tr>
        "#;
        let (price, _) = find_price_and_time(html);
        assert!(price.is_none());
    }
}
