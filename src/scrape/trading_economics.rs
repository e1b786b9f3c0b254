// src/scrape/trading_economics.rs
// tradingeconomics.com: the commodities table quotes gold per troy ounce;
// the row is keyed by its instrument symbol. The page exposes no observation
// timestamp, so the extraction instant stands in for it.

use super::{PriceObservation, PriceScraper, NAV_TIMEOUT};
use crate::browser::{Browser, Page, Selector};
use crate::catalog::SourceConfig;
use crate::correlation::CorrelationId;
use crate::error::ScrapeError;
use crate::locator::{fetch_element_inner_html, LocatorOptions};
use crate::normalize::{convert_oz_price_to_gram, parse_price_text};
use chrono::Utc;
use scraper::{Html, Selector as CssSelector};
use std::sync::Arc;

const TABLE_XPATH: &str = "/html/body/form/div[5]/div/div[1]/div[4]/div/div/table";
const GOLD_SYMBOL: &str = "XAUUSD:CUR";

pub struct TradingEconomicsScraper {
    site: String,
    browser: Arc<dyn Browser>,
    locator: LocatorOptions,
}

impl TradingEconomicsScraper {
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

        let table_html =
            fetch_element_inner_html(page, &Selector::xpath(TABLE_XPATH), self.locator, cid)
                .await?;

        let price_text = find_gold_price_in_table(&table_html).ok_or_else(|| {
            ScrapeError::parse("commodities table", format!("no {GOLD_SYMBOL} price cell"))
        })?;
        let oz_price =
            parse_price_text(&price_text).map_err(|e| ScrapeError::parse("price", e))?;

        Ok(PriceObservation {
            price: convert_oz_price_to_gram(oz_price),
            observed_at: Utc::now(),
        })
    }
}

/// Pull the gold price text out of the commodities table markup: row keyed
/// by `data-symbol`, price in the cell with id `p`.
fn find_gold_price_in_table(table_html: &str) -> Option<String> {
    // The locator hands back the table's inner HTML; re-wrap it so the
    // HTML5 parser keeps the rows instead of foster-parenting them away.
    let doc = Html::parse_fragment(&format!("<table>{table_html}</table>"));
    let row_sel = CssSelector::parse(&format!("tr[data-symbol=\"{GOLD_SYMBOL}\"]")).ok()?;
    let cell_sel = CssSelector::parse("td#p").ok()?;

    let row = doc.select(&row_sel).next()?;
    let cell = row.select(&cell_sel).next()?;
    let text: String = cell.text().collect::<String>().trim().to_string();
    (!text.is_empty()).then_some(text)
}

#[async_trait::async_trait]
impl PriceScraper for TradingEconomicsScraper {
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
        "trading_economics"
    }
}
