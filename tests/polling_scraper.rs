// tests/polling_scraper.rs
// The bullion_vault variant polls its table until the price span is
// populated: success on the last allowed attempt is still success, and
// exhaustion surfaces as ordinary locator failure, not a distinct kind.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use gold_price_fetcher::browser::{Browser, Page, Selector};
use gold_price_fetcher::catalog::SourceConfig;
use gold_price_fetcher::correlation::CorrelationId;
use gold_price_fetcher::error::{FailureKind, ScrapeError};
use gold_price_fetcher::locator::LocatorOptions;
use gold_price_fetcher::scrape::bullion_vault::BullionVaultScraper;
use gold_price_fetcher::scrape::PriceScraper;
use parking_lot::Mutex;
use rust_decimal_macros::dec;

const EMPTY_TABLE: &str = r#"
    <tr><th>Gold Price per Gram</th>
    <td><span data-weight="G" data-currency="USD"></span></td></tr>
"#;

const FULL_TABLE: &str = r#"
    <tr><th>Gold Price per Gram</th>
    <td><span data-weight="G" data-currency="USD">$100.25</span></td></tr>
    <tr><td class="bullion-price-timestamp">14 March 2025, 12:30:05 (GMT+01:00)</td></tr>
"#;

/// Serves the empty table until the configured read, then the full one.
struct LazyTablePage {
    reads: Arc<Mutex<u32>>,
    full_after: u32,
}

#[async_trait]
impl Page for LazyTablePage {
    async fn navigate(&self, _url: &str, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    async fn wait_for(&self, _selector: &Selector, _timeout: Duration) -> Result<bool> {
        Ok(true)
    }

    async fn inner_html(&self, _selector: &Selector) -> Result<Option<String>> {
        let mut reads = self.reads.lock();
        *reads += 1;
        if self.full_after != 0 && *reads >= self.full_after {
            Ok(Some(FULL_TABLE.to_string()))
        } else {
            Ok(Some(EMPTY_TABLE.to_string()))
        }
    }

    async fn scroll_by(&self, _pixels: u32) -> Result<()> {
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(vec![])
    }

    async fn current_url(&self) -> String {
        "https://bullion.test/gold-price".to_string()
    }

    async fn close(self: Box<Self>) {}
}

struct LazyTableBrowser {
    reads: Arc<Mutex<u32>>,
    full_after: u32,
}

#[async_trait]
impl Browser for LazyTableBrowser {
    async fn open_page(&self) -> Result<Box<dyn Page>> {
        Ok(Box::new(LazyTablePage {
            reads: Arc::clone(&self.reads),
            full_after: self.full_after,
        }))
    }
}

fn scraper(full_after: u32) -> (BullionVaultScraper, Arc<Mutex<u32>>) {
    let reads = Arc::new(Mutex::new(0));
    let browser = Arc::new(LazyTableBrowser {
        reads: Arc::clone(&reads),
        full_after,
    });
    let cfg = SourceConfig {
        site: "https://bullion.test/gold-price".into(),
        scraper: "bullion_vault".into(),
    };
    let s = BullionVaultScraper::new(cfg, browser)
        .with_poll_delay(Duration::ZERO)
        .with_locator_options(LocatorOptions {
            max_attempts: 2,
            scroll_step: 100,
            attempt_timeout: Duration::from_millis(1),
        });
    (s, reads)
}

#[tokio::test]
async fn value_on_the_tenth_attempt_succeeds() {
    let (scraper, reads) = scraper(10);
    let cid = CorrelationId::mint();

    let obs = scraper.scrape(&cid).await.unwrap();
    assert_eq!(obs.price, dec!(100.25));
    // 12:30:05 at GMT+01:00 is 11:30:05 UTC.
    assert_eq!(
        obs.observed_at,
        Utc.with_ymd_and_hms(2025, 3, 14, 11, 30, 5).unwrap()
    );
    assert_eq!(*reads.lock(), 10);
}

#[tokio::test]
async fn empty_on_every_attempt_is_ordinary_exhaustion() {
    let (scraper, reads) = scraper(0);
    let cid = CorrelationId::mint();

    let err = scraper.scrape(&cid).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::ElementNotFound);
    assert!(matches!(err, ScrapeError::ElementNotFound { .. }));
    assert_eq!(*reads.lock(), 10);
}
