// tests/locator_retry.rs
// Resilient locator: bounded wait-and-scroll cycles, diagnostic capture is
// best-effort, success returns as soon as the element resolves.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use gold_price_fetcher::browser::{Page, Selector};
use gold_price_fetcher::correlation::CorrelationId;
use gold_price_fetcher::error::{FailureKind, ScrapeError};
use gold_price_fetcher::locator::{fetch_element_inner_html, LocatorOptions};
use parking_lot::Mutex;

#[derive(Default)]
struct StubState {
    waits: u32,
    scrolls: u32,
    screenshots: u32,
}

struct StubPage {
    state: Arc<Mutex<StubState>>,
    /// Attempt number (1-based) on which the element appears; 0 = never.
    appears_on: u32,
    screenshot_fails: bool,
}

#[async_trait]
impl Page for StubPage {
    async fn navigate(&self, _url: &str, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    async fn wait_for(&self, _selector: &Selector, _timeout: Duration) -> Result<bool> {
        let mut s = self.state.lock();
        s.waits += 1;
        Ok(self.appears_on != 0 && s.waits >= self.appears_on)
    }

    async fn inner_html(&self, _selector: &Selector) -> Result<Option<String>> {
        let s = self.state.lock();
        if self.appears_on != 0 && s.waits >= self.appears_on {
            Ok(Some("<td>42</td>".to_string()))
        } else {
            Ok(None)
        }
    }

    async fn scroll_by(&self, _pixels: u32) -> Result<()> {
        self.state.lock().scrolls += 1;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.state.lock().screenshots += 1;
        if self.screenshot_fails {
            Err(anyhow::anyhow!("no screencast surface"))
        } else {
            Ok(vec![0x89, b'P', b'N', b'G'])
        }
    }

    async fn current_url(&self) -> String {
        "https://stub.test/page".to_string()
    }

    async fn close(self: Box<Self>) {}
}

fn opts(max_attempts: u32) -> LocatorOptions {
    LocatorOptions {
        max_attempts,
        scroll_step: 250,
        attempt_timeout: Duration::from_millis(1),
    }
}

#[serial_test::serial]
#[tokio::test]
async fn exhaustion_runs_exactly_max_attempts_wait_and_scroll_cycles() {
    let tmp = tempfile::tempdir().unwrap();
    std::env::set_var("SCREENSHOT_DIR", tmp.path());

    let state = Arc::new(Mutex::new(StubState::default()));
    let page = StubPage {
        state: Arc::clone(&state),
        appears_on: 0,
        screenshot_fails: false,
    };
    let cid = CorrelationId::mint();

    let err = fetch_element_inner_html(&page, &Selector::xpath("/html/body/table"), opts(5), &cid)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::ElementNotFound);
    match &err {
        ScrapeError::ElementNotFound {
            selector,
            url,
            correlation_id,
        } => {
            assert_eq!(selector, "xpath=/html/body/table");
            assert_eq!(url, "https://stub.test/page");
            assert_eq!(correlation_id, cid.as_str());
        }
        other => panic!("unexpected error {other:?}"),
    }

    let s = state.lock();
    assert_eq!(s.waits, 5);
    assert_eq!(s.scrolls, 5);
    assert_eq!(s.screenshots, 1);
    drop(s);

    // The diagnostic landed under the correlation id.
    let shot = tmp.path().join(format!("{cid}.png"));
    assert!(shot.exists());
    std::env::remove_var("SCREENSHOT_DIR");
}

#[serial_test::serial]
#[tokio::test]
async fn screenshot_failure_does_not_change_the_error_kind() {
    let tmp = tempfile::tempdir().unwrap();
    std::env::set_var("SCREENSHOT_DIR", tmp.path());

    let state = Arc::new(Mutex::new(StubState::default()));
    let page = StubPage {
        state: Arc::clone(&state),
        appears_on: 0,
        screenshot_fails: true,
    };
    let cid = CorrelationId::mint();

    let err = fetch_element_inner_html(&page, &Selector::css("#price"), opts(3), &cid)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::ElementNotFound);
    assert_eq!(state.lock().waits, 3);
    std::env::remove_var("SCREENSHOT_DIR");
}

#[tokio::test]
async fn returns_as_soon_as_the_element_resolves() {
    let state = Arc::new(Mutex::new(StubState::default()));
    let page = StubPage {
        state: Arc::clone(&state),
        appears_on: 3,
        screenshot_fails: false,
    };
    let cid = CorrelationId::mint();

    let html = fetch_element_inner_html(&page, &Selector::css("#price"), opts(10), &cid)
        .await
        .unwrap();
    assert_eq!(html, "<td>42</td>");

    let s = state.lock();
    assert_eq!(s.waits, 3);
    // The two misses scrolled, the hit did not.
    assert_eq!(s.scrolls, 2);
    assert_eq!(s.screenshots, 0);
}
