// src/notify/telegram.rs
use super::RunSummary;
use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const ENV_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
const ENV_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// Telegram Bot API notifier for run summaries. Delivery is best-effort
/// with bounded retries; a failure here never reaches the pipeline.
#[derive(Clone)]
pub struct TelegramNotifier {
    token: String,
    chat_id: String,
    client: Client,
    timeout: Duration,
    max_retries: u8,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

impl TelegramNotifier {
    pub fn new(token: String, chat_id: String) -> Self {
        Self {
            token,
            chat_id,
            client: Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }

    /// `None` when the bot token or chat id is not configured; an absent
    /// notifier is normal, not an error.
    pub fn from_env() -> Option<Self> {
        let token = std::env::var(ENV_TOKEN).ok()?;
        let chat_id = std::env::var(ENV_CHAT_ID).ok()?;
        Some(Self::new(token, chat_id))
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    pub async fn send_summary(&self, summary: &RunSummary) -> Result<()> {
        let text = format_summary(summary);
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text: &text,
            parse_mode: "HTML",
        };

        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&url)
                .timeout(self.timeout)
                .json(&payload)
                .send()
                .await;

            match res {
                Ok(rsp) => {
                    if let Err(e) = rsp.error_for_status_ref() {
                        if attempt < self.max_retries {
                            tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1)))
                                .await;
                            continue;
                        }
                        return Err(anyhow!("Telegram API HTTP error: {e}"));
                    }
                    return Ok(());
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1))).await;
                        continue;
                    }
                    return Err(anyhow!("Telegram send failed: {e}"));
                }
            }
        }
    }
}

fn format_summary(summary: &RunSummary) -> String {
    let mut msg = String::new();
    if let Some(avg) = summary.average_price {
        msg.push_str("📊 <b>Gold Price Update</b>\n\n");
        msg.push_str(&format!("💰 <b>Average Price</b>: ${avg:.2} / gram\n"));
        msg.push_str(&format!(
            "📡 <b>Sources Scraped</b>: {}",
            summary.ok_sources.join(", ")
        ));
    }
    if !summary.failed_sources.is_empty() {
        if !msg.is_empty() {
            msg.push('\n');
        }
        msg.push_str(&format!(
            "❌ <b>Failed Sources</b>: {}",
            summary.failed_sources.join(", ")
        ));
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn summary_message_lists_prices_and_failures() {
        let summary = RunSummary {
            average_price: Some(dec!(101.25)),
            ok_sources: vec!["https://a.test".into(), "https://b.test".into()],
            failed_sources: vec!["https://c.test".into()],
        };
        let msg = format_summary(&summary);
        assert!(msg.contains("$101.25 / gram"));
        assert!(msg.contains("https://a.test, https://b.test"));
        assert!(msg.contains("Failed Sources"));
    }

    #[test]
    fn all_failed_run_still_produces_a_message() {
        let summary = RunSummary {
            average_price: None,
            ok_sources: vec![],
            failed_sources: vec!["https://c.test".into()],
        };
        let msg = format_summary(&summary);
        assert!(!msg.contains("Average Price"));
        assert!(msg.starts_with("❌"));
    }
}
