//! Gold Price Fetcher — Binary Entrypoint
//! Runs the extraction pipeline once: load catalog, scrape all enabled
//! sources concurrently, persist observations, send the summary alert.
//! Periodic triggering is the job of an external scheduler (cron or similar).

use std::sync::Arc;

use gold_price_fetcher::browser::ChromiumBrowser;
use gold_price_fetcher::config::AppConfig;
use gold_price_fetcher::notify::{RunSummary, TelegramNotifier};
use gold_price_fetcher::orchestrator::{Orchestrator, Outcome};
use gold_price_fetcher::scrape::ScraperRegistry;
use gold_price_fetcher::store::{JsonlSink, ResultSink};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// JSON log lines when LOG_FORMAT=json, compact text otherwise.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::from_env();
    tracing::info!(catalog = %cfg.catalog_path.display(), "scrape run start");

    let browser = Arc::new(ChromiumBrowser::launch(&cfg.browser).await?);
    let mut orchestrator = Orchestrator::new(ScraperRegistry::with_defaults(), browser);
    orchestrator.load_catalog(&cfg.catalog_path)?;

    let result = orchestrator.run().await?;
    for entry in &result.outcomes {
        match &entry.outcome {
            Outcome::Ok(obs) => tracing::info!(
                source = %entry.source,
                correlation_id = %entry.correlation_id,
                price = %obs.price,
                observed_at = %obs.observed_at,
                "scrape site result"
            ),
            Outcome::Failed { kind, cause } => tracing::warn!(
                source = %entry.source,
                correlation_id = %entry.correlation_id,
                kind = ?kind,
                cause = %cause,
                "scrape site result"
            ),
        }
    }

    let sink = JsonlSink::new(&cfg.prices_path);
    if let Err(e) = sink.record(&result).await {
        tracing::warn!(error = %e, "failed to persist observations");
    }

    if let Some(notifier) = TelegramNotifier::from_env() {
        let summary = RunSummary::from_result(&result);
        if let Err(e) = notifier.send_summary(&summary).await {
            tracing::warn!(error = %e, "failed to send summary notification");
        }
    }

    Ok(())
}
