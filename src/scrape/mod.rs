// src/scrape/mod.rs
pub mod bullion_vault;
pub mod gold_price_org;
pub mod trading_economics;

use crate::browser::Browser;
use crate::catalog::SourceConfig;
use crate::correlation::CorrelationId;
use crate::error::{ScrapeError, UnknownVariant};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Page navigation timeout shared by all scrapers.
pub(crate) const NAV_TIMEOUT: Duration = Duration::from_secs(30);

/// One successful extraction: a gram-denominated price and the instant it
/// was observed, UTC-normalized. Either both fields are valid or the scrape
/// failed; there is no partially-valid observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceObservation {
    /// Currency per gram, always positive.
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
}

/// Source-specific extraction logic behind a shared contract. Instances own
/// their source config and no other mutable state; `scrape` must not be
/// re-entered concurrently on one instance.
#[async_trait::async_trait]
pub trait PriceScraper: Send + Sync {
    async fn scrape(&self, cid: &CorrelationId) -> Result<PriceObservation, ScrapeError>;
    fn name(&self) -> &'static str;
}

type ScraperFactory =
    Arc<dyn Fn(SourceConfig, Arc<dyn Browser>) -> Box<dyn PriceScraper> + Send + Sync>;

/// Stable variant name → constructor. Populated at startup; no reflection.
#[derive(Clone, Default)]
pub struct ScraperRegistry {
    factories: HashMap<String, ScraperFactory>,
}

impl ScraperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with all built-in scraper variants.
    pub fn with_defaults() -> Self {
        let mut reg = Self::new();
        reg.register("gold_price_org", |cfg, browser| {
            Box::new(gold_price_org::GoldPriceOrgScraper::new(cfg, browser))
        });
        reg.register("trading_economics", |cfg, browser| {
            Box::new(trading_economics::TradingEconomicsScraper::new(cfg, browser))
        });
        reg.register("bullion_vault", |cfg, browser| {
            Box::new(bullion_vault::BullionVaultScraper::new(cfg, browser))
        });
        reg
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(SourceConfig, Arc<dyn Browser>) -> Box<dyn PriceScraper> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn resolve(&self, name: &str) -> Result<ScraperFactory, UnknownVariant> {
        self.factories
            .get(name)
            .cloned()
            .ok_or_else(|| UnknownVariant(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_resolves_builtin_variants() {
        let reg = ScraperRegistry::with_defaults();
        for name in ["gold_price_org", "trading_economics", "bullion_vault"] {
            assert!(reg.resolve(name).is_ok(), "missing variant {name}");
        }
        assert!(matches!(
            reg.resolve("app.scraper.scrapers.GoldPriceOrgScraper"),
            Err(UnknownVariant(_))
        ));
    }
}
