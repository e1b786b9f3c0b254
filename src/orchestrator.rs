// src/orchestrator.rs
// Fans the configured sources out as independent tokio tasks, isolates every
// per-source failure, and collects one outcome per source in catalog order.

use crate::browser::Browser;
use crate::catalog::{self, SourceConfig};
use crate::correlation::CorrelationId;
use crate::error::{CatalogError, FailureKind, RunError, ScrapeError};
use crate::scrape::{PriceObservation, ScraperRegistry};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Terminal state of one source's extraction attempt. A failed source is
/// visibly failed with its classified reason, never a sentinel price.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Ok(PriceObservation),
    Failed { kind: FailureKind, cause: String },
}

impl From<ScrapeError> for Outcome {
    fn from(e: ScrapeError) -> Self {
        Outcome::Failed {
            kind: e.kind(),
            cause: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceOutcome {
    /// Canonical source URL from the catalog.
    pub source: String,
    pub correlation_id: CorrelationId,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// One outcome per submitted source, in submission (catalog) order,
/// emitted only after every task reached a terminal state.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub outcomes: Vec<SourceOutcome>,
}

pub struct Orchestrator {
    registry: ScraperRegistry,
    browser: Arc<dyn Browser>,
    sources: Vec<SourceConfig>,
}

impl Orchestrator {
    pub fn new(registry: ScraperRegistry, browser: Arc<dyn Browser>) -> Self {
        Self {
            registry,
            browser,
            sources: Vec::new(),
        }
    }

    /// Load the catalog and keep the enabled entries whose scraper variant
    /// resolves. A missing or malformed file is fatal; an unresolvable
    /// entry is dropped with a warning and never reaches submission.
    pub fn load_catalog(&mut self, path: &Path) -> Result<usize, CatalogError> {
        let entries = catalog::load(path)?;
        let total = entries.len();
        let mut sources = Vec::new();
        for cfg in catalog::enabled_sources(entries) {
            match self.registry.resolve(&cfg.scraper) {
                Ok(_) => sources.push(cfg),
                Err(e) => {
                    tracing::warn!(
                        target: "orchestrator",
                        site = %cfg.site,
                        error = %e,
                        "dropping catalog entry"
                    );
                }
            }
        }
        tracing::info!(
            target: "orchestrator",
            catalog = %path.display(),
            entries = total,
            scheduled = sources.len(),
            "catalog loaded"
        );
        self.sources = sources;
        Ok(self.sources.len())
    }

    /// Sources currently scheduled for the next run.
    pub fn sources(&self) -> &[SourceConfig] {
        &self.sources
    }

    /// Run every scheduled source concurrently and wait for all of them.
    /// One adapter failing (or panicking) never aborts its siblings; its
    /// outcome is recorded as a classified failure for that source only.
    pub async fn run(&self) -> Result<RunResult, RunError> {
        if self.sources.is_empty() {
            return Err(RunError::NoSources);
        }

        let mut pending = Vec::with_capacity(self.sources.len());
        for cfg in &self.sources {
            let cid = CorrelationId::mint();
            // Resolution was checked at load time; a registry mutated in
            // between surfaces as a per-source failure, not a run abort.
            let handle = match self.registry.resolve(&cfg.scraper) {
                Ok(factory) => {
                    let scraper = factory(cfg.clone(), Arc::clone(&self.browser));
                    tracing::info!(
                        target: "orchestrator",
                        source = %cfg.site,
                        scraper = scraper.name(),
                        correlation_id = %cid,
                        "scheduling source"
                    );
                    let task_cid = cid.clone();
                    Ok(tokio::spawn(async move { scraper.scrape(&task_cid).await }))
                }
                Err(e) => Err(Outcome::Failed {
                    kind: FailureKind::Internal,
                    cause: e.to_string(),
                }),
            };
            pending.push((cfg.site.clone(), cid, handle));
        }

        let mut outcomes = Vec::with_capacity(pending.len());
        for (source, correlation_id, handle) in pending {
            let outcome = match handle {
                Ok(handle) => match handle.await {
                    Ok(Ok(obs)) => {
                        tracing::info!(
                            target: "orchestrator",
                            source = %source,
                            correlation_id = %correlation_id,
                            price = %obs.price,
                            observed_at = %obs.observed_at,
                            "source scraped"
                        );
                        Outcome::Ok(obs)
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(
                            target: "orchestrator",
                            source = %source,
                            correlation_id = %correlation_id,
                            error = %e,
                            "source failed"
                        );
                        Outcome::from(e)
                    }
                    // A panicked or aborted task is converted, not propagated.
                    Err(join_err) => {
                        tracing::error!(
                            target: "orchestrator",
                            source = %source,
                            correlation_id = %correlation_id,
                            error = %join_err,
                            "scrape task aborted"
                        );
                        Outcome::from(ScrapeError::Internal(join_err.to_string()))
                    }
                },
                Err(failed) => failed,
            };
            outcomes.push(SourceOutcome {
                source,
                correlation_id,
                outcome,
            });
        }

        let failed = outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Failed { .. }))
            .count();
        tracing::info!(
            target: "orchestrator",
            sources = outcomes.len(),
            failed,
            "run complete"
        );
        Ok(RunResult { outcomes })
    }
}
