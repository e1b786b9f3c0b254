// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod browser;
pub mod catalog;
pub mod config;
pub mod correlation;
pub mod error;
pub mod locator;
pub mod normalize;
pub mod orchestrator;
pub mod scrape;

// Thin collaborators outside the extraction core
pub mod notify;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::correlation::CorrelationId;
pub use crate::orchestrator::{Orchestrator, Outcome, RunResult, SourceOutcome};
pub use crate::scrape::{PriceObservation, PriceScraper, ScraperRegistry};
