// src/notify/mod.rs
pub mod telegram;

use crate::orchestrator::{Outcome, RunResult};
use rust_decimal::Decimal;

pub use telegram::TelegramNotifier;

/// Aggregated statistics over one run, the only thing notifiers consume.
/// The pipeline never formats user-facing messages itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Mean gram price across successful sources, absent when none succeeded.
    pub average_price: Option<Decimal>,
    pub ok_sources: Vec<String>,
    pub failed_sources: Vec<String>,
}

impl RunSummary {
    pub fn from_result(run: &RunResult) -> Self {
        let mut ok_sources = Vec::new();
        let mut failed_sources = Vec::new();
        let mut sum = Decimal::ZERO;
        for entry in &run.outcomes {
            match &entry.outcome {
                Outcome::Ok(obs) => {
                    sum += obs.price;
                    ok_sources.push(entry.source.clone());
                }
                Outcome::Failed { .. } => failed_sources.push(entry.source.clone()),
            }
        }
        let average_price = if ok_sources.is_empty() {
            None
        } else {
            Some(sum / Decimal::from(ok_sources.len() as u64))
        };
        Self {
            average_price,
            ok_sources,
            failed_sources,
        }
    }
}
