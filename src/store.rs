// src/store.rs
// Persistence sink. The pipeline's obligation ends at producing a
// `RunResult`; sinks are thin collaborators behind this trait.

use crate::orchestrator::{Outcome, RunResult};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

#[async_trait::async_trait]
pub trait ResultSink: Send + Sync {
    async fn record(&self, run: &RunResult) -> Result<()>;
}

/// One persisted row per successful observation; failed sources are logged
/// upstream, never written as prices.
#[derive(Debug, Serialize)]
struct PriceRow<'a> {
    source: &'a str,
    price: Decimal,
    observed_at: DateTime<Utc>,
    fetched_at: DateTime<Utc>,
    correlation_id: &'a str,
}

/// Append-only JSON-lines store.
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl ResultSink for JsonlSink {
    async fn record(&self, run: &RunResult) -> Result<()> {
        let fetched_at = Utc::now();
        let mut lines = String::new();
        for entry in &run.outcomes {
            if let Outcome::Ok(obs) = &entry.outcome {
                let row = PriceRow {
                    source: &entry.source,
                    price: obs.price,
                    observed_at: obs.observed_at,
                    fetched_at,
                    correlation_id: entry.correlation_id.as_str(),
                };
                lines.push_str(&serde_json::to_string(&row)?);
                lines.push('\n');
            }
        }
        if lines.is_empty() {
            return Ok(());
        }
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await.ok();
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("opening {}", self.path.display()))?;
        file.write_all(lines.as_bytes())
            .await
            .with_context(|| format!("writing {}", self.path.display()))?;
        file.flush()
            .await
            .with_context(|| format!("flushing {}", self.path.display()))
    }
}
