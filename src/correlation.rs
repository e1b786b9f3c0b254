// src/correlation.rs
use serde::Serialize;
use uuid::Uuid;

/// Opaque token minted once per adapter invocation and threaded explicitly
/// through every layer (orchestrator → scraper → locator → diagnostics).
/// Random so concurrent invocations never need a shared counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn mint() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
