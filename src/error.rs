// src/error.rs
use serde::Serialize;
use thiserror::Error;

/// Fatal at catalog-load time: the run cannot start without a readable catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("reading catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed catalog {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A catalog entry names a scraper variant the registry does not know.
/// Skippable per entry, never fatal to the run.
#[derive(Debug, Error)]
#[error("unknown scraper variant `{0}`")]
pub struct UnknownVariant(pub String);

/// Per-source extraction failure, classified by where it occurred.
/// Always isolated at the orchestrator boundary.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("navigation to {url} failed: {cause}")]
    Navigation { url: String, cause: String },

    #[error("element {selector} not found on {url} (correlation {correlation_id})")]
    ElementNotFound {
        selector: String,
        url: String,
        correlation_id: String,
    },

    #[error("parsing {what}: {cause}")]
    Parse { what: String, cause: String },

    #[error("internal scraper failure: {0}")]
    Internal(String),
}

impl ScrapeError {
    pub fn parse(what: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Parse {
            what: what.into(),
            cause: cause.to_string(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Navigation { .. } => FailureKind::Navigation,
            Self::ElementNotFound { .. } => FailureKind::ElementNotFound,
            Self::Parse { .. } => FailureKind::Parse,
            Self::Internal(_) => FailureKind::Internal,
        }
    }
}

/// Serializable error kind carried in per-source outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Navigation,
    ElementNotFound,
    Parse,
    Internal,
}

/// Fatal at run start.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("no enabled sources in catalog")]
    NoSources,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrape_errors_map_to_their_kind() {
        let nav = ScrapeError::Navigation {
            url: "https://x".into(),
            cause: "timeout".into(),
        };
        assert_eq!(nav.kind(), FailureKind::Navigation);
        assert_eq!(ScrapeError::parse("price", "bad digit").kind(), FailureKind::Parse);
        assert_eq!(
            ScrapeError::Internal("task aborted".into()).kind(),
            FailureKind::Internal
        );
    }
}
