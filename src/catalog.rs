// src/catalog.rs
// On-disk source catalog: a JSON list of `{site, scraper, scrape}` entries.
// Unknown fields are ignored and a missing `scrape` flag means disabled, so
// newer catalogs keep working against older binaries and vice versa.

use crate::error::CatalogError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "SITES_PATH";
const DEFAULT_PATH: &str = "config/sites.json";

/// One raw catalog entry as written in the file. `site`/`scraper` are
/// optional here so a single malformed entry can be skipped with a warning
/// instead of failing the whole load.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub site: Option<String>,
    pub scraper: Option<String>,
    #[serde(default)]
    pub scrape: bool,
}

/// A validated, enabled source. Immutable after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Canonical URL identifying the source.
    pub site: String,
    /// Registry name of the scraper variant to instantiate.
    pub scraper: String,
}

/// Catalog path resolution: `$SITES_PATH`, then `config/sites.json`.
pub fn default_path() -> PathBuf {
    std::env::var(ENV_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_PATH))
}

/// Read and parse the catalog file. A missing or unparseable file is fatal
/// to the run; per-entry validation happens later, at resolution time.
pub fn load(path: &Path) -> Result<Vec<CatalogEntry>, CatalogError> {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CatalogError::Malformed {
        path: path.display().to_string(),
        source,
    })
}

/// Keep enabled entries that carry both a site and a scraper name.
/// Incomplete entries are dropped with a warning, never fatally.
pub fn enabled_sources(entries: Vec<CatalogEntry>) -> Vec<SourceConfig> {
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        if !entry.scrape {
            continue;
        }
        match (entry.site, entry.scraper) {
            (Some(site), Some(scraper)) => out.push(SourceConfig { site, scraper }),
            (site, scraper) => {
                tracing::warn!(
                    target: "catalog",
                    site = ?site,
                    scraper = ?scraper,
                    "skipping incomplete catalog entry"
                );
            }
        }
    }
    out
}
