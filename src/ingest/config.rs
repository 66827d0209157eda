// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::enrichment::EnrichmentRules;
use crate::models::DEFAULT_CURRENCY;

pub const ENV_CONFIG_PATH: &str = "TREND_INGEST_CONFIG_PATH";
pub const DEFAULT_CONFIG_TOML: &str = "config/trend_ingest.toml";
pub const DEFAULT_CONFIG_JSON: &str = "config/trend_ingest.json";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Currency stamped on new financial records.
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub enrichment: EnrichmentRules,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            enrichment: EnrichmentRules::default(),
        }
    }
}

impl IngestConfig {
    fn normalized(mut self) -> Self {
        let c = self.currency.trim().to_ascii_uppercase();
        self.currency = if c.is_empty() { default_currency() } else { c };
        self.enrichment = self.enrichment.normalized();
        self
    }
}

/// Load config from an explicit path. Supports TOML or JSON formats.
pub fn load_config_from(path: &Path) -> Result<IngestConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading ingest config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
        .with_context(|| format!("parsing ingest config {}", path.display()))
}

/// Load config using env var + fallbacks:
/// 1) $TREND_INGEST_CONFIG_PATH
/// 2) config/trend_ingest.toml
/// 3) config/trend_ingest.json
/// 4) built-in defaults
pub fn load_config_default() -> Result<IngestConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_config_from(&pb);
        } else {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
    }
    for candidate in [DEFAULT_CONFIG_TOML, DEFAULT_CONFIG_JSON] {
        let p = PathBuf::from(candidate);
        if p.exists() {
            return load_config_from(&p);
        }
    }
    Ok(IngestConfig::default())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<IngestConfig> {
    let cfg = match hint_ext {
        "toml" => toml::from_str::<IngestConfig>(s)?,
        "json" => serde_json::from_str::<IngestConfig>(s)?,
        // Unknown extension: sniff JSON by its leading brace, else TOML.
        _ if s.trim_start().starts_with('{') => serde_json::from_str::<IngestConfig>(s)?,
        _ => toml::from_str::<IngestConfig>(s)?,
    };
    Ok(cfg.normalized())
}
