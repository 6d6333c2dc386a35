use crate::{
    cache::DEFAULT_FRESHNESS_WINDOW_SECS,
    error::MonitorResult,
    source::{DataSource, FileSource, HttpSource},
    types::MIN_FIELDS,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SOURCE_URL: &str =
    "https://hebbkx1anhila5yf.public.blob.vercel-storage.com/enhanced_fraud_dataset-ZMjbsPepn5xUXRFrSs12xgofaGgWk1.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Url { url: String },
    File { path: String },
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Url {
            url: DEFAULT_SOURCE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub source: SourceConfig,
    pub freshness_window_secs: i64,
    pub fetch_timeout_secs: u64,
    pub default_limit: usize,
    pub min_fields: usize,
    /// Fixed master seed for synthesized attributes. None = fresh entropy.
    pub rng_seed: Option<u64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            freshness_window_secs: DEFAULT_FRESHNESS_WINDOW_SECS,
            fetch_timeout_secs: 30,
            default_limit: 50,
            min_fields: MIN_FIELDS,
            rng_seed: None,
        }
    }
}

impl MonitorConfig {
    /// Load from a JSON file. Missing keys take their defaults.
    /// In tests, use MonitorConfig::default().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: MonitorConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn freshness_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.freshness_window_secs)
    }

    /// Open the configured data source.
    pub fn open_source(&self) -> MonitorResult<Box<dyn DataSource>> {
        Ok(match &self.source {
            SourceConfig::Url { url } => Box::new(HttpSource::new(url.clone(), self.fetch_timeout())?),
            SourceConfig::File { path } => Box::new(FileSource::new(path)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: MonitorConfig = serde_json::from_str(
            r#"{ "source": { "kind": "file", "path": "data/tx.csv" }, "rng_seed": 9 }"#,
        )
        .unwrap();
        assert_eq!(config.source, SourceConfig::File { path: "data/tx.csv".into() });
        assert_eq!(config.rng_seed, Some(9));
        assert_eq!(config.freshness_window_secs, 300);
        assert_eq!(config.default_limit, 50);
        assert_eq!(config.min_fields, 32);
    }

    #[test]
    fn default_points_at_remote_dataset() {
        let config = MonitorConfig::default();
        assert!(matches!(config.source, SourceConfig::Url { ref url } if url == DEFAULT_SOURCE_URL));
    }
}
