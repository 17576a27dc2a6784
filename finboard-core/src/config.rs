//! Dashboard configuration, loaded from TOML.
//!
//! Every field has a default, so a partial file (or none at all) works:
//!
//! ```toml
//! ticker = "MSFT"
//! locale = "ru"
//! metrics_requested = ["close", "volume"]
//!
//! [provider]
//! timeout_secs = 10
//! ```

use crate::data::{SyntheticSeries, SyntheticTips};
use crate::domain::Locale;
use crate::metrics::SeriesColumn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for the live equity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Retries after the first attempt on transient failures.
    pub max_retries: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

/// Everything that parameterizes a dashboard session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Default equity identifier when the session does not name one.
    pub ticker: String,
    pub locale: Locale,
    /// Length of the synthetic fallback series, in calendar days.
    pub window_days: usize,
    /// Starting value of the synthetic random walk.
    pub base_price: f64,
    pub seed: u64,
    /// Rows in the demo tips table.
    pub tips_rows: usize,
    /// Columns reported in the equity statistics table.
    pub metrics_requested: Vec<SeriesColumn>,
    /// Rows shown in the data preview.
    pub tail_rows: usize,
    pub provider: ProviderConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            ticker: "AAPL".into(),
            locale: Locale::En,
            window_days: 60,
            base_price: 170.0,
            seed: 42,
            tips_rows: 100,
            metrics_requested: SeriesColumn::ALL.to_vec(),
            tail_rows: 10,
            provider: ProviderConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticker.trim().is_empty() {
            return Err(ConfigError::Invalid("ticker must not be empty".into()));
        }
        if self.metrics_requested.is_empty() {
            return Err(ConfigError::Invalid(
                "metrics_requested must name at least one column".into(),
            ));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "provider.timeout_secs must be positive".into(),
            ));
        }
        if !self.base_price.is_finite() {
            return Err(ConfigError::Invalid("base_price must be finite".into()));
        }
        Ok(())
    }

    /// Synthetic price generator for this configuration.
    pub fn synthetic_series(&self) -> SyntheticSeries {
        SyntheticSeries {
            base_price: self.base_price,
            window_days: self.window_days,
            seed: self.seed,
            ..SyntheticSeries::default()
        }
    }

    /// Demo tips generator for this configuration.
    pub fn synthetic_tips(&self) -> SyntheticTips {
        SyntheticTips {
            rows: self.tips_rows,
            seed: self.seed,
            locale: self.locale,
        }
    }
}
