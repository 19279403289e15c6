//! Analysis configuration, loadable from TOML.
//!
//! ```toml
//! [filters]
//! min_trades_single = 3
//! min_trades_pair = 1
//! timeframe = "all"
//! profitable_only = false
//!
//! [timeframes]
//! labels = ["1M", "2M", "3M", "5M", "15M", "30M", "1H", "2H", "4H", "D", "W", "M"]
//! ```
//!
//! Every field is optional and falls back to the defaults above.

use std::path::Path;

use confluencelab_core::{
    PairQuery, QueryParams, TimeframeError, TimeframeTable, DEFAULT_MIN_TRADES_PAIR,
    DEFAULT_MIN_TRADES_SINGLE, DEFAULT_TIMEFRAMES,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or validating an analysis config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("timeframe config: {0}")]
    Timeframe(#[from] TimeframeError),
}

/// Full analysis configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub filters: FilterConfig,
    pub timeframes: TimeframeConfig,
}

/// Table filters. Applied when querying, never during accumulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Minimum trades for a tag to appear in the single-tag table.
    pub min_trades_single: usize,
    /// Minimum trades for a pair to appear in the pair table.
    pub min_trades_pair: usize,
    /// `"all"` or one of the timeframe labels.
    pub timeframe: String,
    /// Keep only pairs whose verdict is `Yes`.
    pub profitable_only: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_trades_single: DEFAULT_MIN_TRADES_SINGLE,
            min_trades_pair: DEFAULT_MIN_TRADES_PAIR,
            timeframe: "all".into(),
            profitable_only: false,
        }
    }
}

/// Ordered timeframe labels; position is the sort priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeframeConfig {
    pub labels: Vec<String>,
}

impl Default for TimeframeConfig {
    fn default() -> Self {
        Self {
            labels: DEFAULT_TIMEFRAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and that the timeframe filter names a known label.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.filters.min_trades_single == 0 {
            return Err(ConfigError::Invalid("min_trades_single must be >= 1".into()));
        }
        if self.filters.min_trades_pair == 0 {
            return Err(ConfigError::Invalid("min_trades_pair must be >= 1".into()));
        }
        self.query_params().map(|_| ())
    }

    pub fn timeframe_table(&self) -> Result<TimeframeTable, ConfigError> {
        Ok(TimeframeTable::new(self.timeframes.labels.iter().cloned())?)
    }

    /// Build the engine query parameters.
    pub fn query_params(&self) -> Result<QueryParams, ConfigError> {
        let timeframes = self.timeframe_table()?;
        let timeframe = timeframes.parse_filter(&self.filters.timeframe)?;
        Ok(QueryParams {
            min_trades_single: self.filters.min_trades_single,
            pairs: PairQuery {
                min_trades: self.filters.min_trades_pair,
                timeframe,
                profitable_only: self.filters.profitable_only,
            },
            timeframes,
        })
    }
}
