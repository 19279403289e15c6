//! Analysis runner: wires together loading, configuration and the engine.
//!
//! Two entry points:
//! - `run_analysis()`: loads a trade log from disk, then analyzes it. Used by CLI.
//! - `analyze_loaded()`: takes an already-loaded batch. Used when re-querying
//!   the same data with different filters.

use std::path::Path;

use confluencelab_core::{
    Aggregates, EquityPoint, EquitySummary, MonthlyPnl, PairRow, QueryParams, TagRow,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{AnalysisConfig, ConfigError};
use crate::loader::{load_trades, LoadError, LoadedTrades};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("load error: {0}")]
    Load(#[from] LoadError),
}

/// Current schema version for persisted results.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of one analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub label: String,
    pub source: String,
    pub dataset_hash: String,
    pub config: AnalysisConfig,
    pub trade_count: usize,
    pub qualifying_count: usize,
    /// Qualifying trades left out of pair stats for lack of a P&L.
    pub skipped_no_pnl: usize,
    pub summary: EquitySummary,
    pub tags: Vec<TagRow>,
    pub pairs: Vec<PairRow>,
    pub equity: Vec<EquityPoint>,
    pub monthly: Vec<MonthlyPnl>,
    pub data_quality_warnings: Vec<String>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Load a trade log and analyze it.
pub fn run_analysis(path: &Path, config: &AnalysisConfig) -> Result<AnalysisResult, RunError> {
    // Validate before touching the file so a bad filter fails fast.
    config.validate()?;
    let params = config.query_params()?;
    let loaded = load_trades(path)?;
    Ok(build_result(&loaded, config, &params))
}

/// Analyze an already-loaded batch.
pub fn analyze_loaded(
    loaded: &LoadedTrades,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, RunError> {
    config.validate()?;
    let params = config.query_params()?;
    Ok(build_result(loaded, config, &params))
}

fn build_result(
    loaded: &LoadedTrades,
    config: &AnalysisConfig,
    params: &QueryParams,
) -> AnalysisResult {
    let aggregates = Aggregates::accumulate(&loaded.trades);
    let tables = aggregates.query(params);

    tracing::debug!(
        tag_rows = tables.tags.len(),
        pair_rows = tables.pairs.len(),
        timeframe = %params.pairs.timeframe,
        "queried confluence tables"
    );

    AnalysisResult {
        schema_version: SCHEMA_VERSION,
        label: loaded.label.clone(),
        source: loaded.source.clone(),
        dataset_hash: loaded.dataset_hash.clone(),
        config: config.clone(),
        trade_count: aggregates.trade_count,
        qualifying_count: aggregates.qualifying_count,
        skipped_no_pnl: aggregates.pairs.skipped_no_pnl(),
        summary: aggregates.summary,
        tags: tables.tags,
        pairs: tables.pairs,
        equity: aggregates.equity,
        monthly: aggregates.monthly,
        data_quality_warnings: loaded.warnings.clone(),
    }
}
