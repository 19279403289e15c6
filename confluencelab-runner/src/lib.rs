//! ConfluenceLab Runner: trade-log loading, configuration, orchestration, export.
//!
//! This crate builds on `confluencelab-core` to provide:
//! - CSV trade-log loading with per-cell degradation and dataset hashing
//! - TOML analysis configuration (filters and timeframe table)
//! - Single-pass analysis runner producing a serializable result
//! - JSON, CSV and Markdown export plus artifact bundles

pub mod config;
pub mod export;
pub mod loader;
pub mod runner;

pub use config::{AnalysisConfig, ConfigError, FilterConfig, TimeframeConfig};
pub use export::{
    export_equity_csv, export_json, export_monthly_csv, export_pairs_csv, export_tags_csv,
    generate_report, import_json, load_artifacts, save_artifacts, write_pairs_csv,
};
pub use loader::{load_trades, parse_trades, LoadError, LoadedTrades};
pub use runner::{analyze_loaded, run_analysis, AnalysisResult, RunError, SCHEMA_VERSION};
