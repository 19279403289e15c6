//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! Provides three export formats for analysis results:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: pair table, tag table, equity curve and monthly P&L
//! - **Markdown**: human-readable single-run report
//!
//! The pair CSV reproduces the on-screen table exactly: win rate to one
//! decimal, P&L and RR to two, `N/A` for a missing RR.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use confluencelab_core::{EquityPoint, MonthlyPnl, PairRow, TagRow};

use crate::runner::{AnalysisResult, SCHEMA_VERSION};

/// Pair table header, in output order.
pub const PAIR_COLUMNS: [&str; 7] = [
    "Confluence A",
    "Confluence B",
    "Trades",
    "Win Rate (%)",
    "Avg P&L",
    "Avg RR",
    "Profitable",
];

/// Tag table header, in output order.
pub const TAG_COLUMNS: [&str; 5] = ["Confluence", "Wins", "Losses", "Trades", "Win Rate (%)"];

/// Marker for an undefined value.
pub const NOT_AVAILABLE: &str = "N/A";

// ─── Number formatting ──────────────────────────────────────────────

/// Fixed-decimal formatting that never prints `-0.0`.
pub fn fmt_fixed(value: f64, decimals: usize) -> String {
    let text = format!("{value:.decimals$}");
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text[1..].to_string()
    } else {
        text
    }
}

pub fn fmt_rate(value: f64) -> String {
    fmt_fixed(value, 1)
}

pub fn fmt_amount(value: f64) -> String {
    fmt_fixed(value, 2)
}

pub fn fmt_optional(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), fmt_amount)
}

/// One pair row as rendered cells.
pub fn pair_cells(row: &PairRow) -> [String; 7] {
    [
        row.confluence_a.clone(),
        row.confluence_b.clone(),
        row.trades.to_string(),
        fmt_rate(row.win_rate),
        fmt_amount(row.avg_pnl),
        fmt_optional(row.avg_rr),
        row.profitable.to_string(),
    ]
}

/// One tag row as rendered cells.
pub fn tag_cells(row: &TagRow) -> [String; 5] {
    [
        row.tag.clone(),
        row.wins.to_string(),
        row.losses.to_string(),
        row.trades.to_string(),
        fmt_rate(row.win_rate),
    ]
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an `AnalysisResult` to pretty JSON.
pub fn export_json(result: &AnalysisResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize AnalysisResult to JSON")
}

/// Deserialize an `AnalysisResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<AnalysisResult> {
    let result: AnalysisResult =
        serde_json::from_str(json).context("failed to deserialize AnalysisResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the pair table. An empty table yields the header row only.
pub fn export_pairs_csv(rows: &[PairRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(PAIR_COLUMNS)?;
    for row in rows {
        wtr.write_record(pair_cells(row))?;
    }
    finish(wtr)
}

/// Export the single-tag table.
pub fn export_tags_csv(rows: &[TagRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(TAG_COLUMNS)?;
    for row in rows {
        wtr.write_record(tag_cells(row))?;
    }
    finish(wtr)
}

/// Export the equity curve. Undated trades have an empty date cell.
pub fn export_equity_csv(curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["Date", "P&L", "Equity"])?;
    for point in curve {
        let date = point
            .date
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        wtr.write_record([date, fmt_amount(point.pnl), fmt_amount(point.equity)])?;
    }
    finish(wtr)
}

/// Export the monthly P&L rollup.
pub fn export_monthly_csv(months: &[MonthlyPnl]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["Month", "Trades", "P&L"])?;
    for m in months {
        wtr.write_record([m.label(), m.trades.to_string(), fmt_amount(m.pnl)])?;
    }
    finish(wtr)
}

/// Write the pair table to a delimited file.
pub fn write_pairs_csv(rows: &[PairRow], path: &Path) -> Result<()> {
    let csv = export_pairs_csv(rows)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one analysis.
///
/// Creates a directory named `{label}_{timestamp}/` under `output_dir`
/// containing:
/// - `result.json`: the full `AnalysisResult`
/// - `pairs.csv`: filtered pair table
/// - `tags.csv`: filtered single-tag table
/// - `equity.csv`: cumulative P&L curve
/// - `monthly.csv`: P&L per calendar month
/// - `report.md`: Markdown report
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &AnalysisResult, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        result.label,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let files = [
        ("result.json", export_json(result)?),
        ("pairs.csv", export_pairs_csv(&result.pairs)?),
        ("tags.csv", export_tags_csv(&result.tags)?),
        ("equity.csv", export_equity_csv(&result.equity)?),
        ("monthly.csv", export_monthly_csv(&result.monthly)?),
        ("report.md", generate_report(result)),
    ];
    for (name, content) in files {
        let path = run_dir.join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(run_dir)
}

/// Load an `AnalysisResult` from an artifact directory's result.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<AnalysisResult> {
    let path = dir.join("result.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Markdown report ────────────────────────────────────────────────

fn md_row<S: AsRef<str>>(cells: &[S]) -> String {
    let inner: Vec<&str> = cells.iter().map(|c| c.as_ref()).collect();
    format!("| {} |\n", inner.join(" | "))
}

fn md_header(columns: &[&str]) -> String {
    let mut out = md_row(columns);
    out.push_str(&md_row(&vec!["---"; columns.len()]));
    out
}

/// Generate a Markdown report for one analysis.
pub fn generate_report(result: &AnalysisResult) -> String {
    let mut md = String::with_capacity(4096);
    let filters = &result.config.filters;
    let s = &result.summary;

    md.push_str(&format!("# Confluence Report: {}\n\n", result.label));

    md.push_str("## Dataset\n\n");
    md.push_str(&md_header(&["Field", "Value"]));
    md.push_str(&md_row(&["Source", result.source.as_str()]));
    md.push_str(&md_row(&["Dataset Hash", result.dataset_hash.as_str()]));
    md.push_str(&md_row(&["Rows".to_string(), result.trade_count.to_string()]));
    md.push_str(&md_row(&[
        "Win/Loss Trades".to_string(),
        result.qualifying_count.to_string(),
    ]));
    if result.skipped_no_pnl > 0 {
        md.push_str(&md_row(&[
            "Excluded (no P&L)".to_string(),
            result.skipped_no_pnl.to_string(),
        ]));
    }
    md.push('\n');

    md.push_str("## Summary\n\n");
    md.push_str(&md_header(&["Metric", "Value"]));
    md.push_str(&md_row(&["Total Trades".to_string(), s.total_trades.to_string()]));
    md.push_str(&md_row(&["Total P&L".to_string(), format!("${}", fmt_amount(s.total_pnl))]));
    md.push_str(&md_row(&["Win Rate".to_string(), format!("{}%", fmt_rate(s.win_rate))]));
    md.push_str(&md_row(&["Avg P&L".to_string(), format!("${}", fmt_amount(s.avg_pnl))]));
    md.push_str(&md_row(&[
        "Max Drawdown".to_string(),
        format!("${}", fmt_amount(s.max_drawdown)),
    ]));
    md.push('\n');

    md.push_str("## Filters\n\n");
    md.push_str(&format!(
        "Min trades per tag: {} · Min trades per pair: {} · Timeframe: {} · Profitable only: {}\n\n",
        filters.min_trades_single,
        filters.min_trades_pair,
        filters.timeframe,
        if filters.profitable_only { "yes" } else { "no" },
    ));

    md.push_str("## Confluence Pairs\n\n");
    if result.pairs.is_empty() {
        md.push_str("_No pairs match the current filters._\n\n");
    } else {
        md.push_str(&md_header(&PAIR_COLUMNS));
        for row in &result.pairs {
            md.push_str(&md_row(&pair_cells(row)));
        }
        md.push('\n');
    }

    md.push_str("## Single Confluences\n\n");
    if result.tags.is_empty() {
        md.push_str("_No confluences meet the minimum trade count._\n\n");
    } else {
        md.push_str(&md_header(&TAG_COLUMNS));
        for row in &result.tags {
            md.push_str(&md_row(&tag_cells(row)));
        }
        md.push('\n');
    }

    if !result.monthly.is_empty() {
        md.push_str("## Monthly P&L\n\n");
        md.push_str(&md_header(&["Month", "Trades", "P&L"]));
        for m in &result.monthly {
            md.push_str(&md_row(&[m.label(), m.trades.to_string(), fmt_amount(m.pnl)]));
        }
        md.push('\n');
    }

    if !result.data_quality_warnings.is_empty() {
        md.push_str("## Data Quality\n\n");
        for warn in &result.data_quality_warnings {
            md.push_str(&format!("- {warn}\n"));
        }
        md.push('\n');
    }

    md
}
