//! Trade-log loading.
//!
//! Reads a CSV export with one row per closed trade and normalizes each row
//! into a `Trade`. Structural problems (unreadable file, missing required
//! column, broken CSV framing) are errors. Bad cell values are not: they
//! become absent fields, are logged with their row number, and the row
//! still contributes everything else it has.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use confluencelab_core::{normalize_trade, RawTrade, Trade};
use thiserror::Error;

pub const COL_DATE: &str = "Date";
pub const COL_PNL: &str = "P&L";
pub const COL_OUTCOME: &str = "Trade Outcome";
pub const COL_CONFLUENCES: &str = "Entry Confirmation";
pub const COL_RR: &str = "RR Ratio";

/// Columns that must be present in the header row.
pub const REQUIRED_COLUMNS: &[&str] = &[COL_DATE, COL_PNL, COL_OUTCOME];

/// Errors from the loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read trade log {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("trade log is missing required column '{0}'")]
    MissingColumn(String),
}

/// A loaded trade batch with provenance.
#[derive(Debug, Clone)]
pub struct LoadedTrades {
    pub trades: Vec<Trade>,
    /// Dataset label: name of the directory holding the file.
    pub label: String,
    /// Path the batch was read from.
    pub source: String,
    /// BLAKE3 hash of the raw file bytes.
    pub dataset_hash: String,
    /// Cells that could not be parsed, as `row N: field 'value'`.
    pub warnings: Vec<String>,
}

/// Load and normalize a trade log from disk.
pub fn load_trades(path: &Path) -> Result<LoadedTrades, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let dataset_hash = blake3::hash(&bytes).to_hex().to_string();
    let (trades, warnings) = parse_trades(bytes.as_slice())?;

    tracing::info!(
        path = %path.display(),
        rows = trades.len(),
        degraded_cells = warnings.len(),
        "loaded trade log"
    );

    Ok(LoadedTrades {
        trades,
        label: dataset_label(path),
        source: path.display().to_string(),
        dataset_hash,
        warnings,
    })
}

/// Label for a dataset: the parent directory name, else the file stem.
pub fn dataset_label(path: &Path) -> String {
    path.parent()
        .and_then(|p| p.file_name())
        .or_else(|| path.file_stem())
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "trades".into())
}

/// Column positions resolved from the header row.
struct Columns {
    date: usize,
    pnl: usize,
    outcome: usize,
    confluences: Option<usize>,
    rr: Option<usize>,
}

impl Columns {
    /// Header names match after trimming, ignoring ASCII case and a leading BOM.
    fn resolve(headers: &csv::ByteRecord) -> Result<Self, LoadError> {
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let name = String::from_utf8_lossy(h);
                let name = name.trim_start_matches('\u{feff}').trim().to_ascii_lowercase();
                (name, i)
            })
            .collect();
        let find = |name: &str| index.get(&name.to_ascii_lowercase()).copied();
        let required =
            |name: &str| find(name).ok_or_else(|| LoadError::MissingColumn(name.to_string()));
        Ok(Self {
            date: required(COL_DATE)?,
            pnl: required(COL_PNL)?,
            outcome: required(COL_OUTCOME)?,
            confluences: find(COL_CONFLUENCES),
            rr: find(COL_RR),
        })
    }
}

/// Read one cell as text. Empty cells read as missing; cells that are not
/// valid UTF-8 are missing too, with a warning.
fn cell<'r>(
    record: &'r csv::ByteRecord,
    idx: Option<usize>,
    field: &str,
    row: usize,
    warnings: &mut Vec<String>,
) -> Option<&'r str> {
    let bytes = idx.and_then(|i| record.get(i))?;
    match std::str::from_utf8(bytes) {
        Ok(text) => Some(text).filter(|s| !s.trim().is_empty()),
        Err(_) => {
            tracing::warn!(row, field, "cell is not valid UTF-8; treated as absent");
            warnings.push(format!("row {row}: {field} not valid UTF-8"));
            None
        }
    }
}

/// Parse CSV trade rows from any reader.
///
/// Returns the normalized trades plus a warning per unparsable cell.
pub fn parse_trades<R: Read>(reader: R) -> Result<(Vec<Trade>, Vec<String>), LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let columns = Columns::resolve(rdr.byte_headers()?)?;

    let mut trades = Vec::new();
    let mut warnings = Vec::new();

    for (i, record) in rdr.byte_records().enumerate() {
        let record = record?;
        // 1-based, counting the header as row 1.
        let row = i + 2;

        let w = &mut warnings;
        let raw = RawTrade {
            date: cell(&record, Some(columns.date), COL_DATE, row, w),
            pnl: cell(&record, Some(columns.pnl), COL_PNL, row, w),
            outcome: cell(&record, Some(columns.outcome), COL_OUTCOME, row, w),
            confluences: cell(&record, columns.confluences, COL_CONFLUENCES, row, w),
            rr: cell(&record, columns.rr, COL_RR, row, w),
        };
        let trade = normalize_trade(&raw);

        let degraded = [
            (COL_DATE, raw.date, trade.date.is_none()),
            (COL_PNL, raw.pnl, trade.pnl.is_none()),
            (COL_RR, raw.rr, trade.rr.is_none()),
        ];
        for (field, value, failed) in degraded {
            if let (Some(value), true) = (value, failed) {
                tracing::warn!(row, field, value, "unparsable value treated as absent");
                warnings.push(format!("row {row}: {field} '{value}'"));
            }
        }
        if raw.pnl.is_none() && trade.is_qualifying() {
            tracing::warn!(row, "qualifying trade has no P&L; excluded from pairs and equity");
            warnings.push(format!("row {row}: {COL_PNL} missing"));
        }

        trades.push(trade);
    }

    Ok((trades, warnings))
}
