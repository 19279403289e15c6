//! End-to-end tests: CSV on disk → analysis → export artifacts.

use std::fs;
use std::path::Path;

use confluencelab_core::Verdict;
use confluencelab_runner::{
    export_json, export_pairs_csv, import_json, load_artifacts, run_analysis, save_artifacts,
    write_pairs_csv, AnalysisConfig, SCHEMA_VERSION,
};

const TRADE_LOG: &str = "\
Date,P&L,Trade Outcome,Entry Confirmation,RR Ratio
2024-01-02,$100.00,Win,\"1H-Break, Vol-Spike\",1:2
2024-01-15,-$50.00,Loss,\"Vol-Spike, 1H-Break\",1:1
2024-02-01,$60.00,win,1H-Break,
2024-02-03,$0.00,Breakeven,\"1H-Break, Vol-Spike\",1:1
not-a-date,\"$1,000.00\",Win,\"4H-OB, Sweep\",2
";

fn write_log(dir: &Path) -> std::path::PathBuf {
    let session = dir.join("london-session");
    fs::create_dir_all(&session).unwrap();
    let path = session.join("trades.csv");
    fs::write(&path, TRADE_LOG).unwrap();
    path
}

fn config(min_single: usize) -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    config.filters.min_trades_single = min_single;
    config
}

#[test]
fn reference_log_end_to_end() {
    let temp = tempfile::tempdir().unwrap();
    let path = write_log(temp.path());

    let result = run_analysis(&path, &config(1)).unwrap();
    assert_eq!(result.label, "london-session");
    assert_eq!(result.trade_count, 5);
    assert_eq!(result.qualifying_count, 4);
    assert_eq!(result.dataset_hash.len(), 64);

    // Highest average P&L first.
    assert_eq!(result.pairs.len(), 2);
    assert_eq!(result.pairs[0].confluence_a, "4H-OB");
    let pair = &result.pairs[1];
    assert_eq!(pair.confluence_a, "1H-Break");
    assert_eq!(pair.confluence_b, "Vol-Spike");
    assert_eq!((pair.wins, pair.losses), (1, 1));
    assert!((pair.avg_pnl - 25.0).abs() < 1e-12);
    assert_eq!(pair.profitable, Verdict::Yes);

    let tag = result.tags.iter().find(|t| t.tag == "1H-Break").unwrap();
    assert_eq!((tag.wins, tag.losses), (2, 1));

    // The undated trade sits at the end of the curve.
    assert_eq!(result.equity.len(), 4);
    assert!(result.equity[3].date.is_none());
    assert!((result.equity[3].equity - 1110.0).abs() < 1e-9);
    assert_eq!(result.monthly.len(), 2);
    assert_eq!(result.data_quality_warnings.len(), 1);
}

#[test]
fn pair_csv_matches_table() {
    let temp = tempfile::tempdir().unwrap();
    let path = write_log(temp.path());
    let result = run_analysis(&path, &config(1)).unwrap();

    let out = temp.path().join("out/pairs.csv");
    write_pairs_csv(&result.pairs, &out).unwrap();
    let written = fs::read_to_string(&out).unwrap();
    assert_eq!(written, export_pairs_csv(&result.pairs).unwrap());

    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "4H-OB,Sweep,1,100.0,1000.00,2.00,Yes");
    assert_eq!(lines[2], "1H-Break,Vol-Spike,2,50.0,25.00,1.50,Yes");
}

#[test]
fn filters_narrow_without_changing_totals() {
    let temp = tempfile::tempdir().unwrap();
    let path = write_log(temp.path());

    let mut narrow = config(1);
    narrow.filters.timeframe = "1h".into();
    narrow.filters.min_trades_pair = 2;
    let narrowed = run_analysis(&path, &narrow).unwrap();
    let full = run_analysis(&path, &config(1)).unwrap();

    assert_eq!(narrowed.pairs.len(), 1);
    assert_eq!(narrowed.pairs[0].confluence_a, "1H-Break");
    assert_eq!(narrowed.summary, full.summary);
    assert_eq!(narrowed.tags, full.tags);
}

#[test]
fn repeated_runs_export_identical_bytes() {
    let temp = tempfile::tempdir().unwrap();
    let path = write_log(temp.path());
    let a = run_analysis(&path, &config(1)).unwrap();
    let b = run_analysis(&path, &config(1)).unwrap();
    assert_eq!(export_pairs_csv(&a.pairs).unwrap(), export_pairs_csv(&b.pairs).unwrap());
    assert_eq!(export_json(&a).unwrap(), export_json(&b).unwrap());
}

#[test]
fn artifacts_round_trip() {
    let temp = tempfile::tempdir().unwrap();
    let path = write_log(temp.path());
    let result = run_analysis(&path, &config(1)).unwrap();

    let out_dir = temp.path().join("results");
    let run_dir = save_artifacts(&result, &out_dir).unwrap();
    for name in ["result.json", "pairs.csv", "tags.csv", "equity.csv", "monthly.csv", "report.md"] {
        assert!(run_dir.join(name).exists(), "missing {name}");
    }

    let loaded = load_artifacts(&run_dir).unwrap();
    assert_eq!(loaded.pairs.len(), result.pairs.len());
    assert_eq!(loaded.label, result.label);

    let report = fs::read_to_string(run_dir.join("report.md")).unwrap();
    assert!(report.contains("# Confluence Report: london-session"));
    assert!(report.contains("| 1H-Break | Vol-Spike | 2 | 50.0 | 25.00 | 1.50 | Yes |"));
}

#[test]
fn newer_schema_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let path = write_log(temp.path());
    let mut result = run_analysis(&path, &config(1)).unwrap();
    result.schema_version = SCHEMA_VERSION + 1;
    let json = export_json(&result).unwrap();
    assert!(import_json(&json).is_err());
}

#[test]
fn log_without_qualifying_trades_gives_empty_tables() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("empty.csv");
    fs::write(
        &path,
        "Date,P&L,Trade Outcome,Entry Confirmation\n2024-01-02,0,Breakeven,\"A, B\"\n",
    )
    .unwrap();

    let result = run_analysis(&path, &AnalysisConfig::default()).unwrap();
    assert!(result.pairs.is_empty());
    assert!(result.tags.is_empty());
    assert_eq!(export_pairs_csv(&result.pairs).unwrap().lines().count(), 1);
}
