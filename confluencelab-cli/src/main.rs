//! ConfluenceLab CLI: analyze a trade log and export confluence statistics.
//!
//! Commands:
//! - `analyze`: print summary, single-confluence table and pair table
//! - `export`: write the pair table to a CSV file
//! - `report`: save the full artifact bundle (JSON, CSVs, Markdown)
//! - `timeframes`: show the timeframe label table and its priorities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use confluencelab_core::{PairRow, TagRow};
use confluencelab_runner::export::{pair_cells, tag_cells, PAIR_COLUMNS, TAG_COLUMNS};
use confluencelab_runner::{
    run_analysis, save_artifacts, write_pairs_csv, AnalysisConfig, AnalysisResult,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "confluencelab",
    about = "ConfluenceLab CLI: which entry confluences actually pay"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a trade log and print the result tables.
    Analyze {
        /// Trade log CSV (Date, P&L, Trade Outcome, Entry Confirmation, RR Ratio).
        input: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Write the filtered pair table to a CSV file.
    Export {
        /// Trade log CSV.
        input: PathBuf,

        /// Destination CSV path.
        #[arg(long, short)]
        output: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Save result.json, CSV tables and a Markdown report.
    Report {
        /// Trade log CSV.
        input: PathBuf,

        /// Output directory for the artifact bundle.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show the timeframe label table used for ordering and filtering.
    Timeframes {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Filter options shared by every analysis command. Flags override the config file.
#[derive(Args)]
struct FilterArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum trades for a confluence to appear in the single-tag table.
    #[arg(long)]
    min_trades_single: Option<usize>,

    /// Minimum trades for a pair to appear in the pair table.
    #[arg(long)]
    min_trades_pair: Option<usize>,

    /// Timeframe filter for pairs: "all" or a label such as 1H, 4H, D.
    #[arg(long)]
    timeframe: Option<String>,

    /// Only show pairs whose win rate beats the breakeven win rate.
    #[arg(long, overrides_with = "no_profitable_only")]
    profitable_only: bool,

    /// Show every pair, even when the config file sets `profitable_only`.
    #[arg(long, overrides_with = "profitable_only")]
    no_profitable_only: bool,
}

impl FilterArgs {
    fn resolve(&self) -> Result<AnalysisConfig> {
        self.apply(load_config(self.config.as_deref())?)
    }

    /// The last of `--profitable-only` / `--no-profitable-only` wins.
    fn profitable_only(&self) -> Option<bool> {
        match (self.profitable_only, self.no_profitable_only) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    fn apply(&self, mut config: AnalysisConfig) -> Result<AnalysisConfig> {
        if let Some(n) = self.min_trades_single {
            config.filters.min_trades_single = n;
        }
        if let Some(n) = self.min_trades_pair {
            config.filters.min_trades_pair = n;
        }
        if let Some(tf) = &self.timeframe {
            config.filters.timeframe = tf.clone();
        }
        if let Some(on) = self.profitable_only() {
            config.filters.profitable_only = on;
        }
        config.validate()?;
        Ok(config)
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("confluencelab=info,warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { input, filters } => run_analyze(&input, &filters),
        Commands::Export {
            input,
            output,
            filters,
        } => run_export(&input, &output, &filters),
        Commands::Report {
            input,
            output_dir,
            filters,
        } => run_report(&input, &output_dir, &filters),
        Commands::Timeframes { config } => run_timeframes(config.as_deref()),
    }
}

fn analyze(input: &Path, filters: &FilterArgs) -> Result<AnalysisResult> {
    let config = filters.resolve()?;
    run_analysis(input, &config).with_context(|| format!("analyzing {}", input.display()))
}

fn run_analyze(input: &Path, filters: &FilterArgs) -> Result<()> {
    let result = analyze(input, filters)?;
    print_summary(&result);
    print_tag_table(&result.tags);
    print_pair_table(&result.pairs);
    Ok(())
}

fn run_export(input: &Path, output: &Path, filters: &FilterArgs) -> Result<()> {
    let result = analyze(input, filters)?;
    if result.pairs.is_empty() {
        tracing::warn!("no confluence pair stats match the filters; writing header only");
    }
    write_pairs_csv(&result.pairs, output)?;
    println!("Saved {} pair rows to {}", result.pairs.len(), output.display());
    Ok(())
}

fn run_report(input: &Path, output_dir: &Path, filters: &FilterArgs) -> Result<()> {
    let result = analyze(input, filters)?;
    print_summary(&result);
    let run_dir = save_artifacts(&result, output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn run_timeframes(config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let table = config.timeframe_table()?;
    println!("{:<10} {:>8}", "Label", "Priority");
    println!("{}", "-".repeat(19));
    for (priority, label) in table.labels().iter().enumerate() {
        println!("{:<10} {:>8}", label, priority);
    }
    println!("{:<10} {:>8}", "(other)", table.unmatched_priority());
    Ok(())
}

fn print_summary(result: &AnalysisResult) {
    let s = &result.summary;
    println!();
    println!("=== Trade Performance: {} ===", result.label);
    println!("Rows:           {}", result.trade_count);
    println!("Win/Loss rows:  {}", result.qualifying_count);
    println!("Total Trades:   {}", s.total_trades);
    println!("Total P&L:      ${:.2}", s.total_pnl);
    println!("Win Rate:       {:.1}%", s.win_rate);
    println!("Avg P&L:        ${:.2}", s.avg_pnl);
    println!("Max Drawdown:   ${:.2}", s.max_drawdown);
    if s.undated_trades > 0 {
        println!("Undated:        {} (placed last on the curve)", s.undated_trades);
    }
    if result.skipped_no_pnl > 0 {
        println!(
            "WARNING: {} win/loss trades had no P&L and were left out of pair stats",
            result.skipped_no_pnl
        );
    }
    println!();
}

/// Render rows as a left-aligned text table sized to its widest cells.
fn print_table<const N: usize>(columns: [&str; N], rows: &[[String; N]]) {
    let mut widths: [usize; N] = columns.map(str::len);
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: &[&str]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths.iter())
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect();
        println!("{}", padded.join("  ").trim_end());
    };

    line(&columns[..]);
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 2 * N.saturating_sub(1)));
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        line(&cells[..]);
    }
}

fn print_tag_table(rows: &[TagRow]) {
    println!("--- Win Rate by Confluence ---");
    if rows.is_empty() {
        println!("(no confluences meet the minimum trade count)");
    } else {
        let cells: Vec<[String; 5]> = rows.iter().map(tag_cells).collect();
        print_table(TAG_COLUMNS, &cells);
    }
    println!();
}

fn print_pair_table(rows: &[PairRow]) {
    println!("--- Confluence Pair Stats ---");
    if rows.is_empty() {
        println!("(no pairs match the current filters)");
    } else {
        let cells: Vec<[String; 7]> = rows.iter().map(pair_cells).collect();
        print_table(PAIR_COLUMNS, &cells);
    }
    println!();
}
