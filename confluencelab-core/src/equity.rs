//! Equity curve, monthly P&L rollup, and headline summary.
//!
//! Pure functions over qualifying trades that carry a P&L. Trades are
//! ordered by date; undated trades go last in input order and are left out
//! of the monthly rollup since they have no month.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::Trade;

/// One point on the cumulative P&L curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: Option<NaiveDateTime>,
    pub pnl: f64,
    pub equity: f64,
}

/// Summed P&L for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPnl {
    pub year: i32,
    pub month: u32,
    pub trades: usize,
    pub pnl: f64,
}

impl MonthlyPnl {
    /// `YYYY-MM` label.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Headline numbers over the equity-eligible trades.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquitySummary {
    pub total_trades: usize,
    pub total_pnl: f64,
    /// Percent of trades with P&L > 0.
    pub win_rate: f64,
    pub avg_pnl: f64,
    /// Largest peak-to-trough drop of the curve, as a non-positive amount.
    pub max_drawdown: f64,
    /// Trades placed at the end of the curve because their date was unparsable.
    pub undated_trades: usize,
}

/// Qualifying trades with a P&L, sorted by date with undated trades last.
fn dated_order(trades: &[Trade]) -> Vec<(Option<NaiveDateTime>, f64)> {
    let mut rows: Vec<(Option<NaiveDateTime>, f64)> = trades
        .iter()
        .filter(|t| t.is_qualifying())
        .filter_map(|t| t.pnl.map(|pnl| (t.date, pnl)))
        .collect();

    // Stable: equal dates and all undated rows keep input order.
    rows.sort_by(|a, b| match (a.0, b.0) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    rows
}

/// Cumulative P&L in date order.
pub fn equity_curve(trades: &[Trade]) -> Vec<EquityPoint> {
    let mut equity = 0.0;
    dated_order(trades)
        .into_iter()
        .map(|(date, pnl)| {
            equity += pnl;
            EquityPoint { date, pnl, equity }
        })
        .collect()
}

/// P&L summed per calendar month, ascending.
pub fn monthly_pnl(trades: &[Trade]) -> Vec<MonthlyPnl> {
    let mut months: BTreeMap<(i32, u32), (usize, f64)> = BTreeMap::new();
    for trade in trades.iter().filter(|t| t.is_qualifying()) {
        let (Some(date), Some(pnl)) = (trade.date, trade.pnl) else {
            continue;
        };
        let entry = months.entry((date.year(), date.month())).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += pnl;
    }
    months
        .into_iter()
        .map(|((year, month), (trades, pnl))| MonthlyPnl {
            year,
            month,
            trades,
            pnl,
        })
        .collect()
}

/// Largest drop from a running peak. The peak starts at zero equity.
pub fn max_drawdown(curve: &[EquityPoint]) -> f64 {
    let mut peak = 0.0_f64;
    let mut worst = 0.0_f64;
    for point in curve {
        peak = peak.max(point.equity);
        worst = worst.min(point.equity - peak);
    }
    worst
}

/// Summary statistics for an equity curve.
pub fn summarize(curve: &[EquityPoint]) -> EquitySummary {
    let total_trades = curve.len();
    if total_trades == 0 {
        return EquitySummary::default();
    }
    let total_pnl: f64 = curve.iter().map(|p| p.pnl).sum();
    let winners = curve.iter().filter(|p| p.pnl > 0.0).count();
    EquitySummary {
        total_trades,
        total_pnl,
        win_rate: winners as f64 / total_trades as f64 * 100.0,
        avg_pnl: total_pnl / total_trades as f64,
        max_drawdown: max_drawdown(curve),
        undated_trades: curve.iter().filter(|p| p.date.is_none()).count(),
    }
}
