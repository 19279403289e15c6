//! Pair aggregator: statistics for every unordered pair of confluence tags
//! that appeared together on a trade.
//!
//! Per qualifying trade with a P&L:
//! 1. de-duplicate and sort its tags
//! 2. form every 2-combination (`k*(k-1)/2` for `k` distinct tags)
//! 3. append the trade's P&L (and RR, when known) to each pair's samples
//!
//! Accumulation never looks at filters. [`PairQuery`] is applied afterwards
//! by [`PairStats::table`], so changing a filter only re-queries.
//!
//! The profitability verdict compares the observed win rate against the
//! breakeven win rate implied by the average reward-to-risk ratio:
//! `breakeven = 100 / (1 + avg_rr)`. With RR 1:1 a pair needs to win more
//! than half its trades; with RR 1:2 a third is enough.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Tag, Trade};
use crate::timeframe::TimeframeFilter;

/// Default minimum trades for a pair to appear in the table.
pub const DEFAULT_MIN_TRADES_PAIR: usize = 1;

/// Canonical unordered pair of two distinct tags, `a < b`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    pub a: Tag,
    pub b: Tag,
}

impl PairKey {
    /// Build a canonical key. Returns `None` for a self-pair.
    pub fn new(x: &str, y: &str) -> Option<Self> {
        match x.cmp(y) {
            Ordering::Less => Some(Self {
                a: x.to_string(),
                b: y.to_string(),
            }),
            Ordering::Greater => Some(Self {
                a: y.to_string(),
                b: x.to_string(),
            }),
            Ordering::Equal => None,
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.a, self.b)
    }
}

/// Profitability verdict for a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Yes,
    No,
    /// No usable RR samples, so no breakeven threshold exists.
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
            Self::NotAvailable => "N/A",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum win rate (percent) for non-negative expectancy at a given
/// average reward-to-risk ratio.
///
/// `None` when `1 + avg_rr` is not positive, where no threshold exists.
pub fn breakeven_win_rate(avg_rr: f64) -> Option<f64> {
    let denom = 1.0 + avg_rr;
    if !denom.is_finite() || denom <= 0.0 {
        return None;
    }
    Some(100.0 / denom)
}

/// Compare a win rate against the breakeven implied by `avg_rr`.
///
/// Strictly greater wins: a pair sitting exactly on breakeven is `No`.
pub fn verdict(win_rate: f64, avg_rr: Option<f64>) -> Verdict {
    match avg_rr.and_then(breakeven_win_rate) {
        Some(breakeven) if win_rate > breakeven => Verdict::Yes,
        Some(_) => Verdict::No,
        None => Verdict::NotAvailable,
    }
}

/// Raw accumulated samples for one pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairStat {
    pub wins: usize,
    pub losses: usize,
    pub pnl_samples: Vec<f64>,
    pub rr_samples: Vec<f64>,
}

impl PairStat {
    pub fn total(&self) -> usize {
        self.wins + self.losses
    }

    pub fn win_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.wins as f64 / total as f64 * 100.0
    }

    pub fn avg_pnl(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.pnl_samples.iter().sum::<f64>() / total as f64
    }

    /// Mean RR over trades that recorded one; `None` when there were none.
    pub fn avg_rr(&self) -> Option<f64> {
        if self.rr_samples.is_empty() {
            return None;
        }
        Some(self.rr_samples.iter().sum::<f64>() / self.rr_samples.len() as f64)
    }

    pub fn breakeven_win_rate(&self) -> Option<f64> {
        self.avg_rr().and_then(breakeven_win_rate)
    }

    pub fn verdict(&self) -> Verdict {
        verdict(self.win_rate(), self.avg_rr())
    }

    fn record(&mut self, win: bool, pnl: f64, rr: Option<f64>) {
        self.pnl_samples.push(pnl);
        if let Some(rr) = rr {
            self.rr_samples.push(rr);
        }
        if win {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
    }
}

/// Canonical pairs for one trade: sorted, de-duplicated, all 2-combinations.
pub fn trade_pairs(tags: &[Tag]) -> Vec<PairKey> {
    let mut sorted: Vec<&str> = tags.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();

    let k = sorted.len();
    let mut pairs = Vec::with_capacity(k * k.saturating_sub(1) / 2);
    for i in 0..k {
        for j in (i + 1)..k {
            pairs.push(PairKey {
                a: sorted[i].to_string(),
                b: sorted[j].to_string(),
            });
        }
    }
    pairs
}

/// Presentation-time filters for the pair table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairQuery {
    pub min_trades: usize,
    pub timeframe: TimeframeFilter,
    pub profitable_only: bool,
}

impl Default for PairQuery {
    fn default() -> Self {
        Self {
            min_trades: DEFAULT_MIN_TRADES_PAIR,
            timeframe: TimeframeFilter::All,
            profitable_only: false,
        }
    }
}

impl PairQuery {
    fn retains(&self, key: &PairKey, row: &PairRow) -> bool {
        row.trades >= self.min_trades
            && self.timeframe.retains(&key.a, &key.b)
            && (!self.profitable_only || row.profitable == Verdict::Yes)
    }
}

/// Accumulated pair statistics for one batch of trades.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairStats {
    stats: BTreeMap<PairKey, PairStat>,
    /// Qualifying trades skipped because their P&L was absent.
    skipped_no_pnl: usize,
}

impl PairStats {
    /// Accumulate over every qualifying trade.
    ///
    /// Trades without a P&L are skipped and counted: every pair sample needs
    /// one, so that `wins + losses == pnl_samples.len()` holds for each pair.
    pub fn accumulate<'a, I>(trades: I) -> Self
    where
        I: IntoIterator<Item = &'a Trade>,
    {
        let mut stats: BTreeMap<PairKey, PairStat> = BTreeMap::new();
        let mut skipped_no_pnl = 0;

        for trade in trades.into_iter().filter(|t| t.is_qualifying()) {
            let Some(pnl) = trade.pnl else {
                skipped_no_pnl += 1;
                continue;
            };
            let win = trade.is_win();
            for key in trade_pairs(&trade.confluences) {
                stats.entry(key).or_default().record(win, pnl, trade.rr);
            }
        }

        if skipped_no_pnl > 0 {
            tracing::debug!(skipped_no_pnl, "pair accumulation skipped trades without P&L");
        }

        Self {
            stats,
            skipped_no_pnl,
        }
    }

    pub fn get(&self, key: &PairKey) -> Option<&PairStat> {
        self.stats.get(key)
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn skipped_no_pnl(&self) -> usize {
        self.skipped_no_pnl
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &PairStat)> {
        self.stats.iter()
    }

    /// Build the filtered table, ordered by descending average P&L.
    ///
    /// Ties keep pair-key order, so the same stats always give the same rows.
    pub fn table(&self, query: &PairQuery) -> Vec<PairRow> {
        let mut rows: Vec<PairRow> = self
            .stats
            .iter()
            .filter_map(|(key, stat)| {
                let row = PairRow::from_stat(key, stat);
                query.retains(key, &row).then_some(row)
            })
            .collect();

        // Stable sort: BTreeMap order is the tie-break.
        rows.sort_by(|x, y| y.avg_pnl.total_cmp(&x.avg_pnl));
        rows
    }
}

/// One row of the pair table. Values are unrounded; rounding happens at render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairRow {
    pub confluence_a: Tag,
    pub confluence_b: Tag,
    pub trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub avg_pnl: f64,
    pub avg_rr: Option<f64>,
    pub breakeven_win_rate: Option<f64>,
    pub profitable: Verdict,
}

impl PairRow {
    pub fn from_stat(key: &PairKey, stat: &PairStat) -> Self {
        let win_rate = stat.win_rate();
        let avg_rr = stat.avg_rr();
        Self {
            confluence_a: key.a.clone(),
            confluence_b: key.b.clone(),
            trades: stat.total(),
            wins: stat.wins,
            losses: stat.losses,
            win_rate,
            avg_pnl: stat.avg_pnl(),
            avg_rr,
            breakeven_win_rate: avg_rr.and_then(breakeven_win_rate),
            profitable: verdict(win_rate, avg_rr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Outcome;

    fn trade(outcome: Outcome, pnl: Option<f64>, rr: Option<f64>, tags: &[&str]) -> Trade {
        Trade {
            date: None,
            pnl,
            outcome,
            rr,
            confluences: tags.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn key(a: &str, b: &str) -> PairKey {
        PairKey::new(a, b).unwrap()
    }

    #[test]
    fn pair_key_is_unordered() {
        assert_eq!(PairKey::new("B", "A"), PairKey::new("A", "B"));
        assert_eq!(PairKey::new("A", "A"), None);
    }

    #[test]
    fn combinations_count() {
        let tags: Vec<Tag> = ["D", "A", "C", "B"].iter().map(|s| s.to_string()).collect();
        let pairs = trade_pairs(&tags);
        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[0], key("A", "B"));
        assert_eq!(pairs[5], key("C", "D"));

        assert!(trade_pairs(&[]).is_empty());
        assert!(trade_pairs(&["A".to_string()]).is_empty());
    }

    #[test]
    fn duplicate_tags_pair_once() {
        let tags: Vec<Tag> = ["A", "A", "B"].iter().map(|s| s.to_string()).collect();
        assert_eq!(trade_pairs(&tags), vec![key("A", "B")]);

        let trades = vec![trade(Outcome::Win, Some(10.0), None, &["A", "A", "B"])];
        let stats = PairStats::accumulate(&trades);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats.get(&key("A", "B")).unwrap().total(), 1);
    }

    #[test]
    fn breakeven_at_one_to_one_is_fifty() {
        assert_eq!(breakeven_win_rate(1.0), Some(50.0));
        assert_eq!(verdict(55.0, Some(1.0)), Verdict::Yes);
        assert_eq!(verdict(45.0, Some(1.0)), Verdict::No);
        assert_eq!(verdict(50.0, Some(1.0)), Verdict::No);
    }

    #[test]
    fn no_rr_means_not_available() {
        assert_eq!(verdict(100.0, None), Verdict::NotAvailable);
        assert_eq!(verdict(0.0, None), Verdict::NotAvailable);
    }

    #[test]
    fn degenerate_rr_has_no_breakeven() {
        assert_eq!(breakeven_win_rate(-1.0), None);
        assert_eq!(breakeven_win_rate(-3.0), None);
        assert_eq!(verdict(80.0, Some(-1.0)), Verdict::NotAvailable);
        assert_eq!(breakeven_win_rate(0.0), Some(100.0));
    }

    #[test]
    fn accumulates_samples_and_verdict() {
        let trades = vec![
            trade(Outcome::Win, Some(100.0), Some(2.0), &["1H-Break", "Vol-Spike"]),
            trade(Outcome::Loss, Some(-50.0), Some(1.0), &["Vol-Spike", "1H-Break"]),
            trade(Outcome::Win, Some(60.0), None, &["1H-Break"]),
        ];
        let stats = PairStats::accumulate(&trades);
        assert_eq!(stats.len(), 1);

        let stat = stats.get(&key("1H-Break", "Vol-Spike")).unwrap();
        assert_eq!((stat.wins, stat.losses), (1, 1));
        assert_eq!(stat.pnl_samples, vec![100.0, -50.0]);
        assert!((stat.avg_pnl() - 25.0).abs() < 1e-12);
        assert!((stat.avg_rr().unwrap() - 1.5).abs() < 1e-12);
        assert!((stat.breakeven_win_rate().unwrap() - 40.0).abs() < 1e-12);
        assert_eq!(stat.verdict(), Verdict::Yes);
    }

    #[test]
    fn missing_rr_is_excluded_not_zero() {
        let trades = vec![
            trade(Outcome::Win, Some(10.0), Some(3.0), &["A", "B"]),
            trade(Outcome::Win, Some(10.0), None, &["A", "B"]),
        ];
        let stats = PairStats::accumulate(&trades);
        let stat = stats.get(&key("A", "B")).unwrap();
        assert_eq!(stat.rr_samples.len(), 1);
        assert_eq!(stat.avg_rr(), Some(3.0));
    }

    #[test]
    fn pair_without_rr_reports_not_available() {
        let trades = vec![trade(Outcome::Win, Some(10.0), None, &["A", "B"])];
        let rows = PairStats::accumulate(&trades).table(&PairQuery::default());
        assert_eq!(rows[0].avg_rr, None);
        assert_eq!(rows[0].breakeven_win_rate, None);
        assert_eq!(rows[0].profitable, Verdict::NotAvailable);
    }

    #[test]
    fn trades_without_pnl_are_skipped() {
        let trades = vec![
            trade(Outcome::Win, None, Some(2.0), &["A", "B"]),
            trade(Outcome::Loss, Some(-5.0), None, &["A", "B"]),
        ];
        let stats = PairStats::accumulate(&trades);
        let stat = stats.get(&key("A", "B")).unwrap();
        assert_eq!(stat.total(), 1);
        assert_eq!(stat.pnl_samples.len(), 1);
        assert_eq!(stats.skipped_no_pnl(), 1);
    }

    #[test]
    fn non_qualifying_outcomes_are_ignored() {
        let trades = vec![trade(
            Outcome::Other("Breakeven".into()),
            Some(0.0),
            Some(1.0),
            &["A", "B"],
        )];
        assert!(PairStats::accumulate(&trades).is_empty());
    }

    #[test]
    fn table_sorted_by_avg_pnl_desc() {
        let trades = vec![
            trade(Outcome::Win, Some(10.0), None, &["A", "B"]),
            trade(Outcome::Win, Some(30.0), None, &["C", "D"]),
            trade(Outcome::Loss, Some(-5.0), None, &["E", "F"]),
        ];
        let rows = PairStats::accumulate(&trades).table(&PairQuery::default());
        let pnls: Vec<f64> = rows.iter().map(|r| r.avg_pnl).collect();
        assert_eq!(pnls, vec![30.0, 10.0, -5.0]);
    }

    #[test]
    fn ties_fall_back_to_key_order() {
        let trades = vec![
            trade(Outcome::Win, Some(10.0), None, &["X", "Y"]),
            trade(Outcome::Win, Some(10.0), None, &["A", "B"]),
        ];
        let rows = PairStats::accumulate(&trades).table(&PairQuery::default());
        assert_eq!(rows[0].confluence_a, "A");
        assert_eq!(rows[1].confluence_a, "X");
    }

    #[test]
    fn query_filters() {
        let trades = vec![
            trade(Outcome::Win, Some(10.0), Some(1.0), &["1H-Break", "OB"]),
            trade(Outcome::Win, Some(10.0), Some(1.0), &["1H-Break", "OB"]),
            trade(Outcome::Loss, Some(-10.0), Some(1.0), &["4H-Break", "OB"]),
        ];
        let stats = PairStats::accumulate(&trades);

        let min_two = PairQuery {
            min_trades: 2,
            ..PairQuery::default()
        };
        assert_eq!(stats.table(&min_two).len(), 1);

        let four_hour = PairQuery {
            timeframe: TimeframeFilter::Label("4h".into()),
            ..PairQuery::default()
        };
        let rows = stats.table(&four_hour);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].confluence_a, "4H-Break");

        let profitable = PairQuery {
            profitable_only: true,
            ..PairQuery::default()
        };
        let rows = stats.table(&profitable);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].confluence_a, "1H-Break");
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let stats = PairStats::accumulate(&Vec::<Trade>::new());
        assert!(stats.table(&PairQuery::default()).is_empty());
    }
}
