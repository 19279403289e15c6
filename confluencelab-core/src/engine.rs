//! Aggregation engine: one accumulation pass, many filtered queries.
//!
//! `Aggregates::accumulate` walks the trade batch once and owns every
//! statistic derived from it. Filters live in [`QueryParams`] and are applied
//! by [`Aggregates::query`], which never touches the trades again. Loading a
//! new batch means building a new `Aggregates`; nothing is merged.

use serde::{Deserialize, Serialize};

use crate::domain::Trade;
use crate::equity::{equity_curve, monthly_pnl, summarize, EquityPoint, EquitySummary, MonthlyPnl};
use crate::pair_stats::{PairQuery, PairRow, PairStats};
use crate::tag_stats::{TagRow, TagStats, DEFAULT_MIN_TRADES_SINGLE};
use crate::timeframe::TimeframeTable;

/// Presentation-time parameters for both tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    pub min_trades_single: usize,
    pub pairs: PairQuery,
    pub timeframes: TimeframeTable,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            min_trades_single: DEFAULT_MIN_TRADES_SINGLE,
            pairs: PairQuery::default(),
            timeframes: TimeframeTable::default(),
        }
    }
}

/// Everything accumulated from one trade batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregates {
    /// Rows in the batch, qualifying or not.
    pub trade_count: usize,
    /// Rows with a Win or Loss outcome.
    pub qualifying_count: usize,
    pub tags: TagStats,
    pub pairs: PairStats,
    pub equity: Vec<EquityPoint>,
    pub monthly: Vec<MonthlyPnl>,
    pub summary: EquitySummary,
}

/// Filtered, ordered tables ready for rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryTables {
    pub tags: Vec<TagRow>,
    pub pairs: Vec<PairRow>,
}

impl Aggregates {
    /// Single pass over the batch.
    pub fn accumulate(trades: &[Trade]) -> Self {
        let qualifying_count = trades.iter().filter(|t| t.is_qualifying()).count();
        let equity = equity_curve(trades);
        let summary = summarize(&equity);

        let aggregates = Self {
            trade_count: trades.len(),
            qualifying_count,
            tags: TagStats::accumulate(trades),
            pairs: PairStats::accumulate(trades),
            monthly: monthly_pnl(trades),
            equity,
            summary,
        };

        tracing::info!(
            trades = aggregates.trade_count,
            qualifying = aggregates.qualifying_count,
            tags = aggregates.tags.len(),
            pairs = aggregates.pairs.len(),
            "accumulated confluence statistics"
        );
        aggregates
    }

    pub fn tag_table(&self, min_trades: usize, timeframes: &TimeframeTable) -> Vec<TagRow> {
        self.tags.table(min_trades, timeframes)
    }

    pub fn pair_table(&self, query: &PairQuery) -> Vec<PairRow> {
        self.pairs.table(query)
    }

    /// Apply both table filters.
    pub fn query(&self, params: &QueryParams) -> QueryTables {
        QueryTables {
            tags: self.tag_table(params.min_trades_single, &params.timeframes),
            pairs: self.pair_table(&params.pairs),
        }
    }
}

/// Accumulate a batch and query it in one call.
pub fn analyze(trades: &[Trade], params: &QueryParams) -> (Aggregates, QueryTables) {
    let aggregates = Aggregates::accumulate(trades);
    let tables = aggregates.query(params);
    (aggregates, tables)
}
