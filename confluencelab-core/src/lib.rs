//! ConfluenceLab Core: trade normalization and confluence statistics.
//!
//! This crate contains the analysis engine:
//! - Domain types (trades, outcomes, tags)
//! - Field normalizer for currency, outcome, date and RR text
//! - Confluence tag extraction
//! - Timeframe label table (ordering and whole-word filtering)
//! - Single-tag win/loss aggregation
//! - Pair aggregation with breakeven-adjusted profitability verdicts
//! - Equity curve, monthly rollup and summary statistics
//!
//! No I/O happens here; loading and export live in `confluencelab-runner`.

pub mod confluence;
pub mod domain;
pub mod engine;
pub mod equity;
pub mod normalize;
pub mod pair_stats;
pub mod rr;
pub mod tag_stats;
pub mod timeframe;

pub use confluence::extract_confluences;
pub use domain::{Outcome, Tag, Trade};
pub use engine::{analyze, Aggregates, QueryParams, QueryTables};
pub use equity::{EquityPoint, EquitySummary, MonthlyPnl};
pub use normalize::{normalize_trade, RawTrade};
pub use pair_stats::{
    breakeven_win_rate, PairKey, PairQuery, PairRow, PairStat, PairStats, Verdict,
    DEFAULT_MIN_TRADES_PAIR,
};
pub use rr::parse_rr;
pub use tag_stats::{TagRow, TagStat, TagStats, DEFAULT_MIN_TRADES_SINGLE};
pub use timeframe::{TimeframeError, TimeframeFilter, TimeframeTable, DEFAULT_TIMEFRAMES};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: engine outputs can be handed to another thread.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Trade>();
        require_sync::<Trade>();
        require_send::<Aggregates>();
        require_sync::<Aggregates>();
        require_send::<QueryTables>();
        require_sync::<QueryTables>();
        require_send::<QueryParams>();
        require_sync::<QueryParams>();
    }

    /// Accumulation takes only trades; filters cannot leak into it.
    #[test]
    fn accumulation_has_no_filter_parameter() {
        fn _check(trades: &[Trade]) -> Aggregates {
            Aggregates::accumulate(trades)
        }
    }
}
