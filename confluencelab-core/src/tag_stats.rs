//! Single-tag aggregator: win/loss counts per confluence tag.
//!
//! A trade with N tags increments N counters; tag counts are not
//! trade-exclusive. Accumulation covers every qualifying trade; the
//! minimum-sample filter and ordering apply only when building the table.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Tag, Trade};
use crate::timeframe::TimeframeTable;

/// Default minimum trades for a tag to appear in the table.
pub const DEFAULT_MIN_TRADES_SINGLE: usize = 3;

/// Win/loss counters for one tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagStat {
    pub wins: usize,
    pub losses: usize,
}

impl TagStat {
    pub fn total(&self) -> usize {
        self.wins + self.losses
    }

    /// Win rate in percent. Zero for an empty counter.
    pub fn win_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.wins as f64 / total as f64 * 100.0
    }

    fn record(&mut self, win: bool) {
        if win {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
    }
}

/// Accumulated single-tag statistics for one batch of trades.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagStats {
    stats: BTreeMap<Tag, TagStat>,
}

impl TagStats {
    /// Accumulate counters over every qualifying trade.
    pub fn accumulate<'a, I>(trades: I) -> Self
    where
        I: IntoIterator<Item = &'a Trade>,
    {
        let mut stats: BTreeMap<Tag, TagStat> = BTreeMap::new();
        for trade in trades.into_iter().filter(|t| t.is_qualifying()) {
            let win = trade.is_win();
            for tag in &trade.confluences {
                stats.entry(tag.clone()).or_default().record(win);
            }
        }
        Self { stats }
    }

    pub fn get(&self, tag: &str) -> Option<&TagStat> {
        self.stats.get(tag)
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Tag, &TagStat)> {
        self.stats.iter()
    }

    /// Build the presentation table.
    ///
    /// Rows with fewer than `min_trades` trades are dropped. Order: timeframe
    /// priority, then ascending win rate, then tag name.
    pub fn table(&self, min_trades: usize, timeframes: &TimeframeTable) -> Vec<TagRow> {
        let mut rows: Vec<TagRow> = self
            .stats
            .iter()
            .filter(|(_, s)| s.total() >= min_trades)
            .map(|(tag, s)| TagRow {
                tag: tag.clone(),
                wins: s.wins,
                losses: s.losses,
                trades: s.total(),
                win_rate: s.win_rate(),
                priority: timeframes.priority(tag),
            })
            .collect();

        rows.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.win_rate.partial_cmp(&b.win_rate).unwrap_or(Ordering::Equal))
                .then_with(|| a.tag.cmp(&b.tag))
        });
        rows
    }
}

/// One row of the single-tag table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRow {
    pub tag: Tag,
    pub wins: usize,
    pub losses: usize,
    pub trades: usize,
    /// Percent, unrounded.
    pub win_rate: f64,
    /// Timeframe priority used for ordering.
    pub priority: usize,
}
