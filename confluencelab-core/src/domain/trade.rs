//! Trade: one normalized row of the trade log.

use super::outcome::Outcome;
use super::Tag;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A closed trade after field normalization.
///
/// Every field that can fail to parse is optional: a malformed value
/// becomes `None` and the rest of the row still contributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Entry/close timestamp, `None` if unparsable.
    pub date: Option<NaiveDateTime>,
    /// Signed profit/loss in account currency, `None` if non-numeric.
    pub pnl: Option<f64>,
    pub outcome: Outcome,
    /// Reward per unit of risk, `None` if missing or malformed.
    pub rr: Option<f64>,
    /// Trimmed, non-empty, de-duplicated tags in order of first appearance.
    pub confluences: Vec<Tag>,
}

impl Trade {
    /// Whether this trade counts toward any statistic (outcome is Win or Loss).
    pub fn is_qualifying(&self) -> bool {
        self.outcome.is_qualifying()
    }

    pub fn is_win(&self) -> bool {
        self.outcome.is_win()
    }
}
