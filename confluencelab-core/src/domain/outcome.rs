//! Outcome: normalized trade result label.

use serde::{Deserialize, Serialize};

/// Result of a closed trade after normalization.
///
/// Only `Win` and `Loss` participate in any statistic. Every other label
/// (break-even, scratch, cancelled, ...) is kept as `Other` so it can still
/// be reported, but is excluded from aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    Other(String),
}

impl Outcome {
    /// Build an outcome from an already title-cased label.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Win" => Self::Win,
            "Loss" => Self::Loss,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether this outcome takes part in win/loss statistics.
    pub fn is_qualifying(&self) -> bool {
        matches!(self, Self::Win | Self::Loss)
    }

    pub fn is_win(&self) -> bool {
        matches!(self, Self::Win)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Win => "Win",
            Self::Loss => "Loss",
            Self::Other(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_and_loss_qualify() {
        assert!(Outcome::Win.is_qualifying());
        assert!(Outcome::Loss.is_qualifying());
        assert!(!Outcome::Other("Breakeven".into()).is_qualifying());
    }

    #[test]
    fn from_label_is_exact() {
        assert_eq!(Outcome::from_label("Win"), Outcome::Win);
        assert_eq!(Outcome::from_label("Loss"), Outcome::Loss);
        assert_eq!(
            Outcome::from_label("win"),
            Outcome::Other("win".into()),
            "labels must be title-cased before mapping"
        );
    }
}
