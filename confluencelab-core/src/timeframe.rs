//! Timeframe classification of confluence tags.
//!
//! Tags are free text, but traders usually prefix them with the chart
//! timeframe they were observed on (`"1H-Break"`, `"15M FVG"`). Two lookups
//! use that convention:
//! - **priority**: ordering key for the single-tag table, by prefix
//! - **filter**: whole-word label match for the pair table
//!
//! The label list is data, not control flow, so callers can swap it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default labels, shortest to longest timeframe.
pub const DEFAULT_TIMEFRAMES: &[&str] = &[
    "1M", "2M", "3M", "5M", "15M", "30M", "1H", "2H", "4H", "D", "W", "M",
];

/// Errors from timeframe configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeframeError {
    #[error("timeframe table is empty")]
    EmptyTable,
    #[error("timeframe label at position {0} is blank")]
    BlankLabel(usize),
    #[error("duplicate timeframe label '{0}'")]
    DuplicateLabel(String),
    #[error("unknown timeframe '{label}' (valid: all, {valid})")]
    UnknownLabel { label: String, valid: String },
}

/// Ordered timeframe label table. Index in the table is the priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeframeTable {
    labels: Vec<String>,
}

impl TimeframeTable {
    /// Build a table from labels in priority order.
    pub fn new<I, S>(labels: I) -> Result<Self, TimeframeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(TimeframeError::EmptyTable);
        }
        for (i, label) in labels.iter().enumerate() {
            if label.trim().is_empty() {
                return Err(TimeframeError::BlankLabel(i));
            }
            if labels[..i].iter().any(|l| l.eq_ignore_ascii_case(label)) {
                return Err(TimeframeError::DuplicateLabel(label.clone()));
            }
        }
        Ok(Self { labels })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Priority used for every tag that matches no label.
    pub fn unmatched_priority(&self) -> usize {
        self.labels.len()
    }

    /// Index of the first label the tag starts with (case-insensitive).
    ///
    /// Labels are tested in table order and the first match wins, so
    /// `"15M-OB"` lands on `15M` and not on a later `M`.
    pub fn priority(&self, tag: &str) -> usize {
        let tag = tag.to_ascii_uppercase();
        self.labels
            .iter()
            .position(|label| tag.starts_with(&label.to_ascii_uppercase()))
            .unwrap_or_else(|| self.unmatched_priority())
    }

    /// Resolve a label case-insensitively to its canonical spelling.
    pub fn find(&self, label: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|l| l.eq_ignore_ascii_case(label))
            .map(String::as_str)
    }

    /// Parse a filter value against this table.
    pub fn parse_filter(&self, value: &str) -> Result<TimeframeFilter, TimeframeError> {
        let filter: TimeframeFilter = value.parse()?;
        match filter {
            TimeframeFilter::All => Ok(TimeframeFilter::All),
            TimeframeFilter::Label(label) => match self.find(&label) {
                Some(canonical) => Ok(TimeframeFilter::Label(canonical.to_string())),
                None => Err(TimeframeError::UnknownLabel {
                    label,
                    valid: self.labels.join(", "),
                }),
            },
        }
    }
}

impl Default for TimeframeTable {
    fn default() -> Self {
        Self {
            labels: DEFAULT_TIMEFRAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Pair-table timeframe filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeframeFilter {
    /// Keep every pair.
    #[default]
    All,
    /// Keep pairs where either tag contains this label as a whole word.
    Label(String),
}

impl TimeframeFilter {
    /// Whether a pair of tags passes the filter.
    pub fn retains(&self, a: &str, b: &str) -> bool {
        match self {
            Self::All => true,
            Self::Label(label) => contains_word(a, label) || contains_word(b, label),
        }
    }
}

impl FromStr for TimeframeFilter {
    type Err = TimeframeError;

    /// `"all"`, `"show all"` and the empty string mean no filtering; any other
    /// value is taken as a label. Use `TimeframeTable::parse_filter` to also
    /// check the label exists.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") || s.eq_ignore_ascii_case("show all") {
            Ok(Self::All)
        } else {
            Ok(Self::Label(s.to_string()))
        }
    }
}

impl fmt::Display for TimeframeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Label(label) => write!(f, "{label}"),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Case-insensitive whole-word search: `needle` must sit between string
/// edges or non-word characters on both sides. Word characters are Unicode
/// alphanumerics and `_`.
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    let (Some(first), Some(last)) = (needle.chars().next(), needle.chars().next_back()) else {
        return false;
    };
    // ASCII lowering keeps byte offsets aligned with the original text.
    let hay = haystack.to_ascii_lowercase();
    let needle = needle.to_ascii_lowercase();

    let mut start = 0;
    while let Some(offset) = hay[start..].find(&needle) {
        let begin = start + offset;
        let end = begin + needle.len();

        // \b semantics: a boundary exists where word-ness changes.
        let left_ok = hay[..begin]
            .chars()
            .next_back()
            .map_or(true, |c| is_word_char(c) != is_word_char(first));
        let right_ok = hay[end..]
            .chars()
            .next()
            .map_or(true, |c| is_word_char(c) != is_word_char(last));
        if left_ok && right_ok {
            return true;
        }

        start = begin + hay[begin..].chars().next().map_or(1, char::len_utf8);
    }
    false
}
