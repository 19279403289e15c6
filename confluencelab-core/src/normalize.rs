//! Field normalizer: raw trade-log strings in, typed `Trade` out.
//!
//! Every function here is total: malformed input yields `None` (or an
//! `Outcome::Other`) instead of an error, so one bad cell never aborts a
//! pass over the log.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::confluence::extract_confluences;
use crate::domain::{Outcome, Trade};
use crate::rr::parse_rr;

/// Raw, untyped fields of one trade-log row.
#[derive(Debug, Clone, Default)]
pub struct RawTrade<'a> {
    pub date: Option<&'a str>,
    pub pnl: Option<&'a str>,
    pub outcome: Option<&'a str>,
    pub confluences: Option<&'a str>,
    pub rr: Option<&'a str>,
}

/// Datetime layouts tried in order after RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts, interpreted at midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d.%m.%Y"];

/// Normalize a raw row into a `Trade`.
pub fn normalize_trade(raw: &RawTrade<'_>) -> Trade {
    Trade {
        date: raw.date.and_then(parse_date),
        pnl: raw.pnl.and_then(parse_pnl),
        outcome: normalize_outcome(raw.outcome.unwrap_or("")),
        rr: parse_rr(raw.rr),
        confluences: extract_confluences(raw.confluences),
    }
}

/// Parse a currency-formatted amount such as `"$1,234.56"` or `"-$50"`.
///
/// Accounting-style parentheses (`"(12.50)"`) are read as negative.
pub fn parse_pnl(raw: &str) -> Option<f64> {
    let mut text: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();

    let negate = text.starts_with('(') && text.ends_with(')') && text.len() > 2;
    if negate {
        text = text[1..text.len() - 1].to_string();
    }

    let value: f64 = text.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negate { -value } else { value })
}

/// Trim and title-case an outcome label, then map it to `Outcome`.
pub fn normalize_outcome(raw: &str) -> Outcome {
    Outcome::from_label(&title_case(raw.trim()))
}

/// Title-case each whitespace-separated word: `"break EVEN"` → `"Break Even"`.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a trade timestamp in any of the accepted layouts.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}
