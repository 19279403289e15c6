//! Risk-reward parsing.
//!
//! Trade logs record RR either as `risk:reward` (`"1:2"`) or as a bare
//! reward-per-unit-risk number (`"2.5"`). Both reduce to a single `f64`.
//! Anything that cannot be read is `None`, never zero: an absent RR must
//! drop out of RR averages rather than drag them down.

/// Parse a risk-reward value into reward per unit of risk.
///
/// Returns `None` for missing input, malformed text, a zero risk leg, or a
/// non-finite result.
pub fn parse_rr(raw: Option<&str>) -> Option<f64> {
    let text = raw?.trim();
    if text.is_empty() {
        return None;
    }

    let ratio = match text.split_once(':') {
        Some((risk, reward)) => {
            // Exactly two legs: "1:2:3" is malformed.
            if reward.contains(':') {
                return None;
            }
            let risk: f64 = risk.trim().parse().ok()?;
            let reward: f64 = reward.trim().parse().ok()?;
            if risk == 0.0 {
                return None;
            }
            reward / risk
        }
        None => text.parse().ok()?,
    };

    ratio.is_finite().then_some(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colon_ratio_is_reward_over_risk() {
        assert_eq!(parse_rr(Some("1:2")), Some(2.0));
        assert_eq!(parse_rr(Some("2:3")), Some(1.5));
        assert_eq!(parse_rr(Some(" 1 : 2.5 ")), Some(2.5));
    }

    #[test]
    fn bare_number() {
        assert_eq!(parse_rr(Some("2")), Some(2.0));
        assert_eq!(parse_rr(Some("2.5")), Some(2.5));
    }

    #[test]
    fn zero_risk_is_absent() {
        assert_eq!(parse_rr(Some("0:5")), None);
    }

    #[test]
    fn missing_or_malformed_is_absent() {
        assert_eq!(parse_rr(None), None);
        assert_eq!(parse_rr(Some("")), None);
        assert_eq!(parse_rr(Some("abc")), None);
        assert_eq!(parse_rr(Some("1:x")), None);
        assert_eq!(parse_rr(Some("1:2:3")), None);
        assert_eq!(parse_rr(Some(":2")), None);
    }

    #[test]
    fn non_finite_is_absent() {
        assert_eq!(parse_rr(Some("inf")), None);
        assert_eq!(parse_rr(Some("NaN")), None);
    }
}
