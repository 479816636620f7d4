use anyhow::{bail, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::ConfigurationError;

/// Top of the normalized score scale.
pub const SCORE_MAX: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOp {
    LessThan(u64),
    LessEqual(u64),
    GreaterThan(u64),
    GreaterEqual(u64),
    Equal(u64),
    Between(u64, u64), // Inclusive range: N-M
}

impl RangeOp {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(val) = s.strip_prefix(">=") {
            Ok(RangeOp::GreaterEqual(val.trim().parse()?))
        } else if let Some(val) = s.strip_prefix("<=") {
            Ok(RangeOp::LessEqual(val.trim().parse()?))
        } else if let Some(val) = s.strip_prefix('>') {
            Ok(RangeOp::GreaterThan(val.trim().parse()?))
        } else if let Some(val) = s.strip_prefix('<') {
            Ok(RangeOp::LessThan(val.trim().parse()?))
        } else if s.contains('-') && !s.starts_with('-') {
            let parts: Vec<&str> = s.split('-').collect();
            if parts.len() != 2 {
                bail!("Invalid range format: {}", s)
            }
            let low: u64 = parts[0].trim().parse()?;
            let high: u64 = parts[1].trim().parse()?;
            if low > high {
                bail!("Range start {} is above range end {}", low, high)
            }
            Ok(RangeOp::Between(low, high))
        } else {
            Ok(RangeOp::Equal(s.parse()?))
        }
    }

    pub fn matches(&self, value: u64) -> bool {
        match self {
            RangeOp::LessThan(n) => value < *n,
            RangeOp::LessEqual(n) => value <= *n,
            RangeOp::GreaterThan(n) => value > *n,
            RangeOp::GreaterEqual(n) => value >= *n,
            RangeOp::Equal(n) => value == *n,
            RangeOp::Between(low, high) => value >= *low && value <= *high,
        }
    }
}

/// A score bucket on the 0..=100 scale.
///
/// Example YAML:
/// ```yaml
/// - range: "46-65"
///   emoji: "🚩"
///   label: Walking Red Flag
///   color: "#fb923c"
///   verdicts:
///     - "You're the reason people have trust issues."
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Tier {
    /// Range expression: "N-M" (inclusive), "N", "<N", "<=N", ">N", ">=N"
    pub range: String,
    pub emoji: String,
    pub label: String,
    pub color: String,

    /// Letter grades, one of which is picked at result time (pitch and roast)
    #[serde(default)]
    pub grades: Vec<String>,

    pub verdicts: Vec<String>,
}

impl Tier {
    pub fn range_op(&self, index: usize) -> Result<RangeOp, ConfigurationError> {
        RangeOp::parse(&self.range).map_err(|e| ConfigurationError::InvalidRange {
            index,
            range: self.range.clone(),
            reason: e.to_string(),
        })
    }

    pub fn pick_verdict<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.verdicts.choose(rng).map(String::as_str)
    }

    pub fn pick_grade<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.grades.choose(rng).map(String::as_str)
    }
}

/// Scale `total` out of `max` onto 0..=100, rounding half up.
/// A zero `max` yields 0.
pub fn normalize(total: u32, max: u32) -> u8 {
    if max == 0 {
        return 0;
    }
    let pct = (f64::from(total) * 100.0 / f64::from(max)).round();
    pct.clamp(0.0, f64::from(SCORE_MAX)) as u8
}

/// The tier whose range contains `score`. Ranges are checked in order and
/// the first match is returned.
pub fn find_tier(score: u8, tiers: &[Tier]) -> Result<&Tier, ConfigurationError> {
    if tiers.is_empty() {
        return Err(ConfigurationError::NoTiers);
    }

    for (i, tier) in tiers.iter().enumerate() {
        if tier.range_op(i)?.matches(u64::from(score)) {
            return Ok(tier);
        }
    }

    Err(ConfigurationError::TierGap(score))
}

/// Check that every score in 0..=100 falls in exactly one tier.
/// Returns all problems at once. Consecutive gap or overlap scores are
/// reported once, at the start of the run.
pub fn check_coverage(tiers: &[Tier]) -> Result<(), Vec<ConfigurationError>> {
    if tiers.is_empty() {
        return Err(vec![ConfigurationError::NoTiers]);
    }

    let mut errors = Vec::new();
    let mut ranges = Vec::new();
    for (i, tier) in tiers.iter().enumerate() {
        match tier.range_op(i) {
            Ok(op) => ranges.push(op),
            Err(e) => errors.push(e),
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut previous: Option<usize> = None;
    for score in 0..=SCORE_MAX {
        let hits = ranges.iter().filter(|r| r.matches(u64::from(score))).count();
        let problem = match hits {
            0 => Some(ConfigurationError::TierGap(score)),
            1 => None,
            _ => Some(ConfigurationError::TierOverlap(score)),
        };
        let kind = hits.min(2);

        if let Some(err) = problem {
            if previous != Some(kind) {
                errors.push(err);
            }
        }
        previous = Some(kind);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
