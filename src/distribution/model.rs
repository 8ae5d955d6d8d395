use std::collections::HashMap;

use tracing::debug;

use super::bits::{MAX_BITSTRING_WIDTH, is_binary};
use crate::error::{EngineError, Result};

/// One measured outcome and how often it was observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub bitstring: String,
    pub count: u64,
}

/// Empirical distribution over fixed-width bitstrings.
///
/// Immutable once built. Outcomes keep their load order; zero-count entries
/// are dropped because they can never be drawn. Per-position marginals are
/// computed at construction.
#[derive(Debug, Clone)]
pub struct BitstringDistribution {
    width: usize,
    outcomes: Vec<Outcome>,
    index: HashMap<String, usize>,
    total: u64,
    marginals: Vec<f64>,
}

impl BitstringDistribution {
    pub fn from_counts<I, S>(counts: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut width: Option<usize> = None;
        let mut outcomes = Vec::new();
        let mut index = HashMap::new();
        let mut seen_any = false;

        for (key, count) in counts {
            let bitstring: String = key.into();
            seen_any = true;

            if bitstring.is_empty() || bitstring.len() > MAX_BITSTRING_WIDTH {
                return Err(EngineError::InvalidDistribution(format!(
                    "key '{}' must have 1..={} bits",
                    bitstring, MAX_BITSTRING_WIDTH
                )));
            }
            if !is_binary(&bitstring) {
                return Err(EngineError::InvalidDistribution(format!(
                    "key '{}' is not a bitstring",
                    bitstring
                )));
            }
            match width {
                None => width = Some(bitstring.len()),
                Some(w) if w != bitstring.len() => {
                    return Err(EngineError::InvalidDistribution(format!(
                        "key '{}' has {} bits, expected {}",
                        bitstring,
                        bitstring.len(),
                        w
                    )));
                }
                Some(_) => {}
            }
            if index.contains_key(&bitstring) {
                return Err(EngineError::InvalidDistribution(format!(
                    "duplicate key '{}'",
                    bitstring
                )));
            }

            if count == 0 {
                debug!("Dropping zero-count outcome {}", bitstring);
                // Still reserve the key so duplicates are caught.
                index.insert(bitstring, usize::MAX);
                continue;
            }

            index.insert(bitstring.clone(), outcomes.len());
            outcomes.push(Outcome { bitstring, count });
        }

        if !seen_any {
            return Err(EngineError::InvalidDistribution(
                "no outcomes".to_string(),
            ));
        }
        index.retain(|_, slot| *slot != usize::MAX);

        let total = outcomes
            .iter()
            .try_fold(0u64, |acc, o| acc.checked_add(o.count))
            .ok_or_else(|| {
                EngineError::InvalidDistribution("total overflows u64".to_string())
            })?;
        if total == 0 {
            return Err(EngineError::InvalidDistribution(
                "total count is zero".to_string(),
            ));
        }

        let width = width.unwrap_or_default();
        let mut ones = vec![0u64; width];
        for outcome in &outcomes {
            for (pos, b) in outcome.bitstring.bytes().enumerate() {
                if b == b'1' {
                    ones[pos] += outcome.count;
                }
            }
        }
        let marginals = ones
            .iter()
            .map(|&w| w as f64 / total as f64)
            .collect();

        Ok(Self {
            width,
            outcomes,
            index,
            total,
            marginals,
        })
    }

    /// Bit width L shared by every key
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct outcomes with nonzero count
    pub fn distinct(&self) -> usize {
        self.outcomes.len()
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.outcomes
            .iter()
            .map(|o| (o.bitstring.as_str(), o.count))
    }

    /// Observed count, 0 for unseen bitstrings
    pub fn count(&self, bitstring: &str) -> u64 {
        self.index
            .get(bitstring)
            .map(|&i| self.outcomes[i].count)
            .unwrap_or(0)
    }

    pub fn probability(&self, bitstring: &str) -> f64 {
        self.count(bitstring) as f64 / self.total as f64
    }

    /// Fraction of total weight where `position` is '1'
    pub fn marginal(&self, position: usize) -> Result<f64> {
        self.marginals
            .get(position)
            .copied()
            .ok_or(EngineError::PositionOutOfRange {
                position,
                width: self.width,
            })
    }

    pub fn marginals(&self) -> &[f64] {
        &self.marginals
    }

    /// Most frequent outcome; the first one loaded wins ties
    pub fn top_outcome(&self) -> &Outcome {
        let mut best = &self.outcomes[0];
        for outcome in &self.outcomes[1..] {
            if outcome.count > best.count {
                best = outcome;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_and_marginals() {
        let dist = BitstringDistribution::from_counts([
            ("00", 50u64),
            ("01", 10),
            ("11", 40),
        ])
        .unwrap();
        assert_eq!(dist.width(), 2);
        assert_eq!(dist.total(), 100);
        assert_eq!(dist.distinct(), 3);
        assert!((dist.marginal(0).unwrap() - 0.4).abs() < 1e-12);
        assert!((dist.marginal(1).unwrap() - 0.5).abs() < 1e-12);
        assert!(matches!(
            dist.marginal(2),
            Err(EngineError::PositionOutOfRange { position: 2, width: 2 })
        ));
    }

    #[test]
    fn test_rejects_malformed_tables() {
        let empty: Vec<(&str, u64)> = Vec::new();
        assert!(BitstringDistribution::from_counts(empty).is_err());
        assert!(BitstringDistribution::from_counts([("00", 1u64), ("1", 1)]).is_err());
        assert!(BitstringDistribution::from_counts([("0x", 1u64)]).is_err());
        assert!(BitstringDistribution::from_counts([("01", 0u64), ("10", 0)]).is_err());
        assert!(BitstringDistribution::from_counts([("01", 1u64), ("01", 2)]).is_err());
    }

    #[test]
    fn test_zero_counts_are_not_outcomes() {
        let dist =
            BitstringDistribution::from_counts([("00", 0u64), ("11", 3)]).unwrap();
        assert_eq!(dist.distinct(), 1);
        assert_eq!(dist.count("00"), 0);
        assert_eq!(dist.count("11"), 3);
        assert!(BitstringDistribution::from_counts([("00", 0u64), ("00", 3)]).is_err());
    }

    #[test]
    fn test_top_outcome_prefers_first_on_ties() {
        let dist = BitstringDistribution::from_counts([
            ("10", 5u64),
            ("01", 7),
            ("11", 7),
        ])
        .unwrap();
        assert_eq!(dist.top_outcome().bitstring, "01");
    }
}
