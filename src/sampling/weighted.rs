use std::sync::Arc;

use tracing::{trace, warn};

use super::draw::{Draw, SampleSet};
use super::source::RandomSource;
use crate::distribution::BitstringDistribution;
use crate::error::{EngineError, Result};

/// What to do when a without-replacement pass asks for more outcomes than
/// the distribution has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleSizePolicy {
    /// Fail with `InsufficientDistinctOutcomes`
    #[default]
    Strict,
    /// Return every distinct outcome; the set reports itself as clamped
    Clamp,
}

/// Anything the playback scheduler can pull draws from
pub trait Sampler: Send + Sync {
    /// Bit width of produced draws
    fn width(&self) -> usize;

    fn sample(&self, rng: &mut dyn RandomSource) -> Draw;

    fn label(&self) -> &str;
}

/// Single draw by cumulative-weight inversion, linear in the number of
/// distinct outcomes.
pub fn draw_with_replacement<R: RandomSource + ?Sized>(
    dist: &BitstringDistribution,
    rng: &mut R,
) -> Draw {
    let u = rng.next_below(dist.total());
    let mut acc = 0u64;
    let outcomes = dist.outcomes();
    for outcome in outcomes {
        acc += outcome.count;
        if u < acc {
            return Draw::new(outcome.bitstring.clone(), outcome.count, dist.total());
        }
    }
    // u < total always lands above; keep the last outcome for completeness
    let last = &outcomes[outcomes.len() - 1];
    Draw::new(last.bitstring.clone(), last.count, dist.total())
}

/// `n` sequential weighted draws, removing each chosen outcome's weight from
/// the pool before the next one.
pub fn draw_without_replacement<R: RandomSource + ?Sized>(
    dist: &BitstringDistribution,
    n: usize,
    policy: SampleSizePolicy,
    rng: &mut R,
) -> Result<SampleSet> {
    let available = dist.distinct();
    let take = if n > available {
        match policy {
            SampleSizePolicy::Strict => {
                return Err(EngineError::InsufficientDistinctOutcomes {
                    requested: n,
                    available,
                });
            }
            SampleSizePolicy::Clamp => {
                warn!(
                    "Requested {} distinct outcomes, clamping to {}",
                    n, available
                );
                available
            }
        }
    } else {
        n
    };

    let mut pool: Vec<(usize, u64)> = dist
        .outcomes()
        .iter()
        .enumerate()
        .map(|(i, o)| (i, o.count))
        .collect();
    let mut remaining = dist.total();
    let mut draws = Vec::with_capacity(take);

    for _ in 0..take {
        let u = rng.next_below(remaining);
        let mut acc = 0u64;
        let mut picked = pool.len() - 1;
        for (slot, &(_, weight)) in pool.iter().enumerate() {
            acc += weight;
            if u < acc {
                picked = slot;
                break;
            }
        }
        let (index, weight) = pool.remove(picked);
        remaining -= weight;

        let outcome = &dist.outcomes()[index];
        trace!("Drew {} without replacement ({} left)", outcome.bitstring, pool.len());
        draws.push(Draw::new(
            outcome.bitstring.clone(),
            outcome.count,
            dist.total(),
        ));
    }

    Ok(SampleSet::new(draws, n))
}

/// With-replacement sampler over a shared distribution, with a prefix-sum
/// table so each draw is a binary search.
#[derive(Debug, Clone)]
pub struct WeightedSampler {
    dist: Arc<BitstringDistribution>,
    cumulative: Vec<u64>,
    label: String,
}

impl WeightedSampler {
    pub fn new(dist: Arc<BitstringDistribution>) -> Self {
        let cumulative = dist
            .outcomes()
            .iter()
            .scan(0u64, |acc, o| {
                *acc += o.count;
                Some(*acc)
            })
            .collect();
        Self {
            dist,
            cumulative,
            label: "measured".to_string(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn distribution(&self) -> &Arc<BitstringDistribution> {
        &self.dist
    }

    pub fn draw<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Draw {
        let u = rng.next_below(self.dist.total());
        let slot = self
            .cumulative
            .partition_point(|&c| c <= u)
            .min(self.cumulative.len() - 1);
        let outcome = &self.dist.outcomes()[slot];
        Draw::new(outcome.bitstring.clone(), outcome.count, self.dist.total())
    }
}

impl Sampler for WeightedSampler {
    fn width(&self) -> usize {
        self.dist.width()
    }

    fn sample(&self, rng: &mut dyn RandomSource) -> Draw {
        self.draw(rng)
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::source::{SequenceSource, seeded_source};
    use std::collections::HashSet;

    fn skewed() -> BitstringDistribution {
        BitstringDistribution::from_counts([("000", 80u64), ("111", 20)]).unwrap()
    }

    #[test]
    fn test_with_replacement_frequency() {
        let dist = skewed();
        let mut rng = seeded_source(Some(42));
        let hits = (0..1000)
            .filter(|_| draw_with_replacement(&dist, &mut rng).bitstring == "000")
            .count();
        let fraction = hits as f64 / 1000.0;
        assert!((0.75..=0.85).contains(&fraction), "fraction {}", fraction);
    }

    #[test]
    fn test_inversion_boundaries() {
        let dist = skewed();
        let mut src = SequenceSource::new(vec![0, 79, 80, 99]);
        let got: Vec<String> = (0..4)
            .map(|_| draw_with_replacement(&dist, &mut src).bitstring)
            .collect();
        assert_eq!(got, vec!["000", "000", "111", "111"]);
    }

    #[test]
    fn test_prefix_sampler_matches_linear_scan() {
        let dist = Arc::new(
            BitstringDistribution::from_counts([
                ("00", 3u64),
                ("01", 1),
                ("10", 4),
                ("11", 2),
            ])
            .unwrap(),
        );
        let sampler = WeightedSampler::new(dist.clone());
        for u in 0..dist.total() {
            let a = draw_with_replacement(&dist, &mut SequenceSource::new(vec![u]));
            let b = sampler.draw(&mut SequenceSource::new(vec![u]));
            assert_eq!(a, b, "u = {}", u);
        }
    }

    #[test]
    fn test_draw_carries_probability() {
        let dist = skewed();
        let draw = draw_with_replacement(&dist, &mut SequenceSource::new(vec![90]));
        assert_eq!(draw.bitstring, "111");
        assert!((draw.probability() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_without_replacement_two_equal_keys() {
        let dist =
            BitstringDistribution::from_counts([("01", 5u64), ("10", 5)]).unwrap();
        let mut rng = seeded_source(Some(1));
        let set =
            draw_without_replacement(&dist, 2, SampleSizePolicy::Strict, &mut rng)
                .unwrap();
        let mut keys: Vec<&str> = set.bitstrings().collect();
        keys.sort();
        assert_eq!(keys, vec!["01", "10"]);
        assert!(!set.is_clamped());
    }

    #[test]
    fn test_without_replacement_ties_follow_the_source() {
        let dist =
            BitstringDistribution::from_counts([("01", 5u64), ("10", 5)]).unwrap();
        let low = draw_without_replacement(
            &dist,
            1,
            SampleSizePolicy::Strict,
            &mut SequenceSource::new(vec![0]),
        )
        .unwrap();
        let high = draw_without_replacement(
            &dist,
            1,
            SampleSizePolicy::Strict,
            &mut SequenceSource::new(vec![9]),
        )
        .unwrap();
        assert_eq!(low.draws()[0].bitstring, "01");
        assert_eq!(high.draws()[0].bitstring, "10");
    }

    #[test]
    fn test_without_replacement_never_repeats() {
        let dist = BitstringDistribution::from_counts([
            ("000", 500u64),
            ("001", 1),
            ("010", 30),
            ("011", 2),
            ("100", 70),
            ("111", 400),
        ])
        .unwrap();
        let mut rng = seeded_source(Some(9));
        for n in 0..=dist.distinct() {
            let set =
                draw_without_replacement(&dist, n, SampleSizePolicy::Strict, &mut rng)
                    .unwrap();
            let unique: HashSet<&str> = set.bitstrings().collect();
            assert_eq!(set.len(), n);
            assert_eq!(unique.len(), n);
        }
    }

    #[test]
    fn test_insufficient_outcomes() {
        let dist = skewed();
        let mut rng = seeded_source(Some(3));
        let err =
            draw_without_replacement(&dist, 3, SampleSizePolicy::Strict, &mut rng)
                .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientDistinctOutcomes {
                requested: 3,
                available: 2
            }
        ));

        let set =
            draw_without_replacement(&dist, 3, SampleSizePolicy::Clamp, &mut rng)
                .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.requested(), 3);
        assert!(set.is_clamped());
    }
}
