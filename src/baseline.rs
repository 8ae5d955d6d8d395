//! Classical baseline: a correlation-free control built from a measured
//! distribution's per-group marginals.
//!
//! Each group is sampled independently from its own marginal and the group
//! values are concatenated. Single-group statistics match the source
//! exactly; the joint structure between groups is gone.

use std::sync::Arc;

use tracing::debug;

use crate::decoder::{GroupSpec, group_values};
use crate::distribution::BitstringDistribution;
use crate::distribution::bits::{format_value, parse_value};
use crate::error::{EngineError, Result};
use crate::sampling::{Draw, RandomSource, Sampler};

/// Per-group value counts: `counts[k][v]` sums the counts of every
/// bitstring whose group `k` equals `v`.
pub fn group_counts(
    dist: &BitstringDistribution,
    spec: &GroupSpec,
) -> Result<Vec<Vec<u64>>> {
    if dist.width() != spec.width() {
        return Err(EngineError::InvalidGroupSpec(format!(
            "groups cover {} bits, distribution has {}",
            spec.width(),
            dist.width()
        )));
    }
    let ranges = spec.ranges();
    let mut counts: Vec<Vec<u64>> = (0..spec.len())
        .map(|k| vec![0u64; spec.group_cardinality(k)])
        .collect();

    for (bitstring, count) in dist.iter() {
        for (k, range) in ranges.iter().enumerate() {
            let value = parse_value(&bitstring[range.clone()])? as usize;
            counts[k][value] += count;
        }
    }
    Ok(counts)
}

/// Per-group marginal probabilities of the source distribution
pub fn group_marginals(
    dist: &BitstringDistribution,
    spec: &GroupSpec,
) -> Result<Vec<Vec<f64>>> {
    let total = dist.total() as f64;
    Ok(group_counts(dist, spec)?
        .into_iter()
        .map(|group| {
            group
                .into_iter()
                .map(|c| c as f64 / total)
                .collect()
        })
        .collect())
}

pub struct IndependentSampler {
    source: Arc<BitstringDistribution>,
    spec: GroupSpec,
    counts: Vec<Vec<u64>>,
    cumulative: Vec<Vec<u64>>,
}

impl IndependentSampler {
    pub fn from_distribution(
        source: Arc<BitstringDistribution>,
        spec: GroupSpec,
    ) -> Result<Self> {
        let counts = group_counts(&source, &spec)?;
        let cumulative = counts
            .iter()
            .map(|group| {
                group
                    .iter()
                    .scan(0u64, |acc, &c| {
                        *acc += c;
                        Some(*acc)
                    })
                    .collect()
            })
            .collect();
        debug!(
            "Built classical baseline over {} groups ({} bits)",
            spec.len(),
            spec.width()
        );
        Ok(Self {
            source,
            spec,
            counts,
            cumulative,
        })
    }

    pub fn spec(&self) -> &GroupSpec {
        &self.spec
    }

    pub fn source(&self) -> &Arc<BitstringDistribution> {
        &self.source
    }

    /// Probability that group `k` takes value `v`
    pub fn group_marginal(&self, k: usize, v: usize) -> f64 {
        self.counts
            .get(k)
            .and_then(|group| group.get(v))
            .map(|&c| c as f64 / self.source.total() as f64)
            .unwrap_or(0.0)
    }

    pub fn group_marginals(&self) -> Vec<Vec<f64>> {
        let total = self.source.total() as f64;
        self.counts
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|&c| c as f64 / total)
                    .collect()
            })
            .collect()
    }

    /// Product of the group marginals: the probability of `bitstring` under
    /// the baseline
    pub fn independent_probability(&self, bitstring: &str) -> Result<f64> {
        let values = group_values(bitstring, &self.spec)?;
        Ok(values
            .into_iter()
            .enumerate()
            .map(|(k, v)| self.group_marginal(k, v))
            .product())
    }

    /// Synthetic draw. `count` is how often the synthetic bitstring was seen
    /// in the measured source, which may be zero.
    pub fn draw<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Draw {
        let total = self.source.total();
        let mut bitstring = String::with_capacity(self.spec.width());
        for (k, cumulative) in self.cumulative.iter().enumerate() {
            let u = rng.next_below(total);
            let value = cumulative
                .partition_point(|&c| c <= u)
                .min(cumulative.len() - 1);
            bitstring.push_str(&format_value(value as u64, self.spec.widths()[k]));
        }
        let count = self.source.count(&bitstring);
        Draw::new(bitstring, count, total)
    }
}

impl Sampler for IndependentSampler {
    fn width(&self) -> usize {
        self.spec.width()
    }

    fn sample(&self, rng: &mut dyn RandomSource) -> Draw {
        self.draw(rng)
    }

    fn label(&self) -> &str {
        "classical"
    }
}
