use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Uniform integer source that the samplers draw from.
///
/// Every `rand` generator is a source; tests can script exact values with
/// [`SequenceSource`].
pub trait RandomSource {
    /// Uniform integer in `[0, bound)`. `bound` is never zero.
    fn next_below(&mut self, bound: u64) -> u64;
}

impl<R: RngCore> RandomSource for R {
    fn next_below(&mut self, bound: u64) -> u64 {
        self.random_range(0..bound)
    }
}

/// Seeded generator for reproducible runs, or an entropy-seeded one.
pub fn seeded_source(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Replays a fixed list of values (reduced modulo the bound), cycling.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<u64>,
    cursor: usize,
}

impl SequenceSource {
    pub fn new(values: Vec<u64>) -> Self {
        Self { values, cursor: 0 }
    }
}

impl RandomSource for SequenceSource {
    fn next_below(&mut self, bound: u64) -> u64 {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value % bound
    }
}
