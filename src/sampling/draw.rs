use crate::distribution::bits::parse_value;

/// One sampling event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    pub bitstring: String,
    /// Observed count of `bitstring` in the source distribution
    pub count: u64,
    /// Total count of the source distribution
    pub total: u64,
}

impl Draw {
    pub fn new(bitstring: impl Into<String>, count: u64, total: u64) -> Self {
        Self {
            bitstring: bitstring.into(),
            count,
            total,
        }
    }

    pub fn probability(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count as f64 / self.total as f64
    }

    /// Integer value of the whole bitstring
    pub fn value(&self) -> Option<u64> {
        parse_value(&self.bitstring).ok()
    }

    pub fn width(&self) -> usize {
        self.bitstring.len()
    }
}

/// Ordered draws without repeats, from a without-replacement pass
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    draws: Vec<Draw>,
    requested: usize,
}

impl SampleSet {
    pub(crate) fn new(draws: Vec<Draw>, requested: usize) -> Self {
        Self { draws, requested }
    }

    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    pub fn into_draws(self) -> Vec<Draw> {
        self.draws
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    /// Size the caller asked for
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// True when fewer draws than requested were returned
    pub fn is_clamped(&self) -> bool {
        self.draws.len() < self.requested
    }

    pub fn bitstrings(&self) -> impl Iterator<Item = &str> {
        self.draws
            .iter()
            .map(|d| d.bitstring.as_str())
    }
}
