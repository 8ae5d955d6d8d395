use std::ops::Range;

use crate::error::{EngineError, Result};
use crate::utils::consts::MAX_GROUP_WIDTH;

/// Ordered partition of the bit positions into contiguous groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    widths: Vec<usize>,
}

impl GroupSpec {
    pub fn new(widths: Vec<usize>) -> Result<Self> {
        if widths.is_empty() {
            return Err(EngineError::InvalidGroupSpec(
                "at least one group is required".to_string(),
            ));
        }
        if let Some((group, &w)) = widths
            .iter()
            .enumerate()
            .find(|&(_, &w)| w == 0 || w > MAX_GROUP_WIDTH)
        {
            return Err(EngineError::InvalidGroupSpec(format!(
                "group {} has width {}, must be 1..={}",
                group, w, MAX_GROUP_WIDTH
            )));
        }
        Ok(Self { widths })
    }

    /// `groups` groups of `width` bits each
    pub fn uniform(groups: usize, width: usize) -> Result<Self> {
        Self::new(vec![width; groups])
    }

    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    /// Number of groups K
    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Total bit width L
    pub fn width(&self) -> usize {
        self.widths.iter().sum()
    }

    /// Number of values group `k` can take
    pub fn group_cardinality(&self, k: usize) -> usize {
        1usize << self.widths[k]
    }

    /// Bit ranges of each group, MSB first
    pub fn ranges(&self) -> Vec<Range<usize>> {
        let mut start = 0;
        self.widths
            .iter()
            .map(|&w| {
                let range = start..start + w;
                start += w;
                range
            })
            .collect()
    }
}
