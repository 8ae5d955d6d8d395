//! Basis / interference selector.
//!
//! Holds measured distributions taken at a handful of rotation angles. The
//! selected distribution is always one of the measured points; nothing is
//! interpolated. [`InterferenceSelector::blend_weight`] only drives how two
//! fixed renderings are mixed on screen and has no effect on sampling.

use std::sync::Arc;

use crate::distribution::{BitstringDistribution, Outcome};
use crate::error::{EngineError, Result};

/// Opacities of two candidate renderings at one selector position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendedReading<'a, T> {
    pub first: &'a T,
    pub second: &'a T,
    pub first_opacity: f64,
    pub second_opacity: f64,
}

#[derive(Debug, Clone)]
pub struct InterferenceSelector {
    points: Vec<(f64, Arc<BitstringDistribution>)>,
}

impl InterferenceSelector {
    pub fn new(mut points: Vec<(f64, Arc<BitstringDistribution>)>) -> Result<Self> {
        if points.is_empty() {
            return Err(EngineError::InvalidSelector(
                "no measured points".to_string(),
            ));
        }
        if points.iter().any(|(angle, _)| !angle.is_finite()) {
            return Err(EngineError::InvalidSelector(
                "angles must be finite".to_string(),
            ));
        }
        let width = points[0].1.width();
        if points.iter().any(|(_, d)| d.width() != width) {
            return Err(EngineError::InvalidSelector(
                "all points must share one bit width".to_string(),
            ));
        }
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn angles(&self) -> Vec<f64> {
        self.points.iter().map(|(a, _)| *a).collect()
    }

    pub fn angle_at(&self, index: usize) -> Result<f64> {
        self.check(index)?;
        Ok(self.points[index].0)
    }

    /// The i-th measured distribution, as measured
    pub fn select_at_index(&self, index: usize) -> Result<Arc<BitstringDistribution>> {
        self.check(index)?;
        Ok(self.points[index].1.clone())
    }

    /// Linear position in `[0, 1]`: 0 at the first point, 1 at the last
    pub fn blend_weight(&self, index: usize) -> Result<f64> {
        self.check(index)?;
        if self.points.len() == 1 {
            return Ok(0.0);
        }
        Ok(index as f64 / (self.points.len() - 1) as f64)
    }

    /// Index of the measured point closest to `angle` (slider snapping)
    pub fn nearest_index(&self, angle: f64) -> usize {
        self.points
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (a.0 - angle).abs().total_cmp(&(b.0 - angle).abs()))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    pub fn top_outcome(&self, index: usize) -> Result<Outcome> {
        self.check(index)?;
        Ok(self.points[index].1.top_outcome().clone())
    }

    /// Mix of two fixed renderings at `index`
    pub fn reading<'a, T>(
        &self,
        index: usize,
        first: &'a T,
        second: &'a T,
    ) -> Result<BlendedReading<'a, T>> {
        let w = self.blend_weight(index)?;
        Ok(BlendedReading {
            first,
            second,
            first_opacity: 1.0 - w,
            second_opacity: w,
        })
    }

    fn check(&self, index: usize) -> Result<()> {
        if index >= self.points.len() {
            return Err(EngineError::IndexOutOfRange {
                index,
                len: self.points.len(),
            });
        }
        Ok(())
    }
}
