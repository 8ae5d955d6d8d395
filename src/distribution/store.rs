use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use super::model::BitstringDistribution;
use crate::error::{EngineError, Result};

/// Named distributions, shared read-only once loaded
#[derive(Debug, Default)]
pub struct DistributionStore {
    distributions: HashMap<String, Arc<BitstringDistribution>>,
}

impl DistributionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `counts` and store them under `name`, replacing any
    /// distribution already stored there.
    pub fn insert<I, S>(
        &mut self,
        name: &str,
        counts: I,
    ) -> Result<Arc<BitstringDistribution>>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let dist = BitstringDistribution::from_counts(counts).map_err(|e| match e {
            EngineError::InvalidDistribution(reason) => {
                EngineError::InvalidDistribution(format!("{}: {}", name, reason))
            }
            other => other,
        })?;
        Ok(self.insert_distribution(name, dist))
    }

    pub fn insert_distribution(
        &mut self,
        name: &str,
        dist: BitstringDistribution,
    ) -> Arc<BitstringDistribution> {
        info!(
            "Loaded distribution '{}': {} bits, {} outcomes, {} shots",
            name,
            dist.width(),
            dist.distinct(),
            dist.total()
        );
        let dist = Arc::new(dist);
        self.distributions
            .insert(name.to_string(), dist.clone());
        dist
    }

    pub fn get(&self, name: &str) -> Result<Arc<BitstringDistribution>> {
        self.distributions
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(name.to_string()))
    }

    pub fn total(&self, name: &str) -> Result<u64> {
        Ok(self.get(name)?.total())
    }

    pub fn marginal(&self, name: &str, position: usize) -> Result<f64> {
        self.get(name)?.marginal(position)
    }

    /// Stored names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .distributions
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.distributions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distributions.is_empty()
    }
}
