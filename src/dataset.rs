//! JSON dataset: distribution tables, decoder lookup tables and angle
//! sweeps, as supplied by the data collaborator. Only the CLI reads files;
//! the engine itself takes already-built structures.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::decoder::{Decoder, GroupSpec};
use crate::distribution::DistributionStore;
use crate::error::{EngineError, Result};
use crate::selector::InterferenceSelector;

const DEMO_DATASET: &str = include_str!("../data/demo.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderTable {
    pub widths: Vec<usize>,
    pub tables: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Rotation angle in radians
    pub angle: f64,
    pub distribution: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub distributions: BTreeMap<String, BTreeMap<String, u64>>,
    #[serde(default)]
    pub decoders: BTreeMap<String, DecoderTable>,
    #[serde(default)]
    pub sweeps: BTreeMap<String, Vec<SweepPoint>>,
}

impl Dataset {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let dataset = Self::from_json(&text)?;
        info!(
            "Read dataset {}: {} distributions, {} decoders, {} sweeps",
            path.display(),
            dataset.distributions.len(),
            dataset.decoders.len(),
            dataset.sweeps.len()
        );
        Ok(dataset)
    }

    /// The small dataset bundled with the binary
    pub fn demo() -> Result<Self> {
        Self::from_json(DEMO_DATASET)
    }

    pub fn store(&self) -> Result<DistributionStore> {
        let mut store = DistributionStore::new();
        for (name, counts) in &self.distributions {
            store.insert(
                name,
                counts
                    .iter()
                    .map(|(k, &v)| (k.clone(), v)),
            )?;
        }
        Ok(store)
    }

    pub fn decoder(&self, name: &str) -> Result<Decoder<String>> {
        let table = self
            .decoders
            .get(name)
            .ok_or_else(|| EngineError::Dataset(format!("no decoder named '{}'", name)))?;
        let spec = GroupSpec::new(table.widths.clone())?;
        Decoder::new(spec, table.tables.clone())
    }

    pub fn selector(
        &self,
        name: &str,
        store: &DistributionStore,
    ) -> Result<InterferenceSelector> {
        let sweep = self
            .sweeps
            .get(name)
            .ok_or_else(|| EngineError::Dataset(format!("no sweep named '{}'", name)))?;
        let points = sweep
            .iter()
            .map(|p| Ok((p.angle, store.get(&p.distribution)?)))
            .collect::<Result<Vec<(f64, Arc<_>)>>>()?;
        InterferenceSelector::new(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_dataset_is_consistent() {
        let dataset = Dataset::demo().unwrap();
        let store = dataset.store().unwrap();
        assert!(!store.is_empty());

        for name in dataset.decoders.keys() {
            dataset.decoder(name).unwrap();
        }
        for name in dataset.sweeps.keys() {
            let selector = dataset.selector(name, &store).unwrap();
            assert_eq!(selector.len(), 5);
        }
    }

    #[test]
    fn test_missing_entries() {
        let dataset = Dataset::from_json(r#"{ "distributions": { "a": { "0": 1 } } }"#).unwrap();
        let store = dataset.store().unwrap();
        assert!(matches!(dataset.decoder("poem"), Err(EngineError::Dataset(_))));
        assert!(dataset.selector("sweep", &store).is_err());
    }

    #[test]
    fn test_bad_table_is_rejected() {
        let dataset =
            Dataset::from_json(r#"{ "distributions": { "a": { "0": 1, "11": 2 } } }"#).unwrap();
        assert!(matches!(
            dataset.store(),
            Err(EngineError::InvalidDistribution(_))
        ));
        assert!(Dataset::from_json("not json").is_err());
    }
}
