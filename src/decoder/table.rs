// Decoder: GroupSpec + one lookup table per group

use super::group::GroupSpec;
use crate::distribution::bits::parse_value;
use crate::error::{EngineError, Result};
use crate::sampling::Draw;

/// Maps each group of a bitstring through its lookup table.
///
/// Tables are checked once at construction, so decoding a well-formed
/// bitstring cannot index out of bounds.
#[derive(Debug, Clone)]
pub struct Decoder<T> {
    spec: GroupSpec,
    tables: Vec<Vec<T>>,
}

impl<T: Clone> Decoder<T> {
    pub fn new(spec: GroupSpec, tables: Vec<Vec<T>>) -> Result<Self> {
        check_tables(&spec, &tables)?;
        Ok(Self { spec, tables })
    }

    pub fn spec(&self) -> &GroupSpec {
        &self.spec
    }

    pub fn tables(&self) -> &[Vec<T>] {
        &self.tables
    }

    /// Bit width the decoder expects
    pub fn width(&self) -> usize {
        self.spec.width()
    }

    /// Integer value of each group
    pub fn group_values(&self, bitstring: &str) -> Result<Vec<usize>> {
        group_values(bitstring, &self.spec)
    }

    pub fn decode(&self, bitstring: &str) -> Result<Vec<T>> {
        let values = self.group_values(bitstring)?;
        Ok(values
            .into_iter()
            .zip(&self.tables)
            .map(|(v, table)| table[v].clone())
            .collect())
    }

    pub fn decode_draw(&self, draw: &Draw) -> Result<Vec<T>> {
        self.decode(&draw.bitstring)
    }
}

impl Decoder<u8> {
    /// Pixel decoder: each group's value scaled linearly onto 0..=255
    pub fn linear_intensity(spec: GroupSpec) -> Self {
        let tables = spec
            .widths()
            .iter()
            .map(|&w| {
                let max = (1u32 << w) - 1;
                (0..=max)
                    .map(|v| (v * 255 / max) as u8)
                    .collect()
            })
            .collect();
        Self { spec, tables }
    }
}

/// Decode without building a [`Decoder`]; the tables are checked on every
/// call.
pub fn decode<T: Clone>(
    bitstring: &str,
    spec: &GroupSpec,
    tables: &[Vec<T>],
) -> Result<Vec<T>> {
    check_tables(spec, tables)?;
    let values = group_values(bitstring, spec)?;
    Ok(values
        .into_iter()
        .zip(tables)
        .map(|(v, table)| table[v].clone())
        .collect())
}

fn check_tables<T>(spec: &GroupSpec, tables: &[Vec<T>]) -> Result<()> {
    if tables.len() != spec.len() {
        return Err(EngineError::InvalidGroupSpec(format!(
            "{} groups but {} lookup tables",
            spec.len(),
            tables.len()
        )));
    }
    for (group, table) in tables.iter().enumerate() {
        let required = spec.group_cardinality(group);
        if table.len() < required {
            return Err(EngineError::GroupIndexOutOfRange {
                group,
                len: table.len(),
                required,
            });
        }
    }
    Ok(())
}

/// Integer value of each group of `bitstring` under `spec`
pub fn group_values(bitstring: &str, spec: &GroupSpec) -> Result<Vec<usize>> {
    if bitstring.len() != spec.width() {
        return Err(EngineError::InvalidBitstring {
            bitstring: bitstring.to_string(),
            reason: format!(
                "has {} bits, decoder expects {}",
                bitstring.len(),
                spec.width()
            ),
        });
    }
    spec.ranges()
        .into_iter()
        .map(|range| {
            // Byte slicing is safe only for ASCII; parse_value rejects the rest
            let bits = bitstring
                .get(range)
                .ok_or_else(|| EngineError::InvalidBitstring {
                    bitstring: bitstring.to_string(),
                    reason: "not ASCII".to_string(),
                })?;
            parse_value(bits).map(|v| v as usize)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters() -> Vec<String> {
        ["a", "b", "c", "d"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_single_group_lookup() {
        let spec = GroupSpec::new(vec![2]).unwrap();
        assert_eq!(decode("10", &spec, &[letters()]).unwrap(), vec!["c"]);
    }

    #[test]
    fn test_multi_group_lookup() {
        let spec = GroupSpec::new(vec![1, 2]).unwrap();
        let decoder =
            Decoder::new(spec, vec![vec!["off", "on"], vec!["w", "x", "y", "z"]]).unwrap();
        assert_eq!(decoder.decode("111").unwrap(), vec!["on", "z"]);
        assert_eq!(decoder.decode("001").unwrap(), vec!["off", "x"]);
        assert_eq!(decoder.group_values("110").unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_undersized_table_fails_at_construction() {
        let spec = GroupSpec::new(vec![2]).unwrap();
        let err = Decoder::new(spec.clone(), vec![vec!["a", "b", "c"]]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::GroupIndexOutOfRange {
                group: 0,
                len: 3,
                required: 4
            }
        ));
        assert!(Decoder::new(spec, vec![letters(), letters()]).is_err());
    }

    #[test]
    fn test_rejects_wrong_bitstrings() {
        let decoder = Decoder::new(GroupSpec::new(vec![2]).unwrap(), vec![letters()]).unwrap();
        assert!(decoder.decode("1").is_err());
        assert!(decoder.decode("1x").is_err());
        assert!(decoder.decode("é").is_err());
    }

    #[test]
    fn test_linear_intensity() {
        let decoder = Decoder::linear_intensity(GroupSpec::new(vec![1, 2]).unwrap());
        assert_eq!(decoder.decode("111").unwrap(), vec![255, 255]);
        assert_eq!(decoder.decode("001").unwrap(), vec![0, 85]);
    }
}
