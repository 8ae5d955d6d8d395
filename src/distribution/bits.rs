// Helpers for '0'/'1' bitstrings (MSB first)

use crate::error::{EngineError, Result};

/// Widest bitstring the engine accepts; values must fit a u64.
pub const MAX_BITSTRING_WIDTH: usize = 64;

/// Check that every character is '0' or '1'
pub fn is_binary(bitstring: &str) -> bool {
    bitstring
        .bytes()
        .all(|b| b == b'0' || b == b'1')
}

/// Parse a bitstring (or a slice of one) as a base-2 integer
pub fn parse_value(bits: &str) -> Result<u64> {
    if bits.is_empty() || bits.len() > MAX_BITSTRING_WIDTH {
        return Err(EngineError::InvalidBitstring {
            bitstring: bits.to_string(),
            reason: format!("width must be 1..={}", MAX_BITSTRING_WIDTH),
        });
    }
    let mut value = 0u64;
    for b in bits.bytes() {
        value = match b {
            b'0' => value << 1,
            b'1' => (value << 1) | 1,
            _ => {
                return Err(EngineError::InvalidBitstring {
                    bitstring: bits.to_string(),
                    reason: format!("unexpected character '{}'", b as char),
                });
            }
        };
    }
    Ok(value)
}

/// Format `value` as a bitstring of exactly `width` characters
pub fn format_value(value: u64, width: usize) -> String {
    (0..width)
        .rev()
        .map(|shift| {
            if shift < 64 && (value >> shift) & 1 == 1 {
                '1'
            } else {
                '0'
            }
        })
        .collect()
}

/// Number of '1' positions
pub fn hamming_weight(bitstring: &str) -> usize {
    bitstring
        .bytes()
        .filter(|&b| b == b'1')
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("0").unwrap(), 0);
        assert_eq!(parse_value("10").unwrap(), 2);
        assert_eq!(parse_value("10110011").unwrap(), 0b10110011);
        assert!(parse_value("").is_err());
        assert!(parse_value("012").is_err());
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(2, 2), "10");
        assert_eq!(format_value(5, 4), "0101");
        assert_eq!(format_value(0, 3), "000");
    }

    #[test]
    fn test_hamming_weight() {
        assert_eq!(hamming_weight("000"), 0);
        assert_eq!(hamming_weight("1011"), 3);
        assert!(is_binary("0101"));
        assert!(!is_binary("01a1"));
    }
}
