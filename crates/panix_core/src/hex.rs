//! Axial hex coordinate utilities.
//!
//! The map uses flat-top hexagons addressed by axial coordinates `(q, r)`.
//! Layout tables are authored in offset (row, column) form and converted
//! once at grid construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Axial hex coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct HexCoord {
    /// Column axis.
    pub q: i32,
    /// Diagonal row axis.
    pub r: i32,
}

impl HexCoord {
    /// Create a new axial coordinate.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Convert an offset layout cell (row, column) to axial.
    ///
    /// `q = col`, `r = row - floor(col / 2)`.
    #[must_use]
    pub const fn from_offset(row: i32, col: i32) -> Self {
        Self {
            q: col,
            r: row - col.div_euclid(2),
        }
    }

    /// Convert back to offset layout `(row, col)`.
    #[must_use]
    pub const fn to_offset(self) -> (i32, i32) {
        (self.r + self.q.div_euclid(2), self.q)
    }

    /// String key `"q,r"` used by the persisted structure table.
    #[must_use]
    pub fn key(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

/// Error parsing a `"q,r"` key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex key '{0}'")]
pub struct ParseHexKeyError(String);

impl FromStr for HexCoord {
    type Err = ParseHexKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (q, r) = s
            .split_once(',')
            .ok_or_else(|| ParseHexKeyError(s.to_string()))?;
        let q = q
            .trim()
            .parse()
            .map_err(|_| ParseHexKeyError(s.to_string()))?;
        let r = r
            .trim()
            .parse()
            .map_err(|_| ParseHexKeyError(s.to_string()))?;
        Ok(Self { q, r })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_axial() {
        assert_eq!(HexCoord::from_offset(0, 0), HexCoord::new(0, 0));
        assert_eq!(HexCoord::from_offset(3, 5), HexCoord::new(5, 1));
        assert_eq!(HexCoord::from_offset(4, 1), HexCoord::new(1, 4));
        assert_eq!(HexCoord::from_offset(9, 9), HexCoord::new(9, 5));
    }

    #[test]
    fn test_offset_round_trip() {
        for row in 0..10 {
            for col in 0..10 {
                let coord = HexCoord::from_offset(row, col);
                assert_eq!(coord.to_offset(), (row, col));
            }
        }
    }

    #[test]
    fn test_key_parse() {
        let coord = HexCoord::new(5, -3);
        assert_eq!(coord.key(), "5,-3");
        assert_eq!("5,-3".parse::<HexCoord>(), Ok(coord));
        assert!("5".parse::<HexCoord>().is_err());
        assert!("a,b".parse::<HexCoord>().is_err());
    }
}
