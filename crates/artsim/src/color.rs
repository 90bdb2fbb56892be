//! Quantized colors.
//!
//! Each 8-bit channel is reduced to one of four levels (`value / 64`), giving
//! 64 distinct colors. A color is packed as `r * 16 + g * 4 + b` so cell
//! histograms can be plain fixed-size arrays.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Quantization levels per channel
pub const LEVELS_PER_CHANNEL: u8 = 4;

/// Width of one quantization bucket in 8-bit channel units
pub const LEVEL_WIDTH: u8 = 64;

/// Number of distinct quantized colors
pub const QUANTIZED_COLORS: usize = 64;

/// A color reduced to four levels per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "[u8; 3]", into = "[u8; 3]")]
pub struct QuantizedColor(u8);

impl QuantizedColor {
    /// Quantize an RGB8 pixel
    #[must_use]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_levels_unchecked(r / LEVEL_WIDTH, g / LEVEL_WIDTH, b / LEVEL_WIDTH)
    }

    /// Build from per-channel levels, each in `0..=3`
    #[must_use]
    pub const fn from_levels(r: u8, g: u8, b: u8) -> Option<Self> {
        if r < LEVELS_PER_CHANNEL && g < LEVELS_PER_CHANNEL && b < LEVELS_PER_CHANNEL {
            Some(Self::from_levels_unchecked(r, g, b))
        } else {
            None
        }
    }

    const fn from_levels_unchecked(r: u8, g: u8, b: u8) -> Self {
        Self(r * 16 + g * 4 + b)
    }

    /// Build from a packed index in `0..64`
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        if (index as usize) < QUANTIZED_COLORS {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Packed index in `0..64`
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Per-channel levels `(r, g, b)`
    #[must_use]
    pub const fn levels(self) -> [u8; 3] {
        [self.0 / 16, (self.0 / 4) % 4, self.0 % 4]
    }
}

impl fmt::Display for QuantizedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.levels();
        write!(f, "({r},{g},{b})")
    }
}

impl From<QuantizedColor> for [u8; 3] {
    fn from(color: QuantizedColor) -> Self {
        color.levels()
    }
}

impl TryFrom<[u8; 3]> for QuantizedColor {
    type Error = String;

    fn try_from([r, g, b]: [u8; 3]) -> Result<Self, Self::Error> {
        Self::from_levels(r, g, b)
            .ok_or_else(|| format!("quantized levels must be in 0..=3, got ({r},{g},{b})"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_extremes() {
        assert_eq!(QuantizedColor::from_rgb(0, 0, 0).levels(), [0, 0, 0]);
        assert_eq!(QuantizedColor::from_rgb(255, 255, 255).levels(), [3, 3, 3]);
        assert_eq!(QuantizedColor::from_rgb(255, 0, 0).levels(), [3, 0, 0]);
        assert_eq!(QuantizedColor::from_rgb(0, 0, 255).levels(), [0, 0, 3]);
    }

    #[test]
    fn test_quantize_bucket_edges() {
        assert_eq!(QuantizedColor::from_rgb(63, 64, 127).levels(), [0, 1, 1]);
        assert_eq!(QuantizedColor::from_rgb(128, 191, 192).levels(), [2, 2, 3]);
    }

    #[test]
    fn test_index_packing() {
        let red = QuantizedColor::from_rgb(255, 0, 0);
        assert_eq!(red.index(), 48);
        let blue = QuantizedColor::from_rgb(0, 0, 255);
        assert_eq!(blue.index(), 3);
        assert_eq!(QuantizedColor::from_index(48), Some(red));
        assert_eq!(QuantizedColor::from_index(64), None);
    }

    #[test]
    fn test_levels_roundtrip_all() {
        for index in 0..64u8 {
            let color = QuantizedColor::from_index(index).unwrap();
            let [r, g, b] = color.levels();
            assert_eq!(QuantizedColor::from_levels(r, g, b), Some(color));
        }
    }

    #[test]
    fn test_rejects_out_of_range_levels() {
        assert!(QuantizedColor::from_levels(4, 0, 0).is_none());
        assert!(QuantizedColor::try_from([0, 0, 9]).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(QuantizedColor::from_rgb(255, 0, 0).to_string(), "(3,0,0)");
    }

    #[test]
    fn test_serde_as_level_triple() {
        let color = QuantizedColor::from_rgb(200, 70, 10);
        let json = serde_json::to_string(&color).unwrap();
        assert_eq!(json, "[3,1,0]");
        let parsed: QuantizedColor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, color);
        assert!(serde_json::from_str::<QuantizedColor>("[5,0,0]").is_err());
    }
}
