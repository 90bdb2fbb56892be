//! Localized color-coherence descriptors.
//!
//! A [`Descriptor`] holds one [`CellSummary`] per grid cell in row-major
//! order. Each summary lists the most frequent quantized colors in its cell,
//! sorted by descending pixel count with ties broken by ascending color index.

use crate::color::{QuantizedColor, QUANTIZED_COLORS};
use crate::result::{ArtsimError, ArtsimResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Default number of colors kept per cell
pub const DEFAULT_MAX_COLORS: usize = 8;

/// A quantized color and the number of pixels that carry it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorCount {
    /// Quantized color
    pub color: QuantizedColor,
    /// Pixel count
    pub count: u32,
}

impl ColorCount {
    /// Create a new color count
    #[must_use]
    pub const fn new(color: QuantizedColor, count: u32) -> Self {
        Self { color, count }
    }
}

/// Dense per-cell histogram over all 64 quantized colors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellHistogram {
    counts: [u32; QUANTIZED_COLORS],
}

impl Default for CellHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl CellHistogram {
    /// Create an empty histogram
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counts: [0; QUANTIZED_COLORS],
        }
    }

    /// Count one pixel of `color`
    pub fn add(&mut self, color: QuantizedColor) {
        self.add_count(color, 1);
    }

    /// Count `count` pixels of `color`
    pub fn add_count(&mut self, color: QuantizedColor, count: u32) {
        let slot = &mut self.counts[color.index() as usize];
        *slot = slot.saturating_add(count);
    }

    /// Pixel count for `color`
    #[must_use]
    pub fn count(&self, color: QuantizedColor) -> u32 {
        self.counts[color.index() as usize]
    }

    /// Total pixels counted
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    /// Keep the `max_colors` most frequent colors
    #[must_use]
    pub fn summarize(&self, max_colors: usize) -> CellSummary {
        let mut entries: Vec<ColorCount> = self
            .counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .filter_map(|(index, &count)| {
                QuantizedColor::from_index(index as u8).map(|color| ColorCount::new(color, count))
            })
            .collect();

        entries.sort_by(rank_order);
        entries.truncate(max_colors);
        CellSummary { entries }
    }
}

/// Count descending, then color index ascending
fn rank_order(a: &ColorCount, b: &ColorCount) -> Ordering {
    b.count.cmp(&a.count).then(a.color.cmp(&b.color))
}

/// Dominant quantized colors of one grid cell
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<ColorCount>", into = "Vec<ColorCount>")]
pub struct CellSummary {
    entries: Vec<ColorCount>,
}

impl CellSummary {
    /// Build a summary from arbitrary color counts.
    ///
    /// Repeated colors are merged and the result is put in rank order. No cap
    /// is applied.
    #[must_use]
    pub fn new(counts: impl IntoIterator<Item = ColorCount>) -> Self {
        let mut histogram = CellHistogram::new();
        for entry in counts {
            histogram.add_count(entry.color, entry.count);
        }
        histogram.summarize(QUANTIZED_COLORS)
    }

    /// Entries in rank order
    #[must_use]
    pub fn entries(&self) -> &[ColorCount] {
        &self.entries
    }

    /// Number of distinct colors kept
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cell has no colors
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of the kept pixel counts
    #[must_use]
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.count)).sum()
    }

    /// Pixel count kept for `color`, zero when absent
    #[must_use]
    pub fn count_of(&self, color: QuantizedColor) -> u32 {
        self.entries
            .iter()
            .find(|e| e.color == color)
            .map_or(0, |e| e.count)
    }

    /// Most frequent color in the cell
    #[must_use]
    pub fn dominant(&self) -> Option<ColorCount> {
        self.entries.first().copied()
    }

    pub(crate) fn dense(&self) -> [u32; QUANTIZED_COLORS] {
        let mut dense = [0; QUANTIZED_COLORS];
        for entry in &self.entries {
            dense[entry.color.index() as usize] = entry.count;
        }
        dense
    }
}

impl TryFrom<Vec<ColorCount>> for CellSummary {
    type Error = ArtsimError;

    /// Accept serialized entries only when every color appears once with a
    /// non-zero count; the entries are put back in rank order.
    fn try_from(mut entries: Vec<ColorCount>) -> Result<Self, Self::Error> {
        let mut seen = [false; QUANTIZED_COLORS];
        for entry in &entries {
            if entry.count == 0 {
                return Err(ArtsimError::invalid_argument(format!(
                    "color {} has a zero pixel count",
                    entry.color
                )));
            }
            let slot = &mut seen[entry.color.index() as usize];
            if *slot {
                return Err(ArtsimError::invalid_argument(format!(
                    "color {} appears more than once in a cell",
                    entry.color
                )));
            }
            *slot = true;
        }
        entries.sort_by(rank_order);
        Ok(Self { entries })
    }
}

impl From<CellSummary> for Vec<ColorCount> {
    fn from(summary: CellSummary) -> Self {
        summary.entries
    }
}

/// Spatial grid of cell summaries describing one image
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDescriptor")]
pub struct Descriptor {
    grid_size: u32,
    cells: Vec<CellSummary>,
}

#[derive(Deserialize)]
struct RawDescriptor {
    grid_size: u32,
    cells: Vec<CellSummary>,
}

impl TryFrom<RawDescriptor> for Descriptor {
    type Error = ArtsimError;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        Self::new(raw.grid_size, raw.cells)
    }
}

impl Descriptor {
    /// Create a descriptor from `grid_size²` cells in row-major order
    ///
    /// # Errors
    ///
    /// Returns error if the grid size is zero or the cell count does not match
    pub fn new(grid_size: u32, cells: Vec<CellSummary>) -> ArtsimResult<Self> {
        if grid_size == 0 {
            return Err(ArtsimError::invalid_argument("grid size must be at least 1"));
        }
        let expected = (grid_size as usize) * (grid_size as usize);
        if cells.len() != expected {
            return Err(ArtsimError::invalid_argument(format!(
                "grid size {grid_size} needs {expected} cells, got {}",
                cells.len()
            )));
        }
        Ok(Self { grid_size, cells })
    }

    /// Assemble cells produced by a validated extractor
    pub(crate) fn from_grid(grid_size: u32, cells: Vec<CellSummary>) -> Self {
        debug_assert_eq!(cells.len(), (grid_size as usize) * (grid_size as usize));
        Self { grid_size, cells }
    }

    /// Cells per grid side
    #[must_use]
    pub const fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Total number of cells
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// All cells in row-major order
    #[must_use]
    pub fn cells(&self) -> &[CellSummary] {
        &self.cells
    }

    /// Cell at grid `row`, `col`
    #[must_use]
    pub fn cell(&self, row: u32, col: u32) -> Option<&CellSummary> {
        if row >= self.grid_size || col >= self.grid_size {
            return None;
        }
        self.cells.get((row * self.grid_size + col) as usize)
    }

    /// Whether every cell is empty
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.cells.iter().all(CellSummary::is_empty)
    }

    /// Serialize to JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> ArtsimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON, re-checking the cell count
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or describes an invalid grid
    pub fn from_json(json: &str) -> ArtsimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
