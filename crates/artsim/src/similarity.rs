//! Partial histogram intersection between descriptors.
//!
//! Each pair of corresponding cells scores
//! `2 * Σ min(a[c], b[c]) / (Σ a + Σ b)` and the descriptor score is the mean
//! over cells. Intersections and totals are integers, so the per-cell term
//! is exactly symmetric.

use crate::descriptor::{CellSummary, Descriptor};
use crate::result::{ArtsimError, ArtsimResult};

/// Similarity of two cells in `[0, 1]`; zero when both are empty
#[must_use]
pub fn cell_similarity(a: &CellSummary, b: &CellSummary) -> f64 {
    let total = a.total() + b.total();
    if total == 0 {
        return 0.0;
    }
    let b_counts = b.dense();
    let intersection: u64 = a
        .entries()
        .iter()
        .map(|entry| u64::from(entry.count.min(b_counts[entry.color.index() as usize])))
        .sum();
    (2 * intersection) as f64 / total as f64
}

/// Similarity of two descriptors in `[0, 1]`
///
/// # Errors
///
/// Returns [`ArtsimError::DescriptorMismatch`] if the cell counts differ
pub fn score_similarity(a: &Descriptor, b: &Descriptor) -> ArtsimResult<f64> {
    if a.cell_count() != b.cell_count() {
        return Err(ArtsimError::DescriptorMismatch {
            left: a.cell_count(),
            right: b.cell_count(),
        });
    }
    let sum: f64 = a
        .cells()
        .iter()
        .zip(b.cells())
        .map(|(left, right)| cell_similarity(left, right))
        .sum();
    Ok(sum / a.cell_count() as f64)
}

/// Alias of [`score_similarity`] for callers that only want the number
///
/// # Errors
///
/// Returns [`ArtsimError::DescriptorMismatch`] if the cell counts differ
pub fn similarity(a: &Descriptor, b: &Descriptor) -> ArtsimResult<f64> {
    score_similarity(a, b)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::color::QuantizedColor;
    use crate::descriptor::ColorCount;

    fn cell(entries: &[([u8; 3], u32)]) -> CellSummary {
        CellSummary::new(entries.iter().map(|&(levels, count)| {
            ColorCount::new(QuantizedColor::try_from(levels).unwrap(), count)
        }))
    }

    fn uniform(grid: u32, entries: &[([u8; 3], u32)]) -> Descriptor {
        let cells = vec![cell(entries); (grid * grid) as usize];
        Descriptor::new(grid, cells).unwrap()
    }

    #[test]
    fn test_identical_cells_score_one() {
        let a = cell(&[([3, 0, 0], 700), ([0, 0, 3], 324)]);
        assert_eq!(cell_similarity(&a, &a), 1.0);
    }

    #[test]
    fn test_empty_cells_score_zero() {
        let empty = CellSummary::default();
        assert_eq!(cell_similarity(&empty, &empty), 0.0);
        let a = cell(&[([1, 1, 1], 10)]);
        assert_eq!(cell_similarity(&a, &empty), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        // intersection = min(6, 2) = 2; totals 10 + 2 -> 4 / 12
        let a = cell(&[([3, 0, 0], 6), ([0, 3, 0], 4)]);
        let b = cell(&[([3, 0, 0], 2)]);
        let score = cell_similarity(&a, &b);
        assert!((score - 4.0 / 12.0).abs() < 1e-12);
        assert_eq!(score, cell_similarity(&b, &a));
    }

    #[test]
    fn test_more_shared_mass_scores_higher() {
        let a = cell(&[([3, 0, 0], 8), ([0, 0, 3], 8)]);
        let less = cell(&[([3, 0, 0], 2), ([0, 3, 0], 14)]);
        let more = cell(&[([3, 0, 0], 6), ([0, 3, 0], 10)]);
        assert!(cell_similarity(&a, &more) > cell_similarity(&a, &less));
    }

    #[test]
    fn test_red_vs_blue_is_zero() {
        let red = uniform(8, &[([3, 0, 0], 1024)]);
        let blue = uniform(8, &[([0, 0, 3], 1024)]);
        assert_eq!(score_similarity(&red, &blue).unwrap(), 0.0);
        assert_eq!(score_similarity(&red, &red).unwrap(), 1.0);
    }

    #[test]
    fn test_mean_over_cells() {
        let red = cell(&[([3, 0, 0], 16)]);
        let blue = cell(&[([0, 0, 3], 16)]);
        let a = Descriptor::new(2, vec![red.clone(), red.clone(), red.clone(), red.clone()]).unwrap();
        let b = Descriptor::new(2, vec![red.clone(), blue.clone(), red, blue]).unwrap();
        assert_eq!(score_similarity(&a, &b).unwrap(), 0.5);
    }

    #[test]
    fn test_mismatched_cell_counts_rejected() {
        let a = uniform(8, &[([3, 0, 0], 1)]);
        let b = uniform(4, &[([3, 0, 0], 1)]);
        let err = score_similarity(&a, &b).unwrap_err();
        assert!(matches!(
            err,
            ArtsimError::DescriptorMismatch {
                left: 64,
                right: 16
            }
        ));
        assert!(similarity(&b, &a).is_err());
    }
}
