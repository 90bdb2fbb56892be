//! Artsim: content-based similarity for artwork galleries.
//!
//! Every image is reduced to a localized color-coherence descriptor: the
//! image is stretched to a canonical square, split into a grid, and each cell
//! keeps its most frequent colors after quantizing every channel to four
//! levels. Descriptors are compared with a per-cell histogram intersection
//! and candidates are ranked by descending score.
//!
//! ```text
//! ┌──────────────┐   ┌─────────────────────┐   ┌───────────────────┐
//! │ ImageSource  │──►│ DescriptorExtractor │──►│ SimilarityRanker  │──► top-K
//! │ path / bytes │   │ 256² → 8×8 cells    │   │ mean cell overlap │
//! └──────────────┘   └─────────────────────┘   └───────────────────┘
//! ```
//!
//! ```no_run
//! # async fn demo() -> artsim::ArtsimResult<()> {
//! let matches = artsim::rank_similar(
//!     "gallery/17.png",
//!     vec![(18, "gallery/18.png".into()), (21, "gallery/21.png".into())],
//!     5,
//! )
//! .await?;
//! for m in matches {
//!     println!("{} {:.3}", m.id, m.score);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod cache;
pub mod color;
pub mod config;
pub mod descriptor;
pub mod extractor;
pub mod ranker;
mod result;
pub mod similarity;
pub mod source;

pub use cache::{CacheKey, CacheStats, DescriptorCache};
pub use color::QuantizedColor;
pub use config::{
    CacheConfig, ConfigValidationError, EngineConfig, ExtractorConfig, RankingConfig,
    ResampleFilter, DEFAULT_CANONICAL_SIZE, DEFAULT_GRID_SIZE, DEFAULT_TOP_N, MAX_CANONICAL_SIZE,
};
pub use descriptor::{CellHistogram, CellSummary, ColorCount, Descriptor};
pub use extractor::{compute_descriptor, compute_descriptor_default, DescriptorExtractor};
pub use ranker::{
    rank_descriptors, Candidate, RankedMatch, RankingOutcome, SimilarityRanker, SkippedCandidate,
};
pub use result::{ArtsimError, ArtsimResult};
pub use similarity::{cell_similarity, score_similarity, similarity};
pub use source::{ImageSource, LoadedImage};

use std::path::PathBuf;

/// Rank image files against a target file with default settings
///
/// # Errors
///
/// Returns the read or decode error of the target, or
/// [`ArtsimError::InvalidArgument`] if `top_n` is zero
pub async fn rank_similar<I>(
    target_path: impl Into<PathBuf>,
    candidates: Vec<(I, PathBuf)>,
    top_n: usize,
) -> ArtsimResult<Vec<RankedMatch<I>>>
where
    I: std::fmt::Debug + Send + 'static,
{
    let candidates = candidates
        .into_iter()
        .map(|(id, path)| Candidate::new(id, path))
        .collect();
    SimilarityRanker::default()
        .find_top_similar(&ImageSource::Path(target_path.into()), candidates, top_n)
        .await
}

/// [`rank_similar`] keeping the default five best matches
///
/// # Errors
///
/// Returns the read or decode error of the target
pub async fn rank_similar_default<I>(
    target_path: impl Into<PathBuf>,
    candidates: Vec<(I, PathBuf)>,
) -> ArtsimResult<Vec<RankedMatch<I>>>
where
    I: std::fmt::Debug + Send + 'static,
{
    rank_similar(target_path, candidates, DEFAULT_TOP_N).await
}
