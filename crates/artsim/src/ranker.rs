//! Top-K similarity ranking.
//!
//! Candidate descriptors are extracted on tokio's blocking pool with at most
//! `concurrency` extractions in flight. Results are placed by input index
//! and stable-sorted only after every extraction has settled, so completion
//! order never influences the output.
//!
//! Dropping the future returned by [`SimilarityRanker::find_top_similar`]
//! drops its `JoinSet`, which aborts queued extractions and discards running
//! ones. A cancelled call never yields a partial ranking.

use crate::cache::DescriptorCache;
use crate::config::{EngineConfig, RankingConfig};
use crate::descriptor::Descriptor;
use crate::extractor::DescriptorExtractor;
use crate::result::{ArtsimError, ArtsimResult};
use crate::similarity::score_similarity;
use crate::source::ImageSource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

/// An image to rank, tagged with a caller-owned identifier
#[derive(Debug, Clone)]
pub struct Candidate<I> {
    /// Identifier returned in the ranking
    pub id: I,
    /// Image location
    pub source: ImageSource,
}

impl<I> Candidate<I> {
    /// Create a candidate
    #[must_use]
    pub fn new(id: I, source: impl Into<ImageSource>) -> Self {
        Self {
            id,
            source: source.into(),
        }
    }
}

/// A ranked candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch<I> {
    /// Candidate identifier
    pub id: I,
    /// Similarity to the target in `[0, 1]`
    pub score: f64,
}

/// A candidate left out of the ranking
#[derive(Debug)]
pub struct SkippedCandidate<I> {
    /// Candidate identifier
    pub id: I,
    /// Why it was skipped
    pub error: ArtsimError,
}

/// Ranking plus the candidates that could not be scored
#[derive(Debug)]
pub struct RankingOutcome<I> {
    /// Highest similarity first
    pub matches: Vec<RankedMatch<I>>,
    /// Candidates whose extraction failed, in input order
    pub skipped: Vec<SkippedCandidate<I>>,
}

impl<I> RankingOutcome<I> {
    /// Best match, if any candidate survived
    #[must_use]
    pub fn best(&self) -> Option<&RankedMatch<I>> {
        self.matches.first()
    }

    /// Whether no candidate survived
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Scores candidates against a target
#[derive(Debug, Clone)]
pub struct SimilarityRanker {
    extractor: DescriptorExtractor,
    concurrency: usize,
}

impl Default for SimilarityRanker {
    fn default() -> Self {
        Self::new(
            DescriptorExtractor::default(),
            RankingConfig::default().effective_concurrency(),
        )
    }
}

impl SimilarityRanker {
    /// Create a ranker; a zero `concurrency` is raised to 1
    #[must_use]
    pub fn new(extractor: DescriptorExtractor, concurrency: usize) -> Self {
        Self {
            extractor,
            concurrency: concurrency.max(1),
        }
    }

    /// Build the extractor, cache, and concurrency limit from configuration
    ///
    /// # Errors
    ///
    /// Returns [`ArtsimError::InvalidConfig`] if the configuration is invalid
    pub fn from_config(config: &EngineConfig) -> ArtsimResult<Self> {
        let config = config.clone().into_validated()?;
        let mut extractor = DescriptorExtractor::new(config.extractor)?;
        if config.cache.enabled {
            extractor = extractor.with_cache(Arc::new(DescriptorCache::new(config.cache.capacity)));
        }
        Ok(Self::new(extractor, config.ranking.effective_concurrency()))
    }

    /// Extractor used for target and candidates
    #[must_use]
    pub const fn extractor(&self) -> &DescriptorExtractor {
        &self.extractor
    }

    /// Maximum concurrent extractions
    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Rank `candidates` by similarity to `target`, keeping the best `top_n`.
    ///
    /// Candidates that cannot be read or decoded are logged and left out;
    /// when none survive the result is empty.
    ///
    /// # Errors
    ///
    /// Returns the read or decode error of the target, or
    /// [`ArtsimError::InvalidArgument`] if `top_n` is zero
    pub async fn find_top_similar<I>(
        &self,
        target: &ImageSource,
        candidates: Vec<Candidate<I>>,
        top_n: usize,
    ) -> ArtsimResult<Vec<RankedMatch<I>>>
    where
        I: std::fmt::Debug + Send + 'static,
    {
        Ok(self.rank(target, candidates, top_n).await?.matches)
    }

    /// Like [`Self::find_top_similar`] but also reports skipped candidates
    ///
    /// # Errors
    ///
    /// Returns the read or decode error of the target, or
    /// [`ArtsimError::InvalidArgument`] if `top_n` is zero
    pub async fn rank<I>(
        &self,
        target: &ImageSource,
        candidates: Vec<Candidate<I>>,
        top_n: usize,
    ) -> ArtsimResult<RankingOutcome<I>>
    where
        I: std::fmt::Debug + Send + 'static,
    {
        if top_n == 0 {
            return Err(ArtsimError::invalid_argument("top_n must be at least 1"));
        }
        let span = tracing::info_span!(
            "find_top_similar",
            target = %target,
            candidates = candidates.len(),
            top_n
        );
        self.rank_inner(target.clone(), candidates, top_n)
            .instrument(span)
            .await
    }

    async fn rank_inner<I>(
        &self,
        target: ImageSource,
        candidates: Vec<Candidate<I>>,
        top_n: usize,
    ) -> ArtsimResult<RankingOutcome<I>>
    where
        I: std::fmt::Debug + Send + 'static,
    {
        let started = Instant::now();

        let extractor = self.extractor.clone();
        let target_descriptor = tokio::task::spawn_blocking(move || extractor.extract(&target))
            .await
            .map_err(|e| ArtsimError::Worker {
                message: e.to_string(),
            })??;

        let total = candidates.len();
        let (ids, sources): (Vec<I>, Vec<ImageSource>) =
            candidates.into_iter().map(|c| (c.id, c.source)).unzip();
        let extracted = self.extract_all(sources).await?;

        let mut scored = Vec::with_capacity(total);
        let mut skipped = Vec::new();
        for (id, result) in ids.into_iter().zip(extracted) {
            match result {
                Ok(descriptor) => {
                    let score = score_similarity(&target_descriptor, &descriptor)?;
                    scored.push(RankedMatch { id, score });
                }
                Err(error) => {
                    tracing::warn!(candidate = ?id, %error, "skipping candidate");
                    skipped.push(SkippedCandidate { id, error });
                }
            }
        }

        let survivors = scored.len();
        let matches = select_top(scored, top_n);
        tracing::info!(
            candidates = total,
            survivors,
            skipped = skipped.len(),
            returned = matches.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ranked candidates"
        );

        Ok(RankingOutcome { matches, skipped })
    }

    /// Extract every source, returning results in input order
    async fn extract_all(
        &self,
        sources: Vec<ImageSource>,
    ) -> ArtsimResult<Vec<ArtsimResult<Arc<Descriptor>>>> {
        let extractor = self.extractor.clone();
        run_bounded(sources, self.concurrency, move |source| {
            extractor.extract(&source)
        })
        .await
    }
}

/// Run `job` over `inputs` on the blocking pool with at most `concurrency`
/// jobs alive at once, returning results in input order.
///
/// A permit is taken before each job is spawned and released when the job
/// returns. A job that panics or is aborted leaves a [`ArtsimError::Worker`]
/// in its slot.
async fn run_bounded<T, R, F>(
    inputs: Vec<T>,
    concurrency: usize,
    job: F,
) -> ArtsimResult<Vec<ArtsimResult<R>>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> ArtsimResult<R> + Clone + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut jobs = JoinSet::new();
    let total = inputs.len();

    for (index, input) in inputs.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| ArtsimError::Worker {
                message: e.to_string(),
            })?;
        let job = job.clone();
        jobs.spawn_blocking(move || {
            let _permit = permit;
            (index, job(input))
        });
    }

    let mut results: Vec<Option<ArtsimResult<R>>> =
        std::iter::repeat_with(|| None).take(total).collect();
    while let Some(joined) = jobs.join_next().await {
        match joined {
            Ok((index, result)) => results[index] = Some(result),
            Err(e) => tracing::warn!(error = %e, "extraction worker failed"),
        }
    }

    Ok(results
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| {
                Err(ArtsimError::Worker {
                    message: "extraction did not complete".to_string(),
                })
            })
        })
        .collect())
}

/// Rank precomputed descriptors against a target.
///
/// Ties keep their input order.
///
/// # Errors
///
/// Returns [`ArtsimError::DescriptorMismatch`] if any cell count differs from
/// the target's, or [`ArtsimError::InvalidArgument`] if `top_n` is zero
pub fn rank_descriptors<'a, I>(
    target: &Descriptor,
    candidates: impl IntoIterator<Item = (I, &'a Descriptor)>,
    top_n: usize,
) -> ArtsimResult<Vec<RankedMatch<I>>> {
    if top_n == 0 {
        return Err(ArtsimError::invalid_argument("top_n must be at least 1"));
    }
    let scored = candidates
        .into_iter()
        .map(|(id, descriptor)| {
            score_similarity(target, descriptor).map(|score| RankedMatch { id, score })
        })
        .collect::<ArtsimResult<Vec<_>>>()?;
    Ok(select_top(scored, top_n))
}

/// Stable sort by descending score, then keep `top_n`
fn select_top<I>(mut scored: Vec<RankedMatch<I>>, top_n: usize) -> Vec<RankedMatch<I>> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_n);
    scored
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::color::QuantizedColor;
    use crate::descriptor::{CellSummary, ColorCount};
    use image::{Rgb, RgbImage};
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::time::Duration;

    fn uniform(grid: u32, index: u8, count: u32) -> Descriptor {
        let cell = CellSummary::new([ColorCount::new(
            QuantizedColor::from_index(index).unwrap(),
            count,
        )]);
        Descriptor::new(grid, vec![cell; (grid * grid) as usize]).unwrap()
    }

    fn solid(label: &str, color: [u8; 3]) -> ImageSource {
        ImageSource::raster(label, RgbImage::from_pixel(32, 32, Rgb(color)))
    }

    // =========================================================================
    // Pure ranking
    // =========================================================================

    #[test]
    fn test_select_top_is_stable() {
        let scored = vec![
            RankedMatch { id: "a", score: 0.2 },
            RankedMatch { id: "b", score: 0.9 },
            RankedMatch { id: "c", score: 0.2 },
            RankedMatch { id: "d", score: 0.9 },
        ];
        let ids: Vec<&str> = select_top(scored, 10).into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_rank_descriptors_truncates() {
        let target = uniform(2, 48, 10);
        let same = uniform(2, 48, 10);
        let other = uniform(2, 3, 10);
        let ranked =
            rank_descriptors(&target, [(1, &other), (2, &same), (3, &other)], 2).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0], RankedMatch { id: 2, score: 1.0 });
        assert_eq!(ranked[1], RankedMatch { id: 1, score: 0.0 });
    }

    #[test]
    fn test_rank_descriptors_mismatch() {
        let target = uniform(2, 48, 10);
        let wrong = uniform(3, 48, 10);
        let err = rank_descriptors(&target, [("x", &wrong)], 5).unwrap_err();
        assert!(matches!(err, ArtsimError::DescriptorMismatch { .. }));
    }

    #[test]
    fn test_rank_descriptors_rejects_zero_top_n() {
        let target = uniform(1, 0, 1);
        assert!(rank_descriptors::<u8>(&target, [], 0).is_err());
    }

    #[test]
    fn test_zero_concurrency_raised() {
        let ranker = SimilarityRanker::new(DescriptorExtractor::default(), 0);
        assert_eq!(ranker.concurrency(), 1);
    }

    #[test]
    fn test_from_config_attaches_cache() {
        let config = EngineConfig::default().with_cache(4);
        let ranker = SimilarityRanker::from_config(&config).unwrap();
        assert_eq!(ranker.extractor().cache().unwrap().capacity(), 4);

        let mut bad = EngineConfig::default();
        bad.ranking.top_n = 0;
        assert!(SimilarityRanker::from_config(&bad).is_err());
    }

    // =========================================================================
    // Async ranking
    // =========================================================================

    #[tokio::test]
    async fn test_identical_candidate_ranks_first() {
        let ranker = SimilarityRanker::new(DescriptorExtractor::default(), 2);
        let target = solid("target", [255, 0, 0]);
        let candidates = vec![
            Candidate::new("c1", solid("c1", [0, 0, 255])),
            Candidate::new("c2", solid("c2", [255, 0, 0])),
            Candidate::new("c3", solid("c3", [0, 255, 0])),
        ];
        let ranked = ranker.find_top_similar(&target, candidates, 2).await.unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id, "c2");
        assert_eq!(ranked[0].score, 1.0);
        assert_eq!(ranked[1].id, "c1");
        assert_eq!(ranked[1].score, 0.0);
    }

    #[tokio::test]
    async fn test_failed_candidates_are_skipped() {
        let ranker = SimilarityRanker::new(DescriptorExtractor::default(), 1);
        let target = solid("target", [255, 0, 0]);
        let candidates = vec![
            Candidate::new(1, ImageSource::bytes("corrupt", vec![1u8, 2, 3])),
            Candidate::new(2, solid("ok", [255, 0, 0])),
            Candidate::new(3, ImageSource::path("/missing/art.png")),
        ];
        let outcome = ranker.rank(&target, candidates, 5).await.unwrap();
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.best().unwrap().id, 2);
        let skipped: Vec<i32> = outcome.skipped.iter().map(|s| s.id).collect();
        assert_eq!(skipped, vec![1, 3]);
        assert!(outcome.skipped[0].error.is_decode_error());
        assert!(outcome.skipped[1].error.is_read_error());
    }

    #[tokio::test]
    async fn test_target_failure_propagates() {
        let ranker = SimilarityRanker::default();
        let err = ranker
            .find_top_similar(
                &ImageSource::bytes("bad-target", vec![0u8; 16]),
                vec![Candidate::new(1, solid("ok", [1, 2, 3]))],
                5,
            )
            .await
            .unwrap_err();
        assert!(err.is_decode_error());
    }

    #[tokio::test]
    async fn test_empty_candidates() {
        let ranker = SimilarityRanker::default();
        let outcome = ranker
            .rank::<u32>(&solid("t", [9, 9, 9]), Vec::new(), 5)
            .await
            .unwrap();
        assert!(outcome.is_empty());
        assert!(outcome.skipped.is_empty());
    }

    // =========================================================================
    // Bounded fan-out
    // =========================================================================

    #[derive(Clone, Default)]
    struct InFlight {
        current: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl InFlight {
        fn enter(&self) {
            let now = self.current.fetch_add(1, AtomicOrdering::SeqCst) + 1;
            self.peak.fetch_max(now, AtomicOrdering::SeqCst);
        }

        fn leave(&self) {
            self.current.fetch_sub(1, AtomicOrdering::SeqCst);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_in_flight_jobs_never_exceed_concurrency() {
        for concurrency in [1usize, 2, 3] {
            let tracker = InFlight::default();
            let job_tracker = tracker.clone();
            let results = run_bounded((0..12u32).collect(), concurrency, move |n| {
                job_tracker.enter();
                std::thread::sleep(Duration::from_millis(15));
                job_tracker.leave();
                Ok(n * 10)
            })
            .await
            .unwrap();

            let peak = tracker.peak.load(AtomicOrdering::SeqCst);
            assert!(peak >= 1);
            assert!(
                peak <= concurrency,
                "peak {peak} exceeded concurrency {concurrency}"
            );
            assert_eq!(tracker.current.load(AtomicOrdering::SeqCst), 0);
            let values: Vec<u32> = results.into_iter().map(Result::unwrap).collect();
            assert_eq!(values, (0..12u32).map(|n| n * 10).collect::<Vec<_>>());
        }
    }

    #[tokio::test]
    async fn test_results_follow_input_order_not_completion_order() {
        let results = run_bounded(vec![40u64, 0, 20, 5], 4, |delay| {
            std::thread::sleep(Duration::from_millis(delay));
            Ok(delay)
        })
        .await
        .unwrap();
        let values: Vec<u64> = results.into_iter().map(Result::unwrap).collect();
        assert_eq!(values, vec![40, 0, 20, 5]);
    }

    #[tokio::test]
    async fn test_panicking_job_becomes_worker_error() {
        let results = run_bounded(vec![1u8, 2, 3], 2, |n| {
            assert!(n != 2, "boom");
            Ok(n)
        })
        .await
        .unwrap();
        assert_eq!(*results[0].as_ref().unwrap(), 1);
        assert!(matches!(results[1], Err(ArtsimError::Worker { .. })));
        assert_eq!(*results[2].as_ref().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_zero_top_n_rejected() {
        let ranker = SimilarityRanker::default();
        let err = ranker
            .find_top_similar::<u32>(&solid("t", [9, 9, 9]), Vec::new(), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, ArtsimError::InvalidArgument { .. }));
    }
}
