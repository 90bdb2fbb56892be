//! Rank command handler

use artsim::{Candidate, EngineConfig, ImageSource, SimilarityRanker};

use super::engine_with_grid;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{RankingReport, Renderer};
use crate::RankArgs;

/// Engine configuration with every rank override applied
#[must_use]
pub fn ranking_engine(config: &CliConfig, args: &RankArgs) -> EngineConfig {
    let mut engine = engine_with_grid(config, args.grid_size);
    if let Some(top_n) = args.top_n {
        engine.ranking.top_n = top_n;
    }
    if let Some(jobs) = args.jobs {
        engine.ranking.concurrency = jobs;
    }
    engine
}

/// Execute the rank command
pub fn execute_rank(config: &CliConfig, args: &RankArgs) -> CliResult<String> {
    let engine = ranking_engine(config, args);
    let ranker = SimilarityRanker::from_config(&engine)?;

    let target = ImageSource::path(&args.target);
    let candidates: Vec<Candidate<String>> = args
        .candidates
        .iter()
        .map(|path| Candidate::new(path.display().to_string(), path.as_path()))
        .collect();

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("Failed to create runtime: {e}")))?;
    let outcome = rt.block_on(ranker.rank(&target, candidates, engine.ranking.top_n))?;

    let report = RankingReport::new(args.target.display().to_string(), outcome);
    Renderer::new(args.format.into(), config.color.should_color())
        .with_quiet(config.verbosity.is_quiet())
        .ranking(&report)
}
