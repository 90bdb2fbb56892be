//! Compare command handler

use artsim::{score_similarity, DescriptorExtractor, ImageSource};
use tracing::debug;

use super::engine_with_grid;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::{ComparisonReport, Renderer};
use crate::CompareArgs;

/// Execute the compare command
pub fn execute_compare(config: &CliConfig, args: &CompareArgs) -> CliResult<String> {
    let engine = engine_with_grid(config, args.grid_size);
    let extractor = DescriptorExtractor::new(engine.extractor)?;

    let first = extractor.extract(&ImageSource::path(&args.first))?;
    let second = extractor.extract(&ImageSource::path(&args.second))?;
    let score = score_similarity(&first, &second)?;
    debug!(score, "compared images");

    let report = ComparisonReport {
        first: args.first.display().to_string(),
        second: args.second.display().to_string(),
        score,
    };
    Renderer::new(args.format.into(), config.color.should_color()).comparison(&report)
}
