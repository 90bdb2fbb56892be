//! Descriptor command handler

use artsim::{DescriptorExtractor, ImageSource};

use super::engine_with_grid;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::Renderer;
use crate::DescriptorArgs;

/// Execute the descriptor command
pub fn execute_descriptor(config: &CliConfig, args: &DescriptorArgs) -> CliResult<String> {
    let engine = engine_with_grid(config, args.grid_size);
    let extractor = DescriptorExtractor::new(engine.extractor)?;
    let descriptor = extractor.extract(&ImageSource::path(&args.image))?;

    let renderer = Renderer::new(args.format.into(), config.color.should_color())
        .with_quiet(config.verbosity.is_quiet());
    renderer.descriptor(&args.image.display().to_string(), &descriptor)
}
