//! Command handlers, kept out of main.rs for testability
//!
//! Each handler returns the rendered output so `main` only decides where
//! it goes.

pub mod compare;
pub mod config;
pub mod descriptor;
pub mod rank;

pub use compare::execute_compare;
pub use config::execute_config;
pub use descriptor::execute_descriptor;
pub use rank::execute_rank;

use artsim::EngineConfig;

use crate::config::CliConfig;

/// Engine configuration with a command-line grid size applied
fn engine_with_grid(config: &CliConfig, grid_size: Option<u32>) -> EngineConfig {
    let mut engine = config.engine.clone();
    if let Some(grid_size) = grid_size {
        engine.extractor.grid_size = grid_size;
    }
    engine
}
