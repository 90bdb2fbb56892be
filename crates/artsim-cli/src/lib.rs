//! Artsim CLI Library
//!
//! Command-line interface for the Artsim similarity engine.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{
    Cli, ColorArg, Commands, CompareArgs, ConfigArgs, ConfigFormatArg, DescriptorArgs,
    LogFormatArg, OutputFormatArg, RankArgs,
};
pub use config::{CliConfig, ColorChoice, LogFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{ComparisonReport, OutputFormat, RankingReport, Renderer, SkippedReport};
