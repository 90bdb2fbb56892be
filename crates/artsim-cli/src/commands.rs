//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Artsim: find visually similar artworks by localized color coherence
#[derive(Parser, Debug)]
#[command(name = "artsim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Engine configuration file (YAML, or JSON with a .json extension)
    #[arg(long, global = true, env = "ARTSIM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log line format on stderr
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract the descriptor of one image
    Descriptor(DescriptorArgs),

    /// Score the similarity of two images
    Compare(CompareArgs),

    /// Rank candidate images by similarity to a target
    Rank(RankArgs),

    /// Show the effective engine configuration
    Config(ConfigArgs),
}

/// Arguments for the descriptor command
#[derive(Parser, Debug)]
pub struct DescriptorArgs {
    /// Image file
    pub image: PathBuf,

    /// Cells per grid side (overrides the configuration file)
    #[arg(short, long)]
    pub grid_size: Option<u32>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormatArg,
}

/// Arguments for the compare command
#[derive(Parser, Debug)]
pub struct CompareArgs {
    /// First image
    pub first: PathBuf,

    /// Second image
    pub second: PathBuf,

    /// Cells per grid side (overrides the configuration file)
    #[arg(short, long)]
    pub grid_size: Option<u32>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormatArg,
}

/// Arguments for the rank command
#[derive(Parser, Debug)]
pub struct RankArgs {
    /// Target image
    pub target: PathBuf,

    /// Candidate images
    #[arg(required = true)]
    pub candidates: Vec<PathBuf>,

    /// Number of matches to keep (overrides the configuration file)
    #[arg(short = 'n', long)]
    pub top_n: Option<usize>,

    /// Parallel extraction jobs (0 = one per core)
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Cells per grid side (overrides the configuration file)
    #[arg(short, long)]
    pub grid_size: Option<u32>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormatArg,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Serialization format
    #[arg(short, long, default_value = "yaml")]
    pub format: ConfigFormatArg,

    /// Only validate the configuration and report problems
    #[arg(long)]
    pub check: bool,
}

/// Result output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON document
    Json,
}

/// Configuration serialization format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConfigFormatArg {
    /// YAML
    #[default]
    Yaml,
    /// JSON
    Json,
}

/// Log line format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Color output argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

impl From<OutputFormatArg> for crate::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Text => Self::Text,
            OutputFormatArg::Json => Self::Json,
        }
    }
}

impl From<LogFormatArg> for crate::config::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_descriptor_command() {
        let cli = Cli::parse_from(["artsim", "descriptor", "a.png"]);
        if let Commands::Descriptor(args) = cli.command {
            assert_eq!(args.image, PathBuf::from("a.png"));
            assert_eq!(args.grid_size, None);
            assert_eq!(args.format, OutputFormatArg::Text);
        } else {
            panic!("expected Descriptor command");
        }
    }

    #[test]
    fn test_parse_descriptor_with_grid() {
        let cli = Cli::parse_from(["artsim", "descriptor", "a.png", "--grid-size", "4", "-f", "json"]);
        if let Commands::Descriptor(args) = cli.command {
            assert_eq!(args.grid_size, Some(4));
            assert_eq!(args.format, OutputFormatArg::Json);
        } else {
            panic!("expected Descriptor command");
        }
    }

    #[test]
    fn test_parse_compare_command() {
        let cli = Cli::parse_from(["artsim", "compare", "a.png", "b.png"]);
        if let Commands::Compare(args) = cli.command {
            assert_eq!(args.first, PathBuf::from("a.png"));
            assert_eq!(args.second, PathBuf::from("b.png"));
        } else {
            panic!("expected Compare command");
        }
    }

    #[test]
    fn test_parse_rank_command() {
        let cli = Cli::parse_from([
            "artsim", "rank", "t.png", "a.png", "b.png", "c.png", "-n", "2", "-j", "3",
        ]);
        if let Commands::Rank(args) = cli.command {
            assert_eq!(args.target, PathBuf::from("t.png"));
            assert_eq!(args.candidates.len(), 3);
            assert_eq!(args.top_n, Some(2));
            assert_eq!(args.jobs, Some(3));
        } else {
            panic!("expected Rank command");
        }
    }

    #[test]
    fn test_rank_requires_candidates() {
        assert!(Cli::try_parse_from(["artsim", "rank", "t.png"]).is_err());
    }

    #[test]
    fn test_parse_config_command() {
        let cli = Cli::parse_from(["artsim", "config", "--format", "json", "--check"]);
        if let Commands::Config(args) = cli.command {
            assert_eq!(args.format, ConfigFormatArg::Json);
            assert!(args.check);
        } else {
            panic!("expected Config command");
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from([
            "artsim",
            "-vv",
            "--log-format",
            "json",
            "--config",
            "engine.yaml",
            "config",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_format, LogFormatArg::Json);
        assert_eq!(cli.config, Some(PathBuf::from("engine.yaml")));
        assert!(!cli.quiet);
    }

    #[test]
    fn test_quiet_after_subcommand() {
        let cli = Cli::parse_from(["artsim", "compare", "a.png", "b.png", "-q"]);
        assert!(cli.quiet);
    }
}
