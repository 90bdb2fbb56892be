//! Artsim CLI: rank artworks by color-coherence similarity
//!
//! ## Usage
//!
//! ```bash
//! artsim descriptor painting.png --grid-size 8   # Print a descriptor
//! artsim compare a.png b.png                      # Score two images
//! artsim rank target.png gallery/*.png -n 5       # Top 5 matches
//! artsim config --format json                     # Effective settings
//! ```

use artsim_cli::{handlers, logging, Cli, CliConfig, CliResult, Commands, Verbosity};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    logging::init(&config);

    let output = match &cli.command {
        Commands::Descriptor(args) => handlers::execute_descriptor(&config, args)?,
        Commands::Compare(args) => handlers::execute_compare(&config, args)?,
        Commands::Rank(args) => handlers::execute_rank(&config, args)?,
        Commands::Config(args) => handlers::execute_config(&config, args)?,
    };

    // Results always go to stdout; -q only silences logs
    if output.ends_with('\n') {
        print!("{output}");
    } else {
        println!("{output}");
    }
    Ok(())
}

fn build_config(cli: &Cli) -> CliResult<CliConfig> {
    let config = CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.into())
        .with_log_format(cli.log_format.into());

    match &cli.config {
        Some(path) => config.with_engine_file(path),
        None => Ok(config),
    }
}
