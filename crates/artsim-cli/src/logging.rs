//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::config::{CliConfig, LogFormat};

/// Build the log filter: `RUST_LOG` wins, otherwise the verbosity default
#[must_use]
pub fn env_filter(config: &CliConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.filter_directive()))
}

/// Install the global subscriber, writing to stderr so stdout stays
/// machine-readable
///
/// Returns `false` if a subscriber was already installed.
pub fn init(config: &CliConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr)
        .with_target(config.verbosity.is_verbose());

    match config.log_format {
        LogFormat::Json => builder.json().try_init().is_ok(),
        LogFormat::Text => builder
            .with_ansi(config.color.should_color())
            .try_init()
            .is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Verbosity;

    #[test]
    fn test_second_init_is_refused() {
        let config = CliConfig::new().with_verbosity(Verbosity::Quiet);
        let _ = init(&config);
        assert!(!init(&config));
    }
}
