//! Config command handler

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::{ConfigArgs, ConfigFormatArg};

/// Execute the config command
///
/// With `--check`, every validation problem is reported in one error.
pub fn execute_config(config: &CliConfig, args: &ConfigArgs) -> CliResult<String> {
    if args.check {
        return check_config(config);
    }
    match args.format {
        ConfigFormatArg::Yaml => Ok(serde_yaml_ng::to_string(&config.engine)?),
        ConfigFormatArg::Json => Ok(serde_json::to_string_pretty(&config.engine)?),
    }
}

fn check_config(config: &CliConfig) -> CliResult<String> {
    let errors = config.engine.validate();
    if errors.is_empty() {
        return Ok("Configuration is valid\n".to_string());
    }
    let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
    Err(CliError::config(lines.join("; ")))
}
