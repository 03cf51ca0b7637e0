//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
///
/// `path` is the `--config` override; the default location is used without it.
pub fn execute_config(
    args: ConfigArgs,
    path: Option<&Path>,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConfigAction::Init { preset, force } => {
            let target = match path {
                Some(p) => p.to_path_buf(),
                None => Config::path()?,
            };
            if target.exists() && !force {
                return Err(CliError::Config(format!(
                    "{} already exists. Use --force to overwrite",
                    target.display()
                )));
            }
            Config::preset(preset).save_to(&target)?;
            println!(
                "{}",
                formatter.success(&format!("Configuration written to {}", target.display()))
            );
        }
        ConfigAction::Show => match formatter.format() {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
            OutputFormat::Table => println!("{}", config.to_toml()?),
        },
    }
    Ok(())
}
