//! Configuration file commands.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

/// Execute configuration commands against the file at `path`.
pub fn execute_config(
    args: ConfigArgs,
    config: &Config,
    path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::Config(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            config.save_to(path)?;
            println!(
                "{}",
                formatter.success(&format!("Configuration written to {}", path.display()))
            );
        }
        ConfigAction::Show => {
            let contents = toml::to_string_pretty(config)
                .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
            println!("{}", contents.trim_end());
        }
    }

    Ok(())
}
