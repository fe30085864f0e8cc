// src/cli/handlers/init.rs

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use dialoguer::{Confirm, theme::ColorfulTheme};

use crate::{
    CancellationToken,
    cli::args::InitArgs,
    core::config_loader,
    system::executor::check_for_cancellation,
};

/// The main handler for the `init` command.
/// Writes a default configuration file, asking before it overwrites an existing one.
pub fn handle(args: Vec<String>, cancellation_token: &CancellationToken) -> Result<()> {
    let init_args = InitArgs::try_parse_from(&args)?;
    let path = config_loader::resolve_config_path(init_args.config.as_deref())?;

    if path.exists() && !init_args.force {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{} ({})", t!("init.prompt.overwrite"), path.display()))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", t!("common.info.operation_cancelled"));
            return Ok(());
        }
    }
    check_for_cancellation(cancellation_token)?;

    config_loader::write_settings(&path, &config_loader::default_settings_file())
        .with_context(|| format!("Could not write '{}'", path.display()))?;

    println!(
        "{} {}",
        t!("init.info.written").green(),
        path.display().to_string().bold()
    );
    Ok(())
}
