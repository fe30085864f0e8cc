// src/cli/handlers/vars.rs

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use super::commons;
use crate::{
    CancellationToken,
    cli::args::VarsArgs,
    core::registry::{Registry, VarKind, VarValue},
};

/// The main handler for the `vars` command.
/// Lists the variables loaded from the configuration with their kind and value.
pub fn handle(args: Vec<String>, _cancellation_token: &CancellationToken) -> Result<()> {
    let vars_args = VarsArgs::try_parse_from(&args)?;
    let settings = commons::load_settings(vars_args.config.as_deref())?;
    let registry = settings.registry();

    if registry.is_empty() {
        println!("{}", t!("vars.info.empty").dimmed());
        return Ok(());
    }

    println!("{} ({}):", t!("vars.header").bold(), registry.len());
    for line in render_lines(&registry) {
        println!("{}", line);
    }
    Ok(())
}

/// One aligned `name  kind  value` line per variable, sorted by name.
fn render_lines(registry: &Registry) -> Vec<String> {
    let entries = registry.sorted();
    let width = entries.iter().map(|(name, _)| name.len()).max().unwrap_or(0);

    entries
        .into_iter()
        .map(|(name, value)| {
            format!(
                "  {:<width$}  {:<7}  {}",
                name.cyan(),
                kind_label(value.kind()).dimmed(),
                value_label(value),
                width = width
            )
        })
        .collect()
}

fn kind_label(kind: VarKind) -> &'static str {
    match kind {
        VarKind::Str => t!("vars.label.string"),
        VarKind::Int => t!("vars.label.integer"),
        VarKind::Float => t!("vars.label.float"),
    }
}

fn value_label(value: &VarValue) -> String {
    if value.is_unset() {
        t!("vars.label.unset").italic().to_string()
    } else {
        value.render()
    }
}
