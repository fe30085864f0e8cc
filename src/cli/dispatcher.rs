use anyhow::{Result, anyhow};

use crate::{CancellationToken, cli::handlers};

/// Defines an action, its aliases, and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, &CancellationToken) -> Result<()>,
}

/// The single source of truth for all actions.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "expand",
        aliases: &["x"],
        handler: handlers::expand::handle,
    },
    CommandDefinition {
        name: "vars",
        aliases: &["ls"],
        handler: handlers::vars::handle,
    },
    CommandDefinition {
        name: "init",
        aliases: &[],
        handler: handlers::init::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Routes `atexpand <action> [args...]` to the action's handler.
pub fn dispatch(all_args: Vec<String>, cancellation_token: &CancellationToken) -> Result<()> {
    log::debug!("Dispatching args: {:?}", all_args);

    let mut args = all_args.into_iter();
    let Some(action) = args.next() else {
        println!("{}", t!("cli.info.no_action"));
        return Ok(());
    };

    let command = find_command(&action)
        .ok_or_else(|| anyhow!("{}: '{}'", t!("cli.error.unknown_action"), action))?;
    (command.handler)(args.collect(), cancellation_token)
}
