//! # Command-Line Interface
//!
//! `atexpand <action> [args...]`. The top-level parser only collects the raw arguments; the
//! [`dispatcher`] picks a handler and each handler parses its own flags.

use clap::Parser;

pub mod args;
/// Maps action names and aliases to handlers.
pub mod dispatcher;
/// One module per action.
pub mod handlers;

/// Semantic tags of `cli.help.template` and the SGR parameters they render as.
const HELP_TAGS: &[(&str, &str)] = &[
    ("title", "1;33"),
    ("group", "1;32"),
    ("cmd", "36"),
    ("hl", "1;36"),
    ("hi", "1"),
    ("err", "91"),
    ("dim", "2"),
];

/// Replaces every `<tag>`/`</tag>` pair from [`HELP_TAGS`] with ANSI styling, or strips the
/// tags when `colors` is off.
fn render_help_tags(template: &str, colors: bool) -> String {
    HELP_TAGS.iter().fold(template.to_string(), |text, (tag, sgr)| {
        let (open, close) = if colors {
            (format!("\x1b[{}m", sgr), "\x1b[0m")
        } else {
            (String::new(), "")
        };
        text.replace(&format!("<{}>", tag), &open)
            .replace(&format!("</{}>", tag), close)
    })
}

fn build_help_string() -> &'static str {
    let colors = colored::control::SHOULD_COLORIZE.should_colorize();
    Box::leak(render_help_tags(t!("cli.help.template"), colors).into_boxed_str())
}

/// atexpand: expands `@`-forms in command lines.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    help_template = { build_help_string() },
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
#[command(trailing_var_arg = true)]
pub struct Cli {
    /// The action followed by its arguments.
    #[arg()]
    pub args: Vec<String>,
}
