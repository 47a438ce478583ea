use crate::app::cli::{help_text, parse_cli_verb, CliVerb};

pub mod catalog;
pub mod config;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    if args.is_empty() {
        return Ok(help_text());
    }

    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Console => crate::tui::console::cmd_console(),
        CliVerb::Agents => catalog::cmd_agents(&args[1..]),
        CliVerb::Endpoints => catalog::cmd_endpoints(&args[1..]),
        CliVerb::Pipelines => catalog::cmd_pipelines(&args[1..]),
        CliVerb::Tasks => catalog::cmd_tasks(&args[1..]),
        CliVerb::Config => config::cmd_config(&args[1..]),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{}`", args[0])),
    }
}
