use crate::app::cli::{help_text, parse_cli_verb, CliVerb};

pub mod config;
pub mod group;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    if args.is_empty() {
        return Ok(help_text());
    }

    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Edit => group::cmd_edit(&args[1..]),
        CliVerb::Create => group::cmd_create(&args[1..]),
        CliVerb::Update => group::cmd_update(&args[1..]),
        CliVerb::Show => group::cmd_show(&args[1..]),
        CliVerb::Candidates => group::cmd_candidates(&args[1..]),
        CliVerb::Config => config::cmd_config(&args[1..]),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{}`", args[0])),
    }
}
