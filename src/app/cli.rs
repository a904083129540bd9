#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Edit,
    Create,
    Update,
    Show,
    Candidates,
    Config,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "edit" => CliVerb::Edit,
        "create" => CliVerb::Create,
        "update" => CliVerb::Update,
        "show" => CliVerb::Show,
        "candidates" => CliVerb::Candidates,
        "config" => CliVerb::Config,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  edit <group> --format <fmt>          Open the settings form for an existing group"
            .to_string(),
        "  create <group> --format <fmt>        Open the settings form for a new group"
            .to_string(),
        "  update <group> --format <fmt> ...    Apply changes without the form".to_string(),
        "      [--browseable true|false] [--exposed true|false]".to_string(),
        "      [--members a,b,c] [--add a,b] [--remove a,b] [--create]".to_string(),
        "  show <group>                         Print a group's current settings".to_string(),
        "  candidates --format <fmt>            List repositories that can join a group"
            .to_string(),
        "  config [base-url <url>]              Show or set the server connection".to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    cli_help_lines().join("\n")
}
