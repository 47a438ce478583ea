#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Console,
    Agents,
    Endpoints,
    Pipelines,
    Tasks,
    Config,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "console" => CliVerb::Console,
        "agents" => CliVerb::Agents,
        "endpoints" => CliVerb::Endpoints,
        "pipelines" => CliVerb::Pipelines,
        "tasks" => CliVerb::Tasks,
        "config" => CliVerb::Config,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  console                              Open the replication console".to_string(),
        "  agents list [--role <r>] [--search <text>]".to_string(),
        "                                       List registered agents".to_string(),
        "  agents show <agent_id>               Show one agent and its endpoints".to_string(),
        "  endpoints list|show <endpoint_id>    Inspect database endpoints".to_string(),
        "  pipelines list|show <pipeline_id>    Inspect replication pipelines".to_string(),
        "  tasks list|show <task_id>            Inspect tasks and their next run".to_string(),
        "  config path|show|init                Locate, print or create config.yaml".to_string(),
        "  help                                 Print this help".to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    let mut lines = cli_help_lines();
    lines.push(String::new());
    lines.push(format!(
        "Set {} to drive `console` with comma-separated key tokens.",
        crate::console::SCRIPT_KEYS_ENV
    ));
    lines.join("\n")
}
