use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn run(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_replconsole"))
        .args(args)
        .env("HOME", home)
        .env_remove("REPLCONSOLE_SCRIPT_KEYS")
        .output()
        .expect("run replconsole")
}

fn run_scripted(home: &Path, keys: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_replconsole"))
        .arg("console")
        .env("HOME", home)
        .env("REPLCONSOLE_SCRIPT_KEYS", keys)
        .output()
        .expect("run replconsole")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn assert_ok(output: &Output) {
    assert!(
        output.status.success(),
        "stdout:\n{}\nstderr:\n{}",
        stdout(output),
        stderr(output)
    );
}

fn assert_err_contains(output: &Output, needle: &str) {
    assert!(
        !output.status.success(),
        "expected failure, stdout:\n{}\nstderr:\n{}",
        stdout(output),
        stderr(output)
    );
    let text = format!("{}{}", stdout(output), stderr(output));
    assert!(
        text.contains(needle),
        "expected error to contain `{needle}`, got:\n{text}"
    );
}

fn kv_lines(output: &Output) -> BTreeMap<String, String> {
    stdout(output)
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn write_fast_config(home: &Path) {
    let dir = home.join(".replconsole");
    fs::create_dir_all(&dir).expect("config dir");
    fs::write(
        dir.join("config.yaml"),
        "operations:\n  connection_test_delay_ms: 10\n  report_generation_delay_ms: 10\n",
    )
    .expect("write config");
}

#[test]
fn cli_command_surface_prints_help_without_args() {
    let home = tempdir().expect("tempdir");
    let output = run(home.path(), &[]);
    assert_ok(&output);
    let text = stdout(&output);
    assert!(text.contains("Commands:"));
    assert!(text.contains("console"));
    assert!(text.contains("REPLCONSOLE_SCRIPT_KEYS"));
}

#[test]
fn cli_command_surface_rejects_unknown_commands() {
    let home = tempdir().expect("tempdir");
    assert_err_contains(&run(home.path(), &["setup"]), "unknown command `setup`");
    assert_err_contains(&run(home.path(), &["agents", "purge"]), "unknown agents subcommand");
    assert_err_contains(&run(home.path(), &["tasks"]), "usage: tasks");
}

#[test]
fn cli_command_surface_filters_agents_by_role_and_search() {
    let home = tempdir().expect("tempdir");
    let output = run(home.path(), &["agents", "list", "--role", "source"]);
    assert_ok(&output);
    let text = stdout(&output);
    assert!(text.contains("agt-ora-east"));
    assert!(!text.contains("agt-pg-west"));

    let output = run(home.path(), &["agents", "list", "--search", "WEST"]);
    assert_ok(&output);
    let text = stdout(&output);
    assert!(text.contains("agt-pg-west"));
    assert!(!text.contains("agt-hub"));

    assert_err_contains(
        &run(home.path(), &["agents", "list", "--role", "primary"]),
        "agent role must be one of",
    );
}

#[test]
fn cli_command_surface_shows_records() {
    let home = tempdir().expect("tempdir");

    let agent = run(home.path(), &["agents", "show", "agt-hub"]);
    assert_ok(&agent);
    let fields = kv_lines(&agent);
    assert_eq!(fields.get("role").map(String::as_str), Some("both"));
    assert_eq!(
        fields.get("endpoints").map(String::as_str),
        Some("ep-crm-mysql,ep-lake-mssql")
    );

    let endpoint = run(home.path(), &["endpoints", "show", "ep-orders-pg"]);
    assert_ok(&endpoint);
    assert_eq!(
        kv_lines(&endpoint).get("url").map(String::as_str),
        Some("postgresql://repl_writer@pg-west.internal:5432/orders")
    );

    let pipeline = run(home.path(), &["pipelines", "show", "pl-orders"]);
    assert_ok(&pipeline);
    assert_eq!(
        kv_lines(&pipeline).get("relay").map(String::as_str),
        Some("agt-relay-dmz")
    );

    let task = run(home.path(), &["tasks", "show", "task-orders-compare"]);
    assert_ok(&task);
    let fields = kv_lines(&task);
    assert_eq!(fields.get("type").map(String::as_str), Some("DATA_VALIDATION"));
    assert!(fields
        .get("next_run")
        .is_some_and(|value| value.contains("03:30 UTC")));

    assert_err_contains(
        &run(home.path(), &["tasks", "show", "task-missing"]),
        "unknown task `task-missing`",
    );
}

#[test]
fn cli_command_surface_config_init_show_and_refuse_overwrite() {
    let home = tempdir().expect("tempdir");

    let path = run(home.path(), &["config", "path"]);
    assert_ok(&path);
    assert!(stdout(&path).contains(".replconsole/config.yaml"));

    let init = run(home.path(), &["config", "init"]);
    assert_ok(&init);
    assert!(home.path().join(".replconsole/config.yaml").exists());

    let show = run(home.path(), &["config", "show"]);
    assert_ok(&show);
    assert!(stdout(&show).contains("connection_test_delay_ms: 1200"));

    assert_err_contains(&run(home.path(), &["config", "init"]), "already exists");
}

#[test]
fn cli_command_surface_reports_invalid_config() {
    let home = tempdir().expect("tempdir");
    let dir = home.path().join(".replconsole");
    fs::create_dir_all(&dir).expect("config dir");
    fs::write(dir.join("config.yaml"), "reports:\n  timezone: Mars/Base\n").expect("write");
    assert_err_contains(&run(home.path(), &["config", "show"]), "IANA timezone");
}

#[test]
fn cli_command_surface_console_without_terminal_prints_summary() {
    let home = tempdir().expect("tempdir");
    let output = run(home.path(), &["console"]);
    assert_ok(&output);
    let fields = kv_lines(&output);
    assert_eq!(fields.get("mode").map(String::as_str), Some("summary"));
    assert_eq!(fields.get("agents").map(String::as_str), Some("4"));
    assert_eq!(fields.get("endpoints").map(String::as_str), Some("4"));
    assert_eq!(fields.get("pipelines").map(String::as_str), Some("1"));
    assert_eq!(fields.get("tasks").map(String::as_str), Some("1"));
    assert_eq!(fields.get("reports").map(String::as_str), Some("0"));
}

#[test]
fn cli_command_surface_scripted_delete_needs_confirmation() {
    let home = tempdir().expect("tempdir");
    let output = run_scripted(home.path(), "d,n,down,d,y,q");
    assert_ok(&output);
    let fields = kv_lines(&output);
    assert_eq!(fields.get("mode").map(String::as_str), Some("scripted"));
    assert_eq!(fields.get("agents").map(String::as_str), Some("3"));

    let log = fs::read_to_string(home.path().join(".replconsole/logs/console.log"))
        .expect("console log");
    assert!(log.contains("\"event\":\"record.deleted\""));
    assert!(log.contains("\"id\":\"agt-pg-west\""));
}

#[test]
fn cli_command_surface_scripted_task_wizard_appends_task() {
    let home = tempdir().expect("tempdir");
    let output = run_scripted(
        home.path(),
        "tab,tab,tab,a,right,enter,text:Nightly Load,enter,right,down,right,enter,enter,q",
    );
    assert_ok(&output);
    let fields = kv_lines(&output);
    assert_eq!(fields.get("tasks").map(String::as_str), Some("2"));
    assert!(fields
        .get("status")
        .is_some_and(|status| status.contains("Nightly Load")));
}

#[test]
fn cli_command_surface_scripted_wizard_cancel_keeps_counts() {
    let home = tempdir().expect("tempdir");
    let output = run_scripted(home.path(), "tab,a,text:Billing,esc,tab,a,esc,q");
    assert_ok(&output);
    let fields = kv_lines(&output);
    assert_eq!(fields.get("endpoints").map(String::as_str), Some("4"));
    assert_eq!(fields.get("pipelines").map(String::as_str), Some("1"));
}

#[test]
fn cli_command_surface_scripted_endpoint_with_connection_test() {
    let home = tempdir().expect("tempdir");
    write_fast_config(home.path());
    let output = run_scripted(
        home.path(),
        "tab,a,text:Billing,down,right,down,right,down,right,enter,\
         down,down,text:billing,down,down,text:secret,ctrl-t,wait,enter,enter,q",
    );
    assert_ok(&output);
    assert_eq!(
        kv_lines(&output).get("endpoints").map(String::as_str),
        Some("5")
    );
    let log = fs::read_to_string(home.path().join(".replconsole/logs/console.log"))
        .expect("console log");
    assert!(log.contains("\"operation\":\"connection-test\""));
    assert!(log.contains("\"event\":\"operation.finished\""));
}

#[test]
fn cli_command_surface_scripted_report_generation() {
    let home = tempdir().expect("tempdir");
    write_fast_config(home.path());
    let output = run_scripted(home.path(), "backtab,text:Weekly,down,down,down,down,enter,wait,esc");
    assert_ok(&output);
    let fields = kv_lines(&output);
    assert_eq!(fields.get("reports").map(String::as_str), Some("1"));
    assert_eq!(
        fields.get("status").map(String::as_str),
        Some("Generated report `Weekly`.")
    );
}

#[test]
fn cli_command_surface_rejects_bad_script_tokens() {
    let home = tempdir().expect("tempdir");
    assert_err_contains(
        &run_scripted(home.path(), "down,jump"),
        "invalid REPLCONSOLE_SCRIPT_KEYS token `jump`",
    );
}
