use crate::app::command_support::{load_settings, map_config_err};
use crate::catalog::Catalog;
use crate::config::ConsoleSettings;
use crate::console::screens::{draw_console_ui, project_console_view_model};
use crate::console::{
    parse_scripted_keys, ConsoleFlow, ConsoleState, ScriptStep, SCRIPT_KEYS_ENV,
};
use crate::shared::logging::{now_secs, EventLog};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, IsTerminal};
use std::time::Duration;

const SCRIPT_WAIT_SLACK: Duration = Duration::from_secs(5);

pub(crate) fn cmd_console() -> Result<String, String> {
    let settings = load_settings()?;
    let state_root = settings.resolve_state_root().map_err(map_config_err)?;
    let log = EventLog::for_state_root(&state_root);
    let catalog = Catalog::demo()?;
    let mut state = ConsoleState::new(catalog, settings.clone(), log).map_err(map_config_err)?;

    let mode = if let Some(steps) = load_scripted_keys()? {
        run_console_scripted(&mut state, &settings, steps);
        "scripted"
    } else if is_interactive_console() {
        run_console_tui(&mut state, &settings)?;
        "interactive"
    } else {
        "summary"
    };
    let status = state.nav().status_text.clone();
    state.close();

    let mut lines = vec![
        "console closed".to_string(),
        format!("mode={mode}"),
        format!("status={status}"),
    ];
    lines.extend(state.catalog.summary_lines());
    Ok(lines.join("\n"))
}

fn is_interactive_console() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

fn load_scripted_keys() -> Result<Option<Vec<ScriptStep>>, String> {
    let Ok(raw) = std::env::var(SCRIPT_KEYS_ENV) else {
        return Ok(None);
    };
    parse_scripted_keys(&raw).map(Some)
}

fn run_console_scripted(
    state: &mut ConsoleState,
    settings: &ConsoleSettings,
    steps: Vec<ScriptStep>,
) {
    let wait_timeout = settings
        .operations
        .connection_test_delay()
        .max(settings.operations.report_generation_delay())
        + SCRIPT_WAIT_SLACK;
    for step in steps {
        match step {
            ScriptStep::Key(key) => {
                if state.handle_key(key, now_secs()) == ConsoleFlow::Quit {
                    return;
                }
                state.tick();
            }
            ScriptStep::Wait => {
                state.wait_for_operations(wait_timeout);
            }
        }
    }
}

fn run_console_tui(state: &mut ConsoleState, settings: &ConsoleSettings) -> Result<(), String> {
    let mut stdout = io::stdout();
    enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {e}"))?;
    execute!(stdout, EnterAlternateScreen, Hide)
        .map_err(|e| format!("failed to enter console screen: {e}"))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("failed to create console terminal: {e}"))?;
    let result = run_console_tui_loop(state, settings.poll_interval(), &mut terminal);
    disable_raw_mode().map_err(|e| format!("failed to disable raw mode: {e}"))?;
    execute!(terminal.backend_mut(), Show, LeaveAlternateScreen)
        .map_err(|e| format!("failed to leave console screen: {e}"))?;
    result
}

fn run_console_tui_loop(
    state: &mut ConsoleState,
    poll_interval: Duration,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<(), String> {
    loop {
        state.tick();
        let view_model = project_console_view_model(state, now_secs());
        terminal
            .draw(|frame| draw_console_ui(frame, &view_model))
            .map_err(|e| format!("failed to render console: {e}"))?;
        if !event::poll(poll_interval).map_err(|e| format!("failed to poll console input: {e}"))?
        {
            continue;
        }
        let ev = event::read().map_err(|e| format!("failed to read console input: {e}"))?;
        let Event::Key(key) = ev else {
            continue;
        };
        if state.handle_key(key, now_secs()) == ConsoleFlow::Quit {
            return Ok(());
        }
    }
}
