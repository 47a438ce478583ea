use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub const SCRIPT_KEYS_ENV: &str = "REPLCONSOLE_SCRIPT_KEYS";
const SCRIPT_TOKENS_HELP: &str =
    "up,down,left,right,tab,backtab,enter,esc,backspace,ctrl-c,ctrl-t,a,e,d,y,n,q,t,wait,text:<chars>";

const AGENTS_HINT_TEXT: &str = "Up/Down move | t role filter | d delete | Tab switch | q quit";
const RECORDS_HINT_TEXT: &str =
    "Up/Down move | a add | e/Enter edit | d delete | Tab switch | q quit";
const REPORTS_HINT_TEXT: &str =
    "Up/Down field | type to edit | Left/Right choose | Enter generate | Tab switch | Esc quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleScreen {
    Agents,
    Endpoints,
    Pipelines,
    Tasks,
    Reports,
}

pub const ALL_CONSOLE_SCREENS: [ConsoleScreen; 5] = [
    ConsoleScreen::Agents,
    ConsoleScreen::Endpoints,
    ConsoleScreen::Pipelines,
    ConsoleScreen::Tasks,
    ConsoleScreen::Reports,
];

impl ConsoleScreen {
    pub fn as_str(self) -> &'static str {
        match self {
            ConsoleScreen::Agents => "agents",
            ConsoleScreen::Endpoints => "endpoints",
            ConsoleScreen::Pipelines => "pipelines",
            ConsoleScreen::Tasks => "tasks",
            ConsoleScreen::Reports => "reports",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ConsoleScreen::Agents => "Agents",
            ConsoleScreen::Endpoints => "Endpoints",
            ConsoleScreen::Pipelines => "Pipelines",
            ConsoleScreen::Tasks => "Tasks",
            ConsoleScreen::Reports => "Reports",
        }
    }

    fn index(self) -> usize {
        ALL_CONSOLE_SCREENS
            .iter()
            .position(|screen| *screen == self)
            .unwrap_or(0)
    }

    fn neighbour(self, forward: bool) -> Self {
        let len = ALL_CONSOLE_SCREENS.len();
        let index = self.index();
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        ALL_CONSOLE_SCREENS[next]
    }

    /// Whether records on this screen are created and edited through a wizard.
    pub fn has_wizard(self) -> bool {
        matches!(
            self,
            ConsoleScreen::Endpoints | ConsoleScreen::Pipelines | ConsoleScreen::Tasks
        )
    }

    fn hint_text(self) -> &'static str {
        match self {
            ConsoleScreen::Agents => AGENTS_HINT_TEXT,
            ConsoleScreen::Reports => REPORTS_HINT_TEXT,
            _ => RECORDS_HINT_TEXT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleAction {
    MovePrev,
    MoveNext,
    NextScreen,
    PrevScreen,
    Enter,
    Add,
    Edit,
    Delete,
    ToggleFilter,
    Quit,
    ReconcileSelection(usize),
}

impl ConsoleAction {
    fn as_str(self) -> &'static str {
        match self {
            ConsoleAction::MovePrev => "move_prev",
            ConsoleAction::MoveNext => "move_next",
            ConsoleAction::NextScreen => "next_screen",
            ConsoleAction::PrevScreen => "prev_screen",
            ConsoleAction::Enter => "enter",
            ConsoleAction::Add => "add",
            ConsoleAction::Edit => "edit",
            ConsoleAction::Delete => "delete",
            ConsoleAction::ToggleFilter => "toggle_filter",
            ConsoleAction::Quit => "quit",
            ConsoleAction::ReconcileSelection(_) => "reconcile_selection",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavState {
    pub screen: ConsoleScreen,
    pub selected: usize,
    pub status_text: String,
    pub hint_text: String,
}

impl NavState {
    pub fn start() -> Self {
        Self {
            screen: ConsoleScreen::Agents,
            selected: 0,
            status_text: "Demo catalog loaded.".to_string(),
            hint_text: AGENTS_HINT_TEXT.to_string(),
        }
    }

    pub fn clamp_selection(&mut self, len: usize) {
        self.selected = clamp_selection(self.selected, len);
    }

    fn open(&mut self, screen: ConsoleScreen) {
        self.screen = screen;
        self.selected = 0;
        self.hint_text = screen.hint_text().to_string();
        self.status_text = format!("{} screen.", screen.title());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleNavEffect {
    None,
    OpenScreen(ConsoleScreen),
    OpenCreateWizard(ConsoleScreen),
    OpenEditWizard(ConsoleScreen, usize),
    RequestDelete(ConsoleScreen, usize),
    CycleRoleFilter,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleTransition {
    pub effect: ConsoleNavEffect,
    pub feedback: Option<String>,
}

impl ConsoleTransition {
    fn no_op(feedback: Option<String>) -> Self {
        Self {
            effect: ConsoleNavEffect::None,
            feedback,
        }
    }

    fn effect(effect: ConsoleNavEffect) -> Self {
        Self {
            effect,
            feedback: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleNavError {
    #[error("invalid console transition: screen={} action={}", .screen.as_str(), .action.as_str())]
    InvalidTransition {
        screen: ConsoleScreen,
        action: ConsoleAction,
    },
}

pub fn clamp_selection(selected: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    selected.min(len - 1)
}

pub fn console_action_from_key(screen: ConsoleScreen, key: KeyEvent) -> Option<ConsoleAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(ConsoleAction::Quit);
    }
    match key.code {
        KeyCode::Up => Some(ConsoleAction::MovePrev),
        KeyCode::Down => Some(ConsoleAction::MoveNext),
        KeyCode::Right | KeyCode::Tab => Some(ConsoleAction::NextScreen),
        KeyCode::Left | KeyCode::BackTab => Some(ConsoleAction::PrevScreen),
        KeyCode::Esc | KeyCode::Char('q') => Some(ConsoleAction::Quit),
        KeyCode::Enter | KeyCode::Char('\n') | KeyCode::Char('\r') => Some(ConsoleAction::Enter),
        KeyCode::Char('a') => Some(ConsoleAction::Add),
        KeyCode::Char('e') => Some(ConsoleAction::Edit),
        KeyCode::Char('d') => Some(ConsoleAction::Delete),
        KeyCode::Char('t') if screen == ConsoleScreen::Agents => Some(ConsoleAction::ToggleFilter),
        _ => None,
    }
}

/// One step of a scripted console run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    Key(KeyEvent),
    /// Block until pending simulated operations finish.
    Wait,
}

pub fn parse_scripted_keys(raw: &str) -> Result<Vec<ScriptStep>, String> {
    let mut steps = Vec::new();
    for token in raw.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(text) = trimmed.strip_prefix("text:") {
            steps.extend(
                text.chars()
                    .map(|ch| ScriptStep::Key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE))),
            );
            continue;
        }
        let normalized = trimmed.to_ascii_lowercase();
        let key = |code: KeyCode| ScriptStep::Key(KeyEvent::new(code, KeyModifiers::NONE));
        let step = match normalized.as_str() {
            "up" => key(KeyCode::Up),
            "down" => key(KeyCode::Down),
            "left" => key(KeyCode::Left),
            "right" => key(KeyCode::Right),
            "tab" => key(KeyCode::Tab),
            "backtab" => ScriptStep::Key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)),
            "enter" => key(KeyCode::Enter),
            "esc" => key(KeyCode::Esc),
            "backspace" => key(KeyCode::Backspace),
            "ctrl-c" => ScriptStep::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            "ctrl-t" => ScriptStep::Key(KeyEvent::new(KeyCode::Char('t'), KeyModifiers::CONTROL)),
            "a" | "e" | "d" | "y" | "n" | "q" | "t" => {
                let ch = normalized.chars().next().unwrap_or('q');
                key(KeyCode::Char(ch))
            }
            "wait" => ScriptStep::Wait,
            other => {
                return Err(format!(
                    "invalid {SCRIPT_KEYS_ENV} token `{other}`; valid tokens: {SCRIPT_TOKENS_HELP}"
                ));
            }
        };
        steps.push(step);
    }
    Ok(steps)
}

pub fn console_transition(
    state: &mut NavState,
    action: ConsoleAction,
) -> Result<ConsoleTransition, ConsoleNavError> {
    if let ConsoleAction::ReconcileSelection(len) = action {
        let previous = state.selected;
        state.clamp_selection(len);
        if previous != state.selected {
            return Ok(ConsoleTransition::no_op(Some(
                "selection adjusted".to_string(),
            )));
        }
        return Ok(ConsoleTransition::no_op(None));
    }

    match action {
        ConsoleAction::NextScreen | ConsoleAction::PrevScreen => {
            let screen = state
                .screen
                .neighbour(action == ConsoleAction::NextScreen);
            state.open(screen);
            return Ok(ConsoleTransition::effect(ConsoleNavEffect::OpenScreen(
                screen,
            )));
        }
        ConsoleAction::Quit => return Ok(ConsoleTransition::effect(ConsoleNavEffect::Quit)),
        _ => {}
    }

    match state.screen {
        ConsoleScreen::Agents => match action {
            ConsoleAction::MovePrev => {
                state.selected = state.selected.saturating_sub(1);
                Ok(ConsoleTransition::no_op(None))
            }
            ConsoleAction::MoveNext => {
                state.selected += 1;
                Ok(ConsoleTransition::no_op(None))
            }
            ConsoleAction::Delete => Ok(ConsoleTransition::effect(
                ConsoleNavEffect::RequestDelete(state.screen, state.selected),
            )),
            ConsoleAction::ToggleFilter => {
                state.selected = 0;
                Ok(ConsoleTransition::effect(ConsoleNavEffect::CycleRoleFilter))
            }
            ConsoleAction::Add | ConsoleAction::Edit | ConsoleAction::Enter => {
                Ok(ConsoleTransition::no_op(Some(
                    "Agents register themselves and cannot be edited here.".to_string(),
                )))
            }
            ConsoleAction::NextScreen
            | ConsoleAction::PrevScreen
            | ConsoleAction::Quit
            | ConsoleAction::ReconcileSelection(_) => Err(ConsoleNavError::InvalidTransition {
                screen: state.screen,
                action,
            }),
        },
        ConsoleScreen::Endpoints | ConsoleScreen::Pipelines | ConsoleScreen::Tasks => {
            match action {
                ConsoleAction::MovePrev => {
                    state.selected = state.selected.saturating_sub(1);
                    Ok(ConsoleTransition::no_op(None))
                }
                ConsoleAction::MoveNext => {
                    state.selected += 1;
                    Ok(ConsoleTransition::no_op(None))
                }
                ConsoleAction::Add => Ok(ConsoleTransition::effect(
                    ConsoleNavEffect::OpenCreateWizard(state.screen),
                )),
                ConsoleAction::Edit | ConsoleAction::Enter => Ok(ConsoleTransition::effect(
                    ConsoleNavEffect::OpenEditWizard(state.screen, state.selected),
                )),
                ConsoleAction::Delete => Ok(ConsoleTransition::effect(
                    ConsoleNavEffect::RequestDelete(state.screen, state.selected),
                )),
                ConsoleAction::ToggleFilter => Ok(ConsoleTransition::no_op(Some(
                    "Role filter applies to the Agents screen.".to_string(),
                ))),
                ConsoleAction::NextScreen
                | ConsoleAction::PrevScreen
                | ConsoleAction::Quit
                | ConsoleAction::ReconcileSelection(_) => {
                    Err(ConsoleNavError::InvalidTransition {
                        screen: state.screen,
                        action,
                    })
                }
            }
        }
        ConsoleScreen::Reports => Err(ConsoleNavError::InvalidTransition {
            screen: state.screen,
            action,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screens_wrap_in_both_directions() {
        let mut nav = NavState::start();
        let transition = console_transition(&mut nav, ConsoleAction::PrevScreen).expect("prev");
        assert_eq!(
            transition.effect,
            ConsoleNavEffect::OpenScreen(ConsoleScreen::Reports)
        );
        console_transition(&mut nav, ConsoleAction::NextScreen).expect("next");
        assert_eq!(nav.screen, ConsoleScreen::Agents);
        assert_eq!(nav.hint_text, AGENTS_HINT_TEXT);
    }

    #[test]
    fn agents_screen_refuses_wizards() {
        let mut nav = NavState::start();
        let transition = console_transition(&mut nav, ConsoleAction::Add).expect("add");
        assert_eq!(transition.effect, ConsoleNavEffect::None);
        assert!(transition.feedback.is_some());
    }

    #[test]
    fn reconcile_clamps_selection() {
        let mut nav = NavState::start();
        nav.selected = 9;
        let transition =
            console_transition(&mut nav, ConsoleAction::ReconcileSelection(3)).expect("clamp");
        assert_eq!(nav.selected, 2);
        assert_eq!(transition.feedback.as_deref(), Some("selection adjusted"));
    }

    #[test]
    fn text_tokens_expand_to_characters() {
        let steps = parse_scripted_keys("a, text:Ab ,wait,ctrl-t").expect("parse");
        assert_eq!(steps.len(), 5);
        assert_eq!(
            steps[1],
            ScriptStep::Key(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::NONE))
        );
        assert_eq!(steps[3], ScriptStep::Wait);
        assert!(parse_scripted_keys("jump").is_err());
    }
}
