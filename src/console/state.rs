use super::input::{
    confirm_action_from_key, designer_action_from_key, wizard_action_from_key, ConfirmAction,
    DesignerAction, WizardAction,
};
use super::navigation::{
    console_action_from_key, console_transition, ConsoleAction, ConsoleNavEffect, ConsoleScreen,
    NavState,
};
use crate::catalog::{Catalog, ListState, SaveOutcome};
use crate::config::{ConfigError, ConsoleSettings};
use crate::model::{filter_agents, Agent, AgentRole, GeneratedReport, Record};
use crate::ops::{ConnectionReport, OperationError};
use crate::report::{DesignerField, ReportDesigner};
use crate::shared::ids::{AgentId, EndpointId, PipelineId, TaskId};
use crate::shared::logging::EventLog;
use crate::wizard::{
    EndpointWizard, PipelineWizard, StepOutcome, TaskWizard, Wizard, WizardError,
    WizardLifecycle, WizardView,
};
use chrono_tz::Tz;
use crossterm::event::KeyEvent;
use serde_json::Value;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleFlow {
    Continue,
    Quit,
}

#[derive(Debug)]
pub enum ActiveWizard {
    Endpoint(EndpointWizard),
    Pipeline(PipelineWizard),
    Task(TaskWizard),
}

impl ActiveWizard {
    fn view(&self, now: i64) -> WizardView {
        match self {
            Self::Endpoint(wizard) => wizard.view(now),
            Self::Pipeline(wizard) => wizard.view(now),
            Self::Task(wizard) => wizard.view(now),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Endpoint(_) => "endpoint",
            Self::Pipeline(_) => "pipeline",
            Self::Task(_) => "task",
        }
    }

    fn lifecycle(&self) -> WizardLifecycle {
        match self {
            Self::Endpoint(wizard) => wizard.lifecycle(),
            Self::Pipeline(wizard) => wizard.lifecycle(),
            Self::Task(wizard) => wizard.lifecycle(),
        }
    }

    fn cancel(&mut self) -> Result<(), WizardError> {
        match self {
            Self::Endpoint(wizard) => wizard.cancel(),
            Self::Pipeline(wizard) => wizard.cancel(),
            Self::Task(wizard) => wizard.cancel(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Agent(AgentId),
    Endpoint(EndpointId),
    Pipeline(PipelineId),
    Task(TaskId),
}

impl DeleteTarget {
    fn kind(&self) -> &'static str {
        match self {
            Self::Agent(_) => "agent",
            Self::Endpoint(_) => "endpoint",
            Self::Pipeline(_) => "pipeline",
            Self::Task(_) => "task",
        }
    }

    fn id(&self) -> String {
        match self {
            Self::Agent(id) => id.to_string(),
            Self::Endpoint(id) => id.to_string(),
            Self::Pipeline(id) => id.to_string(),
            Self::Task(id) => id.to_string(),
        }
    }
}

/// A delete awaiting `y`/`n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub target: DeleteTarget,
    pub name: String,
}

impl PendingDelete {
    pub fn prompt(&self) -> String {
        format!(
            "Delete {} `{}` ({})? y = delete, n = keep",
            self.target.kind(),
            self.name,
            self.target.id()
        )
    }
}

/// What one wizard key did, with the record type erased.
#[derive(Debug, Clone, PartialEq, Eq)]
enum WizardEvent {
    None,
    Moved(usize),
    Blocked(String),
    Deployed {
        kind: &'static str,
        id: String,
        name: String,
        outcome: SaveOutcome,
        position: Option<usize>,
    },
    Cancelled,
    Failed(String),
}

fn drive<W: Wizard>(
    wizard: &mut W,
    action: WizardAction,
    target: &mut ListState<W::Record>,
    now: i64,
) -> WizardEvent {
    let result = match action {
        WizardAction::FocusPrev => {
            wizard.move_focus(false);
            Ok(WizardEvent::None)
        }
        WizardAction::FocusNext => {
            wizard.move_focus(true);
            Ok(WizardEvent::None)
        }
        WizardAction::Type(ch) => wizard.type_char(ch).map(|_| WizardEvent::None),
        WizardAction::Backspace => wizard.backspace().map(|_| WizardEvent::None),
        WizardAction::CyclePrev => wizard.cycle_choice(false).map(|_| WizardEvent::None),
        WizardAction::CycleNext => wizard.cycle_choice(true).map(|_| WizardEvent::None),
        WizardAction::PrevStep => wizard.back().map(|moved| {
            if moved {
                WizardEvent::Moved(wizard.current_step())
            } else {
                WizardEvent::None
            }
        }),
        WizardAction::NextStep => advance(wizard),
        WizardAction::Submit if wizard.current_step() < wizard.total_steps() => advance(wizard),
        WizardAction::Submit => match wizard.deploy(target, now) {
            Ok(deployed) => {
                let id = deployed.record.id().clone();
                Ok(WizardEvent::Deployed {
                    kind: <W::Record as Record>::KIND,
                    id: id.to_string(),
                    name: deployed.record.name().to_string(),
                    outcome: deployed.outcome,
                    position: target.position(&id),
                })
            }
            Err(WizardError::Validation(err)) => Ok(WizardEvent::Blocked(err.to_string())),
            Err(err) => Err(err),
        },
        WizardAction::Cancel => wizard.cancel().map(|_| WizardEvent::Cancelled),
        WizardAction::TestConnection => Ok(WizardEvent::None),
    };
    result.unwrap_or_else(|err| WizardEvent::Failed(err.to_string()))
}

fn advance<W: Wizard>(wizard: &mut W) -> Result<WizardEvent, WizardError> {
    Ok(match wizard.next()? {
        StepOutcome::Advanced(step) => WizardEvent::Moved(step),
        StepOutcome::Blocked(err) => WizardEvent::Blocked(err.to_string()),
        StepOutcome::AtLastStep => WizardEvent::None,
    })
}

const ROLE_FILTER_CYCLE: [Option<AgentRole>; 5] = [
    None,
    Some(AgentRole::Source),
    Some(AgentRole::Target),
    Some(AgentRole::Relay),
    Some(AgentRole::Both),
];

/// All mutable console state. Owned by the terminal loop; every change
/// happens in [`ConsoleState::handle_key`] or [`ConsoleState::tick`].
#[derive(Debug)]
pub struct ConsoleState {
    pub catalog: Catalog,
    nav: NavState,
    wizard: Option<ActiveWizard>,
    pending_delete: Option<PendingDelete>,
    designer: ReportDesigner,
    role_filter: Option<AgentRole>,
    settings: ConsoleSettings,
    report_tz: Tz,
    log: EventLog,
}

impl ConsoleState {
    pub fn new(
        catalog: Catalog,
        settings: ConsoleSettings,
        log: EventLog,
    ) -> Result<Self, ConfigError> {
        let report_tz = settings.reports.tz()?;
        let designer = ReportDesigner::new(&catalog);
        log.info(
            "console.started",
            &[
                ("agents", Value::from(catalog.agents.len())),
                ("endpoints", Value::from(catalog.endpoints.len())),
                ("pipelines", Value::from(catalog.pipelines.len())),
                ("tasks", Value::from(catalog.tasks.len())),
            ],
        );
        Ok(Self {
            catalog,
            nav: NavState::start(),
            wizard: None,
            pending_delete: None,
            designer,
            role_filter: None,
            settings,
            report_tz,
            log,
        })
    }

    pub fn nav(&self) -> &NavState {
        &self.nav
    }

    pub fn screen(&self) -> ConsoleScreen {
        self.nav.screen
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.pending_delete.as_ref()
    }

    pub fn designer(&self) -> &ReportDesigner {
        &self.designer
    }

    pub fn role_filter(&self) -> Option<AgentRole> {
        self.role_filter
    }

    pub fn wizard_open(&self) -> bool {
        self.wizard.is_some()
    }

    pub fn wizard_view(&self, now: i64) -> Option<WizardView> {
        self.wizard.as_ref().map(|wizard| wizard.view(now))
    }

    pub fn visible_agents(&self) -> Vec<&Agent> {
        filter_agents(&self.catalog.agents, "", self.role_filter)
    }

    pub fn screen_len(&self, screen: ConsoleScreen) -> usize {
        match screen {
            ConsoleScreen::Agents => self.visible_agents().len(),
            ConsoleScreen::Endpoints => self.catalog.endpoints.len(),
            ConsoleScreen::Pipelines => self.catalog.pipelines.len(),
            ConsoleScreen::Tasks => self.catalog.tasks.len(),
            ConsoleScreen::Reports => self.catalog.reports.len(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: i64) -> ConsoleFlow {
        if self.pending_delete.is_some() {
            if let Some(action) = confirm_action_from_key(key) {
                self.resolve_delete(action);
            }
            return ConsoleFlow::Continue;
        }
        if self.wizard.is_some() {
            if let Some(action) = wizard_action_from_key(key) {
                self.handle_wizard_action(action, now);
            }
            return ConsoleFlow::Continue;
        }
        if self.nav.screen == ConsoleScreen::Reports {
            return match designer_action_from_key(key) {
                Some(action) => self.handle_designer_action(action, now),
                None => ConsoleFlow::Continue,
            };
        }
        match console_action_from_key(self.nav.screen, key) {
            Some(action) => self.handle_nav_action(action),
            None => ConsoleFlow::Continue,
        }
    }

    fn handle_nav_action(&mut self, action: ConsoleAction) -> ConsoleFlow {
        let transition = match console_transition(&mut self.nav, action) {
            Ok(transition) => transition,
            Err(err) => {
                self.nav.status_text = err.to_string();
                return ConsoleFlow::Continue;
            }
        };
        if let Some(feedback) = transition.feedback {
            self.nav.status_text = feedback;
        }
        match transition.effect {
            ConsoleNavEffect::None | ConsoleNavEffect::OpenScreen(_) => {}
            ConsoleNavEffect::OpenCreateWizard(screen) => self.open_wizard(screen, None),
            ConsoleNavEffect::OpenEditWizard(screen, index) => {
                self.open_wizard(screen, Some(index))
            }
            ConsoleNavEffect::RequestDelete(screen, index) => self.request_delete(screen, index),
            ConsoleNavEffect::CycleRoleFilter => self.cycle_role_filter(),
            ConsoleNavEffect::Quit => return ConsoleFlow::Quit,
        }
        self.reconcile_selection();
        ConsoleFlow::Continue
    }

    fn reconcile_selection(&mut self) {
        let len = self.screen_len(self.nav.screen);
        let _ = console_transition(&mut self.nav, ConsoleAction::ReconcileSelection(len));
    }

    fn cycle_role_filter(&mut self) {
        let index = ROLE_FILTER_CYCLE
            .iter()
            .position(|role| *role == self.role_filter)
            .unwrap_or(0);
        self.role_filter = ROLE_FILTER_CYCLE[(index + 1) % ROLE_FILTER_CYCLE.len()];
        self.nav.status_text = match self.role_filter {
            Some(role) => format!("Showing {role} agents."),
            None => "Showing all agents.".to_string(),
        };
    }

    fn open_wizard(&mut self, screen: ConsoleScreen, index: Option<usize>) {
        let catalog = &self.catalog;
        let placeholders = self.settings.placeholders.clone();
        let wizard = match (screen, index) {
            (ConsoleScreen::Endpoints, None) => Some(ActiveWizard::Endpoint(
                EndpointWizard::create(catalog, placeholders),
            )),
            (ConsoleScreen::Endpoints, Some(index)) => catalog
                .endpoints
                .get_index(index)
                .map(|existing| {
                    ActiveWizard::Endpoint(EndpointWizard::edit(existing, catalog, placeholders))
                }),
            (ConsoleScreen::Pipelines, None) => {
                Some(ActiveWizard::Pipeline(PipelineWizard::create(catalog)))
            }
            (ConsoleScreen::Pipelines, Some(index)) => catalog
                .pipelines
                .get_index(index)
                .map(|existing| ActiveWizard::Pipeline(PipelineWizard::edit(existing, catalog))),
            (ConsoleScreen::Tasks, None) => Some(ActiveWizard::Task(TaskWizard::create(catalog))),
            (ConsoleScreen::Tasks, Some(index)) => catalog
                .tasks
                .get_index(index)
                .map(|existing| ActiveWizard::Task(TaskWizard::edit(existing, catalog))),
            (ConsoleScreen::Agents | ConsoleScreen::Reports, _) => None,
        };
        let Some(wizard) = wizard else {
            self.nav.status_text = format!("No {} selected.", screen.as_str());
            return;
        };
        self.log.info(
            "wizard.opened",
            &[
                ("kind", Value::from(wizard.kind())),
                ("mode", Value::from(if index.is_some() { "edit" } else { "create" })),
            ],
        );
        self.nav.status_text = format!("{} wizard open.", screen.title());
        self.wizard = Some(wizard);
    }

    fn handle_wizard_action(&mut self, action: WizardAction, now: i64) {
        if action == WizardAction::TestConnection {
            self.start_connection_test();
            return;
        }
        let event = match self.wizard.as_mut() {
            Some(ActiveWizard::Endpoint(wizard)) => {
                drive(wizard, action, &mut self.catalog.endpoints, now)
            }
            Some(ActiveWizard::Pipeline(wizard)) => {
                drive(wizard, action, &mut self.catalog.pipelines, now)
            }
            Some(ActiveWizard::Task(wizard)) => drive(wizard, action, &mut self.catalog.tasks, now),
            None => return,
        };
        let kind = self.wizard.as_ref().map_or("record", ActiveWizard::kind);
        match event {
            WizardEvent::None => {}
            WizardEvent::Moved(step) => self.nav.status_text = format!("Step {step}."),
            WizardEvent::Blocked(message) => {
                self.log.warn(
                    "wizard.blocked",
                    &[
                        ("kind", Value::from(kind)),
                        ("reason", Value::from(message.clone())),
                    ],
                );
                self.nav.status_text = message;
            }
            WizardEvent::Deployed {
                kind,
                id,
                name,
                outcome,
                position,
            } => {
                let verb = match outcome {
                    SaveOutcome::Created => "created",
                    SaveOutcome::Updated => "updated",
                };
                self.log.info(
                    "record.saved",
                    &[
                        ("kind", Value::from(kind)),
                        ("id", Value::from(id.clone())),
                        ("outcome", Value::from(verb)),
                    ],
                );
                self.wizard = None;
                if kind == "pipeline" {
                    self.designer.refresh_scopes(&self.catalog);
                }
                if let Some(position) = position {
                    self.nav.selected = position;
                }
                self.nav.status_text = format!("Saved {kind} `{name}` ({verb}).");
            }
            WizardEvent::Cancelled => {
                self.log.info("wizard.cancelled", &[("kind", Value::from(kind))]);
                self.wizard = None;
                self.nav.status_text = format!("{kind} wizard cancelled.");
            }
            WizardEvent::Failed(message) => self.nav.status_text = message,
        }
    }

    fn start_connection_test(&mut self) {
        let delay = self.settings.operations.connection_test_delay();
        let Some(ActiveWizard::Endpoint(wizard)) = self.wizard.as_mut() else {
            self.nav.status_text = "Connection tests are only available for endpoints.".to_string();
            return;
        };
        match wizard.test_connection(delay) {
            Ok(true) => {
                self.log.info(
                    "operation.started",
                    &[("operation", Value::from("connection-test"))],
                );
                self.nav.status_text = "Testing connection...".to_string();
            }
            Ok(false) => {
                if let Some(error) = wizard.core().last_error() {
                    self.nav.status_text = error.to_string();
                } else if wizard.connection_test_pending() {
                    self.nav.status_text = "A connection test is already running.".to_string();
                }
            }
            Err(err) => self.nav.status_text = err.to_string(),
        }
    }

    fn handle_designer_action(&mut self, action: DesignerAction, now: i64) -> ConsoleFlow {
        match action {
            DesignerAction::FocusPrev => self.designer.move_focus(false),
            DesignerAction::FocusNext => self.designer.move_focus(true),
            DesignerAction::Type(ch) => self.designer.type_char(ch),
            DesignerAction::Backspace => self.designer.backspace(),
            DesignerAction::CyclePrev => self.designer.cycle(false),
            DesignerAction::CycleNext => self.designer.cycle(true),
            DesignerAction::Activate => {
                if self.designer.focused_field() == DesignerField::Generate {
                    self.start_report(now);
                } else {
                    self.designer.move_focus(true);
                }
            }
            DesignerAction::NextScreen => {
                return self.handle_nav_action(ConsoleAction::NextScreen);
            }
            DesignerAction::PrevScreen => {
                return self.handle_nav_action(ConsoleAction::PrevScreen);
            }
            DesignerAction::Quit => return ConsoleFlow::Quit,
        }
        ConsoleFlow::Continue
    }

    fn start_report(&mut self, now: i64) {
        let delay = self.settings.operations.report_generation_delay();
        if self.designer.generate(delay, now, self.report_tz) {
            self.log.info(
                "operation.started",
                &[("operation", Value::from("report-generation"))],
            );
        }
        if let Some(message) = self.designer.message() {
            self.nav.status_text = message.to_string();
        }
    }

    fn request_delete(&mut self, screen: ConsoleScreen, index: usize) {
        let pending = match screen {
            ConsoleScreen::Agents => self.visible_agents().get(index).map(|agent| PendingDelete {
                target: DeleteTarget::Agent(agent.id.clone()),
                name: agent.name.clone(),
            }),
            ConsoleScreen::Endpoints => {
                self.catalog
                    .endpoints
                    .get_index(index)
                    .map(|endpoint| PendingDelete {
                        target: DeleteTarget::Endpoint(endpoint.id.clone()),
                        name: endpoint.name.clone(),
                    })
            }
            ConsoleScreen::Pipelines => {
                self.catalog
                    .pipelines
                    .get_index(index)
                    .map(|pipeline| PendingDelete {
                        target: DeleteTarget::Pipeline(pipeline.id.clone()),
                        name: pipeline.name.clone(),
                    })
            }
            ConsoleScreen::Tasks => self.catalog.tasks.get_index(index).map(|task| PendingDelete {
                target: DeleteTarget::Task(task.id.clone()),
                name: task.name.clone(),
            }),
            ConsoleScreen::Reports => None,
        };
        match pending {
            Some(pending) => {
                self.nav.status_text = pending.prompt();
                self.pending_delete = Some(pending);
            }
            None => self.nav.status_text = format!("No {} selected.", screen.as_str()),
        }
    }

    fn resolve_delete(&mut self, action: ConfirmAction) {
        let Some(pending) = self.pending_delete.take() else {
            return;
        };
        if action == ConfirmAction::Dismiss {
            self.nav.status_text = "Delete dismissed.".to_string();
            return;
        }
        let result = match &pending.target {
            DeleteTarget::Agent(id) => self.catalog.agents.delete(id).map(|_| ()),
            DeleteTarget::Endpoint(id) => self.catalog.endpoints.delete(id).map(|_| ()),
            DeleteTarget::Pipeline(id) => self.catalog.pipelines.delete(id).map(|_| ()),
            DeleteTarget::Task(id) => self.catalog.tasks.delete(id).map(|_| ()),
        };
        match result {
            Ok(()) => {
                self.log.info(
                    "record.deleted",
                    &[
                        ("kind", Value::from(pending.target.kind())),
                        ("id", Value::from(pending.target.id())),
                    ],
                );
                if matches!(pending.target, DeleteTarget::Pipeline(_)) {
                    self.designer.refresh_scopes(&self.catalog);
                }
                self.nav.status_text =
                    format!("Deleted {} `{}`.", pending.target.kind(), pending.name);
            }
            Err(err) => self.nav.status_text = err.to_string(),
        }
        self.reconcile_selection();
    }

    /// Collects finished simulated operations. Returns true when one completed.
    pub fn tick(&mut self) -> bool {
        let connection = match self.wizard.as_mut() {
            Some(ActiveWizard::Endpoint(wizard)) => wizard.poll_connection_test(),
            _ => None,
        };
        let report = self.designer.poll();
        self.absorb(connection, report)
    }

    /// Blocks until pending operations finish or `timeout` passes.
    pub fn wait_for_operations(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let connection = match self.wizard.as_mut() {
            Some(ActiveWizard::Endpoint(wizard)) => wizard.wait_connection_test(timeout),
            _ => None,
        };
        let remaining = deadline.saturating_duration_since(Instant::now());
        let report = self.designer.wait(remaining);
        self.absorb(connection, report)
    }

    fn absorb(
        &mut self,
        connection: Option<Result<ConnectionReport, OperationError>>,
        report: Option<Result<GeneratedReport, OperationError>>,
    ) -> bool {
        let mut changed = false;
        if let Some(result) = connection {
            changed = true;
            self.log_finished("connection-test", result.as_ref().err());
            self.nav.status_text = match result {
                Ok(report) => format!("Connection OK ({} ms).", report.latency_ms),
                Err(err) => format!("Connection test failed: {err}"),
            };
        }
        if let Some(result) = report {
            changed = true;
            self.log_finished("report-generation", result.as_ref().err());
            if let Ok(report) = result {
                self.catalog.reports.save(report);
            }
            if let Some(message) = self.designer.message() {
                self.nav.status_text = message.to_string();
            }
        }
        changed
    }

    fn log_finished(&self, operation: &str, error: Option<&OperationError>) {
        match error {
            None => self.log.info(
                "operation.finished",
                &[
                    ("operation", Value::from(operation)),
                    ("ok", Value::from(true)),
                ],
            ),
            Some(err) => self.log.warn(
                "operation.finished",
                &[
                    ("operation", Value::from(operation)),
                    ("ok", Value::from(false)),
                    ("error", Value::from(err.to_string())),
                ],
            ),
        }
    }

    /// Cancels open work and records the final counts.
    pub fn close(&mut self) {
        if let Some(mut wizard) = self.wizard.take() {
            if wizard.lifecycle() == WizardLifecycle::Open {
                if let Err(err) = wizard.cancel() {
                    self.log.warn(
                        "wizard.cancel_failed",
                        &[
                            ("kind", Value::from(wizard.kind())),
                            ("error", Value::from(err.to_string())),
                        ],
                    );
                }
            }
        }
        self.designer.cancel();
        self.pending_delete = None;
        let fields: Vec<(&str, Value)> = [
            ("agents", self.catalog.agents.len()),
            ("endpoints", self.catalog.endpoints.len()),
            ("pipelines", self.catalog.pipelines.len()),
            ("tasks", self.catalog.tasks.len()),
            ("reports", self.catalog.reports.len()),
        ]
        .into_iter()
        .map(|(key, count)| (key, Value::from(count)))
        .collect();
        self.log.info("console.closed", &fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    const NOW: i64 = 1_700_000_000;

    fn state() -> ConsoleState {
        let mut settings = ConsoleSettings::default();
        settings.operations.connection_test_delay_ms = 5;
        settings.operations.report_generation_delay_ms = 5;
        ConsoleState::new(
            Catalog::demo().expect("catalog"),
            settings,
            EventLog::disabled(),
        )
        .expect("state")
    }

    fn press(state: &mut ConsoleState, code: KeyCode) -> ConsoleFlow {
        state.handle_key(KeyEvent::new(code, KeyModifiers::NONE), NOW)
    }

    fn type_text(state: &mut ConsoleState, text: &str) {
        for ch in text.chars() {
            press(state, KeyCode::Char(ch));
        }
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut state = state();
        let first = state.catalog.agents.get_index(0).expect("agent").id.clone();
        press(&mut state, KeyCode::Char('d'));
        assert!(state.pending_delete().is_some());
        press(&mut state, KeyCode::Char('n'));
        assert_eq!(state.catalog.agents.len(), 4);

        press(&mut state, KeyCode::Char('d'));
        press(&mut state, KeyCode::Char('y'));
        assert_eq!(state.catalog.agents.len(), 3);
        assert!(state.catalog.agents.get(&first).is_none());
    }

    #[test]
    fn role_filter_narrows_visible_agents() {
        let mut state = state();
        press(&mut state, KeyCode::Char('t'));
        assert_eq!(state.role_filter(), Some(AgentRole::Source));
        assert!(state
            .visible_agents()
            .iter()
            .all(|agent| agent.role == AgentRole::Source));
        for _ in 0..4 {
            press(&mut state, KeyCode::Char('t'));
        }
        assert_eq!(state.role_filter(), None);
    }

    #[test]
    fn wizard_takes_over_letter_keys_and_esc_cancels() {
        let mut state = state();
        press(&mut state, KeyCode::Tab);
        press(&mut state, KeyCode::Tab);
        press(&mut state, KeyCode::Tab);
        assert_eq!(state.screen(), ConsoleScreen::Tasks);
        press(&mut state, KeyCode::Char('a'));
        assert!(state.wizard_open());
        assert_eq!(press(&mut state, KeyCode::Char('q')), ConsoleFlow::Continue);
        assert!(state.wizard_open());
        press(&mut state, KeyCode::Esc);
        assert!(!state.wizard_open());
        assert_eq!(state.catalog.tasks.len(), 1);
    }

    #[test]
    fn blocked_step_keeps_wizard_on_step_one() {
        let mut state = state();
        press(&mut state, KeyCode::Tab);
        press(&mut state, KeyCode::Char('a'));
        press(&mut state, KeyCode::Enter);
        let view = state.wizard_view(NOW).expect("wizard");
        assert_eq!(view.step, 1);
        assert!(view.error.is_some());
    }

    #[test]
    fn report_generation_lands_in_catalog() {
        let mut state = state();
        press(&mut state, KeyCode::BackTab);
        assert_eq!(state.screen(), ConsoleScreen::Reports);
        type_text(&mut state, "Daily");
        for _ in 0..4 {
            press(&mut state, KeyCode::Down);
        }
        press(&mut state, KeyCode::Enter);
        assert!(state.designer().is_generating());
        assert!(state.wait_for_operations(Duration::from_secs(5)));
        assert_eq!(state.catalog.reports.len(), 1);
        assert_eq!(press(&mut state, KeyCode::Esc), ConsoleFlow::Quit);
    }

    #[test]
    fn close_cancels_open_wizard_only() {
        let catalog = Catalog::demo().expect("catalog");
        let mut wizard = ActiveWizard::Task(TaskWizard::create(&catalog));
        assert_eq!(wizard.lifecycle(), WizardLifecycle::Open);
        assert_eq!(wizard.cancel(), Ok(()));
        assert_eq!(wizard.lifecycle(), WizardLifecycle::Cancelled);
        assert_eq!(wizard.cancel(), Err(WizardError::Closed));

        let dir = tempfile::tempdir().expect("tempdir");
        let mut state = state();
        state.log = EventLog::for_state_root(dir.path());
        state.wizard = Some(wizard);
        state.close();
        assert!(!state.wizard_open());

        let mut state = self::state();
        press(&mut state, KeyCode::Tab);
        press(&mut state, KeyCode::Char('a'));
        assert!(state.wizard_open());
        state.log = EventLog::for_state_root(dir.path());
        state.close();
        assert!(!state.wizard_open());

        let log = std::fs::read_to_string(dir.path().join("logs/console.log")).expect("log");
        assert!(!log.contains("wizard.cancel_failed"));
        assert_eq!(log.matches("console.closed").count(), 2);
    }

    #[test]
    fn agents_screen_quits_on_q() {
        let mut state = state();
        assert_eq!(press(&mut state, KeyCode::Char('q')), ConsoleFlow::Quit);
        state.close();
    }
}
