//! Multi-step record wizards.
//!
//! A wizard owns a [`Stepper`], its typed fields and a lifecycle. Advancing is
//! gated on the current step's validation; deploy is only accepted on the
//! final step, validates every step, assembles one record and hands it to a
//! [`SaveTarget`] exactly once. Cancelling never touches the target.

pub mod endpoint;
pub mod pipeline;
pub mod select;
pub mod stepper;
pub mod task;
pub mod validation;

pub use endpoint::{EndpointField, EndpointWizard};
pub use pipeline::{PipelineField, PipelineWizard};
pub use select::{ChoiceList, SearchableSelect};
pub use stepper::{StepOutcome, Stepper};
pub use task::{TaskField, TaskWizard};
pub use validation::{missing_choice, parse_optional_number, StepCheck, ValidationError};

use crate::catalog::{SaveOutcome, SaveTarget};
use crate::model::Record;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("{0}")]
    Validation(ValidationError),
    #[error("deploy is only available on the final step (currently step {current} of {total})")]
    NotOnFinalStep { current: usize, total: usize },
    #[error("wizard is closed")]
    Closed,
    #[error("failed to generate record id: {0}")]
    IdGeneration(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardLifecycle {
    Open,
    Deployed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Secret,
    Number,
    Choice,
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub label: &'static str,
    pub kind: InputKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(label: &'static str, kind: InputKind) -> Self {
        Self {
            label,
            kind,
            required: true,
        }
    }

    pub const fn optional(label: &'static str, kind: InputKind) -> Self {
        Self {
            label,
            kind,
            required: false,
        }
    }
}

pub enum FieldValue<'a> {
    Text(&'a str),
    Choice(&'a dyn ChoiceList),
    Toggle(bool),
}

pub enum FieldInput<'a> {
    Text(&'a mut String),
    Choice(&'a mut dyn ChoiceList),
    Toggle(&'a mut bool),
}

/// State shared by every wizard: step pointer, focus, lifecycle, inline error.
#[derive(Debug, Clone)]
pub struct WizardCore {
    stepper: Stepper,
    lifecycle: WizardLifecycle,
    focus: usize,
    last_error: Option<String>,
}

impl WizardCore {
    pub fn new(steps: usize) -> Self {
        Self {
            stepper: Stepper::new(steps),
            lifecycle: WizardLifecycle::Open,
            focus: 0,
            last_error: None,
        }
    }

    pub fn stepper(&self) -> &Stepper {
        &self.stepper
    }

    pub fn lifecycle(&self) -> WizardLifecycle {
        self.lifecycle
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    fn ensure_open(&self) -> Result<(), WizardError> {
        if self.lifecycle == WizardLifecycle::Open {
            Ok(())
        } else {
            Err(WizardError::Closed)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Deployed<R> {
    pub record: R,
    pub outcome: SaveOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRow {
    pub label: &'static str,
    pub kind: InputKind,
    pub required: bool,
    pub focused: bool,
    pub value: String,
    pub query: String,
    pub matches: Vec<String>,
}

/// Everything the renderer needs to draw an open wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardView {
    pub title: String,
    pub step: usize,
    pub total: usize,
    pub step_titles: Vec<&'static str>,
    pub rows: Vec<FieldRow>,
    pub summary: Vec<String>,
    pub error: Option<String>,
    pub operation: Option<String>,
}

pub trait Wizard {
    type Record: Record;
    type Field: Copy + Eq + std::fmt::Debug;

    /// Record noun used in titles, e.g. "endpoint".
    fn noun(&self) -> &'static str;
    fn step_titles(&self) -> &'static [&'static str];
    fn core(&self) -> &WizardCore;
    fn core_mut(&mut self) -> &mut WizardCore;
    fn existing_id(&self) -> Option<&<Self::Record as Record>::Id>;
    fn generate_id(&self, now: i64) -> Result<<Self::Record as Record>::Id, String>;

    fn fields_on_step(&self, step: usize) -> Vec<Self::Field>;
    fn field_spec(&self, field: Self::Field) -> FieldSpec;
    fn field_value(&self, field: Self::Field) -> FieldValue<'_>;
    fn field_input(&mut self, field: Self::Field) -> FieldInput<'_>;

    /// Hook for fields whose options depend on another field.
    fn after_edit(&mut self, _field: Self::Field) {}

    fn validate_step(&self, step: usize) -> Result<(), ValidationError>;
    /// Builds the record from the current fields. Callers validate first.
    fn assemble(
        &self,
        id: <Self::Record as Record>::Id,
    ) -> Result<Self::Record, ValidationError>;
    fn summary_lines(&self, now: i64) -> Vec<String>;

    fn operation_line(&self) -> Option<String> {
        None
    }

    /// Stops background work owned by the wizard when it closes.
    fn release_operations(&mut self) {}

    fn is_edit(&self) -> bool {
        self.existing_id().is_some()
    }

    fn title(&self) -> String {
        if self.is_edit() {
            format!("Edit {}", self.noun())
        } else {
            format!("New {}", self.noun())
        }
    }

    fn current_step(&self) -> usize {
        self.core().stepper.current()
    }

    fn total_steps(&self) -> usize {
        self.core().stepper.total()
    }

    fn lifecycle(&self) -> WizardLifecycle {
        self.core().lifecycle
    }

    fn focused_field(&self) -> Option<Self::Field> {
        self.fields_on_step(self.current_step())
            .get(self.core().focus)
            .copied()
    }

    fn move_focus(&mut self, forward: bool) {
        let len = self.fields_on_step(self.current_step()).len();
        let core = self.core_mut();
        if len == 0 {
            core.focus = 0;
        } else if forward {
            core.focus = (core.focus + 1).min(len - 1);
        } else {
            core.focus = core.focus.saturating_sub(1);
        }
    }

    /// Types into the focused field: appends to text, filters a choice,
    /// flips a toggle on space.
    fn type_char(&mut self, ch: char) -> Result<(), WizardError> {
        self.core().ensure_open()?;
        let Some(field) = self.focused_field() else {
            return Ok(());
        };
        let kind = self.field_spec(field).kind;
        match self.field_input(field) {
            FieldInput::Text(value) => {
                if kind != InputKind::Number || ch.is_ascii_digit() {
                    value.push(ch);
                }
            }
            FieldInput::Choice(choice) => choice.push_char(ch),
            FieldInput::Toggle(value) => {
                if ch == ' ' {
                    *value = !*value;
                }
            }
        }
        self.after_edit(field);
        Ok(())
    }

    /// Deletes one character. On an optional choice with an empty query it
    /// clears the selection instead.
    fn backspace(&mut self) -> Result<(), WizardError> {
        self.core().ensure_open()?;
        let Some(field) = self.focused_field() else {
            return Ok(());
        };
        let required = self.field_spec(field).required;
        match self.field_input(field) {
            FieldInput::Text(value) => {
                value.pop();
            }
            FieldInput::Choice(choice) if !required && choice.query().is_empty() => {
                choice.clear_selection()
            }
            FieldInput::Choice(choice) => choice.pop_char(),
            FieldInput::Toggle(_) => {}
        }
        self.after_edit(field);
        Ok(())
    }

    fn cycle_choice(&mut self, forward: bool) -> Result<(), WizardError> {
        self.core().ensure_open()?;
        let Some(field) = self.focused_field() else {
            return Ok(());
        };
        match self.field_input(field) {
            FieldInput::Choice(choice) => choice.cycle(forward),
            FieldInput::Toggle(value) => *value = !*value,
            FieldInput::Text(_) => return Ok(()),
        }
        self.after_edit(field);
        Ok(())
    }

    fn next(&mut self) -> Result<StepOutcome, WizardError> {
        self.core().ensure_open()?;
        let check = self.validate_step(self.current_step());
        let core = self.core_mut();
        let outcome = core.stepper.next(check);
        match &outcome {
            StepOutcome::Advanced(_) => {
                core.focus = 0;
                core.last_error = None;
            }
            StepOutcome::Blocked(err) => core.last_error = Some(err.to_string()),
            StepOutcome::AtLastStep => {}
        }
        Ok(outcome)
    }

    fn back(&mut self) -> Result<bool, WizardError> {
        self.core().ensure_open()?;
        let core = self.core_mut();
        let moved = core.stepper.back();
        if moved {
            core.focus = 0;
            core.last_error = None;
        }
        Ok(moved)
    }

    fn validate_all(&self) -> Result<(), ValidationError> {
        (1..=self.total_steps()).try_for_each(|step| self.validate_step(step))
    }

    /// Assembles the record and hands it to `target`. Only valid on the
    /// final step of an open wizard; closes the wizard on success.
    fn deploy<S>(&mut self, target: &mut S, now: i64) -> Result<Deployed<Self::Record>, WizardError>
    where
        S: SaveTarget<Self::Record> + ?Sized,
    {
        self.core().ensure_open()?;
        let stepper = *self.core().stepper();
        if !stepper.is_last() {
            return Err(WizardError::NotOnFinalStep {
                current: stepper.current(),
                total: stepper.total(),
            });
        }
        if let Err(err) = self.validate_all() {
            self.core_mut().last_error = Some(err.to_string());
            return Err(WizardError::Validation(err));
        }
        let id = match self.existing_id() {
            Some(id) => id.clone(),
            None => self.generate_id(now).map_err(WizardError::IdGeneration)?,
        };
        let record = self.assemble(id).map_err(WizardError::Validation)?;
        let outcome = target.on_save(record.clone());
        self.release_operations();
        let core = self.core_mut();
        core.lifecycle = WizardLifecycle::Deployed;
        core.last_error = None;
        Ok(Deployed { record, outcome })
    }

    fn cancel(&mut self) -> Result<(), WizardError> {
        self.core().ensure_open()?;
        self.release_operations();
        self.core_mut().lifecycle = WizardLifecycle::Cancelled;
        Ok(())
    }

    fn view(&self, now: i64) -> WizardView {
        let step = self.current_step();
        let focus = self.core().focus;
        let rows = self
            .fields_on_step(step)
            .into_iter()
            .enumerate()
            .map(|(index, field)| {
                let spec = self.field_spec(field);
                let (value, query, matches) = match self.field_value(field) {
                    FieldValue::Text(text) if spec.kind == InputKind::Secret => {
                        ("*".repeat(text.chars().count()), String::new(), Vec::new())
                    }
                    FieldValue::Text(text) => (text.to_string(), String::new(), Vec::new()),
                    FieldValue::Choice(choice) => (
                        choice.selected_label().unwrap_or_default(),
                        choice.query().to_string(),
                        choice.match_labels(),
                    ),
                    FieldValue::Toggle(on) => {
                        let value = if on { "on" } else { "off" };
                        (value.to_string(), String::new(), Vec::new())
                    }
                };
                FieldRow {
                    label: spec.label,
                    kind: spec.kind,
                    required: spec.required,
                    focused: index == focus,
                    value,
                    query,
                    matches,
                }
            })
            .collect();
        WizardView {
            title: self.title(),
            step,
            total: self.total_steps(),
            step_titles: self.step_titles().to_vec(),
            rows,
            summary: if self.core().stepper.is_last() {
                self.summary_lines(now)
            } else {
                Vec::new()
            },
            error: self.core().last_error.clone(),
            operation: self.operation_line(),
        }
    }
}

/// Records every save it receives. Used to observe deploys in tests.
#[derive(Debug)]
pub struct RecordingTarget<R> {
    pub saved: Vec<R>,
}

impl<R> Default for RecordingTarget<R> {
    fn default() -> Self {
        Self { saved: Vec::new() }
    }
}

impl<R> SaveTarget<R> for RecordingTarget<R> {
    fn on_save(&mut self, record: R) -> SaveOutcome {
        self.saved.push(record);
        SaveOutcome::Created
    }
}
