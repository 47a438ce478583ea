use super::{
    missing_choice, FieldInput, FieldSpec, FieldValue, InputKind, SearchableSelect, StepCheck,
    ValidationError, Wizard, WizardCore,
};
use crate::catalog::Catalog;
use crate::model::{
    format_run_at, Endpoint, EndpointRole, Pipeline, ScheduleKind, Task, TaskSchedule,
    TaskSource, TaskStatus, TaskType,
};
use crate::shared::ids::TaskId;

const STEP_TITLES: &[&str] = &["Type", "General", "Source", "Schedule"];
const TYPE_STEP: usize = 1;
const GENERAL_STEP: usize = 2;
const SOURCE_STEP: usize = 3;
const SCHEDULE_STEP: usize = 4;
const DEFAULT_TIMEZONE: &str = "UTC";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    TaskType,
    Name,
    Description,
    Pipeline,
    SourceEndpoint,
    TargetEndpoint,
    ScheduleKind,
    IntervalSeconds,
    CronExpression,
    Timezone,
}

#[derive(Debug)]
pub struct TaskWizard {
    core: WizardCore,
    existing: Option<TaskId>,
    status: TaskStatus,
    task_type: SearchableSelect<TaskType>,
    name: String,
    description: String,
    pipeline: SearchableSelect<Pipeline>,
    source_endpoint: SearchableSelect<Endpoint>,
    target_endpoint: SearchableSelect<Endpoint>,
    schedule_kind: SearchableSelect<ScheduleKind>,
    interval_seconds: String,
    cron_expression: String,
    timezone: String,
}

fn endpoint_label(endpoint: &Endpoint) -> String {
    endpoint.label()
}

impl TaskWizard {
    pub fn create(catalog: &Catalog) -> Self {
        let mut schedule_kind = SearchableSelect::new(ScheduleKind::ALL.to_vec(), |kind| {
            kind.label().to_string()
        });
        schedule_kind.select_where(|kind| *kind == ScheduleKind::Manual);
        Self {
            core: WizardCore::new(STEP_TITLES.len()),
            existing: None,
            status: TaskStatus::Idle,
            task_type: SearchableSelect::new(TaskType::ALL.to_vec(), |kind| {
                kind.label().to_string()
            }),
            name: String::new(),
            description: String::new(),
            pipeline: SearchableSelect::new(catalog.pipelines.iter().cloned().collect(), |p| {
                p.name.clone()
            }),
            source_endpoint: SearchableSelect::new(
                catalog.endpoints_with_role(EndpointRole::Source),
                endpoint_label,
            ),
            target_endpoint: SearchableSelect::new(
                catalog.endpoints_with_role(EndpointRole::Target),
                endpoint_label,
            ),
            schedule_kind,
            interval_seconds: String::new(),
            cron_expression: String::new(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }

    pub fn edit(existing: &Task, catalog: &Catalog) -> Self {
        let mut wizard = Self::create(catalog);
        wizard.existing = Some(existing.id.clone());
        wizard.status = existing.status;
        wizard
            .task_type
            .select_where(|kind| *kind == existing.task_type);
        wizard.name = existing.name.clone();
        wizard.description = existing.description.clone();
        match &existing.source {
            TaskSource::Pipeline { pipeline_id } => {
                wizard
                    .pipeline
                    .select_where(|pipeline| &pipeline.id == pipeline_id);
            }
            TaskSource::DatabasePair {
                source_endpoint_id,
                target_endpoint_id,
            } => {
                wizard
                    .source_endpoint
                    .select_where(|endpoint| &endpoint.id == source_endpoint_id);
                wizard
                    .target_endpoint
                    .select_where(|endpoint| &endpoint.id == target_endpoint_id);
            }
        }
        let kind = existing.schedule.kind();
        wizard.schedule_kind.select_where(|candidate| *candidate == kind);
        match &existing.schedule {
            TaskSchedule::Manual => {}
            TaskSchedule::Interval { every_seconds } => {
                wizard.interval_seconds = every_seconds.to_string();
            }
            TaskSchedule::Cron {
                expression,
                timezone,
            } => {
                wizard.cron_expression = expression.clone();
                wizard.timezone = timezone.clone();
            }
        }
        wizard
    }

    fn uses_pipeline(&self) -> bool {
        self.task_type
            .selected()
            .is_some_and(|kind| kind.uses_pipeline())
    }

    fn schedule(&self) -> Result<TaskSchedule, String> {
        match self.schedule_kind.selected() {
            None | Some(ScheduleKind::Manual) => Ok(TaskSchedule::Manual),
            Some(ScheduleKind::Interval) => {
                let every_seconds = self
                    .interval_seconds
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| "interval seconds must be a number".to_string())?;
                Ok(TaskSchedule::Interval { every_seconds })
            }
            Some(ScheduleKind::Cron) => Ok(TaskSchedule::Cron {
                expression: self.cron_expression.trim().to_string(),
                timezone: self.timezone.trim().to_string(),
            }),
        }
    }

    fn source(&self) -> Result<TaskSource, ValidationError> {
        if self.uses_pipeline() {
            let pipeline = self
                .pipeline
                .selected()
                .ok_or_else(|| missing_choice(SOURCE_STEP, "pipeline"))?;
            return Ok(TaskSource::Pipeline {
                pipeline_id: pipeline.id.clone(),
            });
        }
        let source = self
            .source_endpoint
            .selected()
            .ok_or_else(|| missing_choice(SOURCE_STEP, "source endpoint"))?;
        let target = self
            .target_endpoint
            .selected()
            .ok_or_else(|| missing_choice(SOURCE_STEP, "target endpoint"))?;
        Ok(TaskSource::DatabasePair {
            source_endpoint_id: source.id.clone(),
            target_endpoint_id: target.id.clone(),
        })
    }
}

impl Wizard for TaskWizard {
    type Record = Task;
    type Field = TaskField;

    fn noun(&self) -> &'static str {
        "task"
    }

    fn step_titles(&self) -> &'static [&'static str] {
        STEP_TITLES
    }

    fn core(&self) -> &WizardCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WizardCore {
        &mut self.core
    }

    fn existing_id(&self) -> Option<&TaskId> {
        self.existing.as_ref()
    }

    fn generate_id(&self, now: i64) -> Result<TaskId, String> {
        TaskId::generate(now)
    }

    fn fields_on_step(&self, step: usize) -> Vec<TaskField> {
        match step {
            TYPE_STEP => vec![TaskField::TaskType],
            GENERAL_STEP => vec![TaskField::Name, TaskField::Description],
            SOURCE_STEP if self.uses_pipeline() => vec![TaskField::Pipeline],
            SOURCE_STEP => vec![TaskField::SourceEndpoint, TaskField::TargetEndpoint],
            SCHEDULE_STEP => match self.schedule_kind.selected() {
                Some(ScheduleKind::Interval) => {
                    vec![TaskField::ScheduleKind, TaskField::IntervalSeconds]
                }
                Some(ScheduleKind::Cron) => vec![
                    TaskField::ScheduleKind,
                    TaskField::CronExpression,
                    TaskField::Timezone,
                ],
                _ => vec![TaskField::ScheduleKind],
            },
            _ => Vec::new(),
        }
    }

    fn field_spec(&self, field: TaskField) -> FieldSpec {
        match field {
            TaskField::TaskType => FieldSpec::required("Task type", InputKind::Choice),
            TaskField::Name => FieldSpec::required("Name", InputKind::Text),
            TaskField::Description => FieldSpec::optional("Description", InputKind::Text),
            TaskField::Pipeline => FieldSpec::required("Pipeline", InputKind::Choice),
            TaskField::SourceEndpoint => FieldSpec::required("Source endpoint", InputKind::Choice),
            TaskField::TargetEndpoint => FieldSpec::required("Target endpoint", InputKind::Choice),
            TaskField::ScheduleKind => FieldSpec::required("Schedule", InputKind::Choice),
            TaskField::IntervalSeconds => {
                FieldSpec::required("Every (seconds)", InputKind::Number)
            }
            TaskField::CronExpression => FieldSpec::required("Cron expression", InputKind::Text),
            TaskField::Timezone => FieldSpec::required("Timezone", InputKind::Text),
        }
    }

    fn field_value(&self, field: TaskField) -> FieldValue<'_> {
        match field {
            TaskField::TaskType => FieldValue::Choice(&self.task_type),
            TaskField::Name => FieldValue::Text(&self.name),
            TaskField::Description => FieldValue::Text(&self.description),
            TaskField::Pipeline => FieldValue::Choice(&self.pipeline),
            TaskField::SourceEndpoint => FieldValue::Choice(&self.source_endpoint),
            TaskField::TargetEndpoint => FieldValue::Choice(&self.target_endpoint),
            TaskField::ScheduleKind => FieldValue::Choice(&self.schedule_kind),
            TaskField::IntervalSeconds => FieldValue::Text(&self.interval_seconds),
            TaskField::CronExpression => FieldValue::Text(&self.cron_expression),
            TaskField::Timezone => FieldValue::Text(&self.timezone),
        }
    }

    fn field_input(&mut self, field: TaskField) -> FieldInput<'_> {
        match field {
            TaskField::TaskType => FieldInput::Choice(&mut self.task_type),
            TaskField::Name => FieldInput::Text(&mut self.name),
            TaskField::Description => FieldInput::Text(&mut self.description),
            TaskField::Pipeline => FieldInput::Choice(&mut self.pipeline),
            TaskField::SourceEndpoint => FieldInput::Choice(&mut self.source_endpoint),
            TaskField::TargetEndpoint => FieldInput::Choice(&mut self.target_endpoint),
            TaskField::ScheduleKind => FieldInput::Choice(&mut self.schedule_kind),
            TaskField::IntervalSeconds => FieldInput::Text(&mut self.interval_seconds),
            TaskField::CronExpression => FieldInput::Text(&mut self.cron_expression),
            TaskField::Timezone => FieldInput::Text(&mut self.timezone),
        }
    }

    fn validate_step(&self, step: usize) -> Result<(), ValidationError> {
        match step {
            TYPE_STEP => StepCheck::new(step)
                .require_choice("task type", self.task_type.selected())
                .finish(),
            GENERAL_STEP => StepCheck::new(step).require("name", &self.name).finish(),
            SOURCE_STEP if self.uses_pipeline() => StepCheck::new(step)
                .require_choice("pipeline", self.pipeline.selected())
                .finish(),
            SOURCE_STEP => {
                let source = self.source_endpoint.selected();
                let target = self.target_endpoint.selected();
                let distinct = match (source, target) {
                    (Some(source), Some(target)) => source.id != target.id,
                    _ => true,
                };
                StepCheck::new(step)
                    .require_choice("source endpoint", source)
                    .require_choice("target endpoint", target)
                    .ensure(distinct, "source and target endpoints must differ")
                    .finish()
            }
            SCHEDULE_STEP => {
                let mut check = StepCheck::new(step)
                    .require_choice("schedule", self.schedule_kind.selected());
                let ready = match self.schedule_kind.selected() {
                    Some(ScheduleKind::Interval) => {
                        check = check.require("interval seconds", &self.interval_seconds);
                        !self.interval_seconds.trim().is_empty()
                    }
                    Some(ScheduleKind::Cron) => {
                        check = check
                            .require("cron expression", &self.cron_expression)
                            .require("timezone", &self.timezone);
                        !self.cron_expression.trim().is_empty()
                            && !self.timezone.trim().is_empty()
                    }
                    _ => true,
                };
                if ready {
                    check = check.check(self.schedule().and_then(|schedule| schedule.validate()));
                }
                check.finish()
            }
            _ => Ok(()),
        }
    }

    fn assemble(&self, id: TaskId) -> Result<Task, ValidationError> {
        let task_type = *self
            .task_type
            .selected()
            .ok_or_else(|| missing_choice(TYPE_STEP, "task type"))?;
        let schedule = self.schedule().map_err(|problem| ValidationError {
            step: SCHEDULE_STEP,
            missing: Vec::new(),
            problems: vec![problem],
        })?;
        Ok(Task {
            id,
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            task_type,
            source: self.source()?,
            schedule,
            status: self.status,
        })
    }

    fn summary_lines(&self, now: i64) -> Vec<String> {
        let mut lines = vec![format!("Name: {}", self.name.trim())];
        if let Some(kind) = self.task_type.selected() {
            lines.push(format!("Type: {}", kind.as_str()));
        }
        if let Ok(source) = self.source() {
            lines.push(format!("Source: {}", source.describe()));
        }
        match self.schedule() {
            Ok(schedule) => {
                lines.push(format!("Schedule: {}", schedule.describe()));
                match schedule.next_run_at(now) {
                    Ok(Some(at)) => lines.push(format!("Next run: {}", format_run_at(at))),
                    Ok(None) => lines.push("Next run: on demand".to_string()),
                    Err(_) => {}
                }
            }
            Err(problem) => lines.push(format!("Schedule: {problem}")),
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::{RecordingTarget, StepOutcome, WizardError, WizardLifecycle};

    const NOW: i64 = 1_700_000_000;

    fn type_text(wizard: &mut TaskWizard, text: &str) {
        for ch in text.chars() {
            wizard.type_char(ch).expect("type");
        }
    }

    #[test]
    fn nightly_load_is_appended_as_idle_initial_load() {
        let mut catalog = Catalog::demo().expect("catalog");
        let mut wizard = TaskWizard::create(&catalog);
        assert_eq!(wizard.total_steps(), 4);

        type_text(&mut wizard, "initial");
        assert_eq!(wizard.next(), Ok(StepOutcome::Advanced(2)));
        type_text(&mut wizard, "Nightly Load");
        assert_eq!(wizard.next(), Ok(StepOutcome::Advanced(3)));
        type_text(&mut wizard, "oracle");
        wizard.move_focus(true);
        type_text(&mut wizard, "replica");
        assert_eq!(wizard.next(), Ok(StepOutcome::Advanced(4)));

        let deployed = wizard.deploy(&mut catalog.tasks, NOW).expect("deploy");
        assert_eq!(catalog.tasks.len(), 2);
        let task = catalog.tasks.get_index(1).expect("appended task");
        assert_eq!(task, &deployed.record);
        assert_eq!(task.name, "Nightly Load");
        assert_eq!(task.task_type, TaskType::InitialLoad);
        assert_eq!(task.status, TaskStatus::Idle);
        assert!(task.id.as_str().starts_with("task-"));
        assert_eq!(
            task.source,
            TaskSource::DatabasePair {
                source_endpoint_id: "ep-orders-ora".to_string().try_into().expect("id"),
                target_endpoint_id: "ep-orders-pg".to_string().try_into().expect("id"),
            }
        );
    }

    #[test]
    fn missing_type_blocks_first_step() {
        let catalog = Catalog::demo().expect("catalog");
        let mut wizard = TaskWizard::create(&catalog);
        let outcome = wizard.next().expect("open");
        let StepOutcome::Blocked(err) = outcome else {
            panic!("expected blocked outcome");
        };
        assert_eq!(err.missing, vec!["task type"]);
        assert_eq!(wizard.current_step(), 1);
        assert_eq!(wizard.back(), Ok(false));
    }

    #[test]
    fn automation_tasks_take_a_pipeline_source() {
        let catalog = Catalog::demo().expect("catalog");
        let mut wizard = TaskWizard::create(&catalog);
        type_text(&mut wizard, "automation");
        wizard.next().expect("type");
        type_text(&mut wizard, "Restart orders");
        wizard.next().expect("general");
        assert_eq!(wizard.fields_on_step(SOURCE_STEP), vec![TaskField::Pipeline]);
        assert!(matches!(wizard.next(), Ok(StepOutcome::Blocked(_))));
        wizard.cycle_choice(true).expect("pick pipeline");
        assert_eq!(wizard.next(), Ok(StepOutcome::Advanced(4)));
        let task = wizard.assemble(TaskId::parse("task-x").expect("id")).expect("task");
        assert_eq!(
            task.source.describe(),
            "pipeline pl-orders".to_string()
        );
    }

    #[test]
    fn invalid_cron_blocks_schedule_step() {
        let catalog = Catalog::demo().expect("catalog");
        let mut wizard = TaskWizard::create(&catalog);
        wizard.schedule_kind.select_where(|kind| *kind == ScheduleKind::Cron);
        let err = wizard.validate_step(SCHEDULE_STEP).expect_err("empty cron");
        assert_eq!(err.missing, vec!["cron expression"]);

        wizard.cron_expression = "61 * * * *".to_string();
        assert!(wizard.validate_step(SCHEDULE_STEP).is_err());
        wizard.cron_expression = "0 2 * * *".to_string();
        wizard.timezone = "Mars/Olympus".to_string();
        assert!(wizard.validate_step(SCHEDULE_STEP).is_err());
        wizard.timezone = "Europe/Berlin".to_string();
        assert!(wizard.validate_step(SCHEDULE_STEP).is_ok());
    }

    #[test]
    fn cancel_leaves_the_task_list_untouched() {
        let catalog = Catalog::demo().expect("catalog");
        let before = catalog.tasks.clone();
        let mut wizard = TaskWizard::create(&catalog);
        type_text(&mut wizard, "initial");
        wizard.next().expect("type");
        wizard.cancel().expect("cancel");
        assert_eq!(wizard.lifecycle(), WizardLifecycle::Cancelled);

        let mut target = RecordingTarget::default();
        assert_eq!(wizard.deploy(&mut target, NOW), Err(WizardError::Closed));
        assert!(target.saved.is_empty());
        assert_eq!(catalog.tasks.as_slice(), before.as_slice());
    }

    #[test]
    fn edit_keeps_id_status_and_schedule() {
        let mut catalog = Catalog::demo().expect("catalog");
        let existing = catalog.tasks.get_index(0).expect("task").clone();
        let mut wizard = TaskWizard::edit(&existing, &catalog);
        for _ in 1..4 {
            assert!(matches!(wizard.next(), Ok(StepOutcome::Advanced(_))));
        }
        let summary = wizard.summary_lines(NOW);
        assert!(summary.iter().any(|line| line.starts_with("Next run: ")));
        let deployed = wizard.deploy(&mut catalog.tasks, NOW).expect("deploy");
        assert_eq!(deployed.record, existing);
        assert_eq!(catalog.tasks.len(), 1);
    }
}
