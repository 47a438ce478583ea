use super::{
    missing_choice, parse_optional_number, ChoiceList, FieldInput, FieldSpec, FieldValue,
    InputKind, SearchableSelect, StepCheck, ValidationError, Wizard, WizardCore,
};
use crate::catalog::Catalog;
use crate::model::{
    Agent, AgentRole, ApplyMode, ConflictPolicy, Endpoint, EndpointRole, ExtractMode,
    ExtractStage, Pipeline, PipelineSide, PipelineStages, PipelineStatus, PostStage, SendStage,
    DEFAULT_BATCH_SIZE,
};
use crate::shared::ids::PipelineId;

const STEP_TITLES: &[&str] = &["General", "Source", "Target", "Stages", "Review"];
const GENERAL_STEP: usize = 1;
const SOURCE_STEP: usize = 2;
const TARGET_STEP: usize = 3;
const STAGES_STEP: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineField {
    Name,
    Description,
    SourceAgent,
    SourceEndpoint,
    TargetAgent,
    TargetEndpoint,
    RelayAgent,
    ExtractMode,
    BatchSize,
    Compression,
    Encryption,
    ApplyMode,
    ConflictPolicy,
}

#[derive(Debug)]
pub struct PipelineWizard {
    core: WizardCore,
    existing: Option<PipelineId>,
    status: PipelineStatus,
    endpoints: Vec<Endpoint>,
    name: String,
    description: String,
    source_agent: SearchableSelect<Agent>,
    source_endpoint: SearchableSelect<Endpoint>,
    target_agent: SearchableSelect<Agent>,
    target_endpoint: SearchableSelect<Endpoint>,
    relay_agent: SearchableSelect<Agent>,
    extract_mode: SearchableSelect<ExtractMode>,
    batch_size: String,
    compression: bool,
    encryption: bool,
    apply_mode: SearchableSelect<ApplyMode>,
    conflict_policy: SearchableSelect<ConflictPolicy>,
}

fn agent_label(agent: &Agent) -> String {
    agent.label()
}

fn endpoint_label(endpoint: &Endpoint) -> String {
    endpoint.label()
}

impl PipelineWizard {
    pub fn create(catalog: &Catalog) -> Self {
        let defaults = PipelineStages::default();
        let agents_for = |side: EndpointRole| catalog.agents_serving(side);
        let relays: Vec<Agent> = catalog
            .agents
            .iter()
            .filter(|agent| agent.role == AgentRole::Relay)
            .cloned()
            .collect();
        let mut wizard = Self {
            core: WizardCore::new(STEP_TITLES.len()),
            existing: None,
            status: PipelineStatus::Draft,
            endpoints: catalog.endpoints.iter().cloned().collect(),
            name: String::new(),
            description: String::new(),
            source_agent: SearchableSelect::new(agents_for(EndpointRole::Source), agent_label),
            source_endpoint: SearchableSelect::new(Vec::new(), endpoint_label),
            target_agent: SearchableSelect::new(agents_for(EndpointRole::Target), agent_label),
            target_endpoint: SearchableSelect::new(Vec::new(), endpoint_label),
            relay_agent: SearchableSelect::new(relays, agent_label),
            extract_mode: SearchableSelect::new(ExtractMode::ALL.to_vec(), |mode| {
                mode.label().to_string()
            }),
            batch_size: DEFAULT_BATCH_SIZE.to_string(),
            compression: defaults.send.compression,
            encryption: defaults.send.encryption,
            apply_mode: SearchableSelect::new(ApplyMode::ALL.to_vec(), |mode| {
                mode.label().to_string()
            }),
            conflict_policy: SearchableSelect::new(ConflictPolicy::ALL.to_vec(), |policy| {
                policy.label().to_string()
            }),
        };
        wizard.select_stages(&defaults);
        wizard
    }

    pub fn edit(existing: &Pipeline, catalog: &Catalog) -> Self {
        let mut wizard = Self::create(catalog);
        wizard.existing = Some(existing.id.clone());
        wizard.status = existing.status;
        wizard.name = existing.name.clone();
        wizard.description = existing.description.clone();
        wizard
            .source_agent
            .select_where(|agent| agent.id == existing.source.agent_id);
        wizard.refresh_endpoints(EndpointRole::Source);
        wizard
            .source_endpoint
            .select_where(|endpoint| endpoint.id == existing.source.endpoint_id);
        wizard
            .target_agent
            .select_where(|agent| agent.id == existing.target.agent_id);
        wizard.refresh_endpoints(EndpointRole::Target);
        wizard
            .target_endpoint
            .select_where(|endpoint| endpoint.id == existing.target.endpoint_id);
        if let Some(relay) = &existing.relay_agent_id {
            wizard.relay_agent.select_where(|agent| &agent.id == relay);
        }
        wizard.batch_size = existing.stages.extract.batch_size.to_string();
        wizard.compression = existing.stages.send.compression;
        wizard.encryption = existing.stages.send.encryption;
        wizard.select_stages(&existing.stages);
        wizard
    }

    fn select_stages(&mut self, stages: &PipelineStages) {
        self.extract_mode
            .select_where(|mode| *mode == stages.extract.mode);
        self.apply_mode
            .select_where(|mode| *mode == stages.post.apply_mode);
        self.conflict_policy
            .select_where(|policy| *policy == stages.post.conflict_policy);
    }

    /// Re-derives the endpoint options of one side from its chosen agent.
    fn refresh_endpoints(&mut self, side: EndpointRole) {
        let (agent, select) = match side {
            EndpointRole::Source => (&self.source_agent, &mut self.source_endpoint),
            EndpointRole::Target => (&self.target_agent, &mut self.target_endpoint),
        };
        let options = match agent.selected() {
            Some(agent) => self
                .endpoints
                .iter()
                .filter(|endpoint| endpoint.role == side && endpoint.agent_id == agent.id)
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        select.set_options(options);
    }

    fn side(
        step: usize,
        agent: &SearchableSelect<Agent>,
        endpoint: &SearchableSelect<Endpoint>,
    ) -> Result<PipelineSide, ValidationError> {
        let agent = agent
            .selected()
            .ok_or_else(|| missing_choice(step, "agent"))?;
        let endpoint = endpoint
            .selected()
            .ok_or_else(|| missing_choice(step, "endpoint"))?;
        Ok(PipelineSide {
            agent_id: agent.id.clone(),
            endpoint_id: endpoint.id.clone(),
        })
    }

    fn check_side(
        step: usize,
        agent: &SearchableSelect<Agent>,
        endpoint: &SearchableSelect<Endpoint>,
    ) -> StepCheck {
        let bound = match (agent.selected(), endpoint.selected()) {
            (Some(agent), Some(endpoint)) => endpoint.agent_id == agent.id,
            _ => true,
        };
        StepCheck::new(step)
            .require_choice("agent", agent.selected())
            .require_choice("endpoint", endpoint.selected())
            .ensure(bound, "endpoint must be bound to the selected agent")
    }

    fn stages(&self) -> Result<PipelineStages, ValidationError> {
        let batch_size = self
            .batch_size
            .trim()
            .parse::<u32>()
            .map_err(|_| missing_choice(STAGES_STEP, "batch size"))?;
        Ok(PipelineStages {
            extract: ExtractStage {
                mode: self.extract_mode.selected().copied().unwrap_or_default(),
                batch_size,
            },
            send: SendStage {
                compression: self.compression,
                encryption: self.encryption,
            },
            post: PostStage {
                apply_mode: self.apply_mode.selected().copied().unwrap_or_default(),
                conflict_policy: self.conflict_policy.selected().copied().unwrap_or_default(),
            },
        })
    }
}

impl Wizard for PipelineWizard {
    type Record = Pipeline;
    type Field = PipelineField;

    fn noun(&self) -> &'static str {
        "pipeline"
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

    fn existing_id(&self) -> Option<&PipelineId> {
        self.existing.as_ref()
    }

    fn generate_id(&self, now: i64) -> Result<PipelineId, String> {
        PipelineId::generate(now)
    }

    fn fields_on_step(&self, step: usize) -> Vec<PipelineField> {
        match step {
            GENERAL_STEP => vec![PipelineField::Name, PipelineField::Description],
            SOURCE_STEP => vec![PipelineField::SourceAgent, PipelineField::SourceEndpoint],
            TARGET_STEP => vec![
                PipelineField::TargetAgent,
                PipelineField::TargetEndpoint,
                PipelineField::RelayAgent,
            ],
            STAGES_STEP => vec![
                PipelineField::ExtractMode,
                PipelineField::BatchSize,
                PipelineField::Compression,
                PipelineField::Encryption,
                PipelineField::ApplyMode,
                PipelineField::ConflictPolicy,
            ],
            _ => Vec::new(),
        }
    }

    fn field_spec(&self, field: PipelineField) -> FieldSpec {
        match field {
            PipelineField::Name => FieldSpec::required("Name", InputKind::Text),
            PipelineField::Description => FieldSpec::optional("Description", InputKind::Text),
            PipelineField::SourceAgent => FieldSpec::required("Source agent", InputKind::Choice),
            PipelineField::SourceEndpoint => {
                FieldSpec::required("Source endpoint", InputKind::Choice)
            }
            PipelineField::TargetAgent => FieldSpec::required("Target agent", InputKind::Choice),
            PipelineField::TargetEndpoint => {
                FieldSpec::required("Target endpoint", InputKind::Choice)
            }
            PipelineField::RelayAgent => FieldSpec::optional("Relay agent", InputKind::Choice),
            PipelineField::ExtractMode => FieldSpec::required("Extract mode", InputKind::Choice),
            PipelineField::BatchSize => FieldSpec::required("Batch size", InputKind::Number),
            PipelineField::Compression => FieldSpec::optional("Compression", InputKind::Toggle),
            PipelineField::Encryption => FieldSpec::optional("Encryption", InputKind::Toggle),
            PipelineField::ApplyMode => FieldSpec::required("Apply mode", InputKind::Choice),
            PipelineField::ConflictPolicy => {
                FieldSpec::required("Conflict policy", InputKind::Choice)
            }
        }
    }

    fn field_value(&self, field: PipelineField) -> FieldValue<'_> {
        match field {
            PipelineField::Name => FieldValue::Text(&self.name),
            PipelineField::Description => FieldValue::Text(&self.description),
            PipelineField::SourceAgent => FieldValue::Choice(&self.source_agent),
            PipelineField::SourceEndpoint => FieldValue::Choice(&self.source_endpoint),
            PipelineField::TargetAgent => FieldValue::Choice(&self.target_agent),
            PipelineField::TargetEndpoint => FieldValue::Choice(&self.target_endpoint),
            PipelineField::RelayAgent => FieldValue::Choice(&self.relay_agent),
            PipelineField::ExtractMode => FieldValue::Choice(&self.extract_mode),
            PipelineField::BatchSize => FieldValue::Text(&self.batch_size),
            PipelineField::Compression => FieldValue::Toggle(self.compression),
            PipelineField::Encryption => FieldValue::Toggle(self.encryption),
            PipelineField::ApplyMode => FieldValue::Choice(&self.apply_mode),
            PipelineField::ConflictPolicy => FieldValue::Choice(&self.conflict_policy),
        }
    }

    fn field_input(&mut self, field: PipelineField) -> FieldInput<'_> {
        match field {
            PipelineField::Name => FieldInput::Text(&mut self.name),
            PipelineField::Description => FieldInput::Text(&mut self.description),
            PipelineField::SourceAgent => FieldInput::Choice(&mut self.source_agent),
            PipelineField::SourceEndpoint => FieldInput::Choice(&mut self.source_endpoint),
            PipelineField::TargetAgent => FieldInput::Choice(&mut self.target_agent),
            PipelineField::TargetEndpoint => FieldInput::Choice(&mut self.target_endpoint),
            PipelineField::RelayAgent => FieldInput::Choice(&mut self.relay_agent),
            PipelineField::ExtractMode => FieldInput::Choice(&mut self.extract_mode),
            PipelineField::BatchSize => FieldInput::Text(&mut self.batch_size),
            PipelineField::Compression => FieldInput::Toggle(&mut self.compression),
            PipelineField::Encryption => FieldInput::Toggle(&mut self.encryption),
            PipelineField::ApplyMode => FieldInput::Choice(&mut self.apply_mode),
            PipelineField::ConflictPolicy => FieldInput::Choice(&mut self.conflict_policy),
        }
    }

    fn after_edit(&mut self, field: PipelineField) {
        match field {
            PipelineField::SourceAgent => self.refresh_endpoints(EndpointRole::Source),
            PipelineField::TargetAgent => self.refresh_endpoints(EndpointRole::Target),
            _ => {}
        }
    }

    fn validate_step(&self, step: usize) -> Result<(), ValidationError> {
        match step {
            GENERAL_STEP => StepCheck::new(step).require("name", &self.name).finish(),
            SOURCE_STEP => {
                Self::check_side(step, &self.source_agent, &self.source_endpoint).finish()
            }
            TARGET_STEP => {
                let endpoints = (self.source_endpoint.selected(), self.target_endpoint.selected());
                let distinct = match endpoints {
                    (Some(source), Some(target)) => source.id != target.id,
                    _ => true,
                };
                Self::check_side(step, &self.target_agent, &self.target_endpoint)
                    .ensure(distinct, "target endpoint must differ from the source endpoint")
                    .finish()
            }
            STAGES_STEP => {
                let batch = match parse_optional_number::<u32>("batch size", &self.batch_size) {
                    Ok(Some(0)) => Err("batch size must be greater than 0".to_string()),
                    other => other.map(|_| ()),
                };
                StepCheck::new(step)
                    .require("batch size", &self.batch_size)
                    .require_choice("extract mode", self.extract_mode.selected())
                    .require_choice("apply mode", self.apply_mode.selected())
                    .require_choice("conflict policy", self.conflict_policy.selected())
                    .check(batch)
                    .finish()
            }
            _ => Ok(()),
        }
    }

    fn assemble(&self, id: PipelineId) -> Result<Pipeline, ValidationError> {
        Ok(Pipeline {
            id,
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            source: Self::side(SOURCE_STEP, &self.source_agent, &self.source_endpoint)?,
            target: Self::side(TARGET_STEP, &self.target_agent, &self.target_endpoint)?,
            relay_agent_id: self.relay_agent.selected().map(|agent| agent.id.clone()),
            stages: self.stages()?,
            status: self.status,
        })
    }

    fn summary_lines(&self, _now: i64) -> Vec<String> {
        let mut lines = vec![
            format!("Name: {}", self.name.trim()),
            format!(
                "Source: {} via {}",
                describe(&self.source_endpoint),
                describe(&self.source_agent)
            ),
            format!(
                "Target: {} via {}",
                describe(&self.target_endpoint),
                describe(&self.target_agent)
            ),
        ];
        if self.relay_agent.selected().is_some() {
            lines.push(format!("Relay: {}", describe(&self.relay_agent)));
        }
        lines.push(format!(
            "Extract: {}, batch {}",
            describe(&self.extract_mode),
            self.batch_size.trim()
        ));
        lines.push(format!(
            "Send: compression {}, encryption {}",
            on_off(self.compression),
            on_off(self.encryption)
        ));
        lines.push(format!(
            "Post: {}, {}",
            describe(&self.apply_mode),
            describe(&self.conflict_policy)
        ));
        lines
    }
}

fn describe(choice: &dyn ChoiceList) -> String {
    choice.selected_label().unwrap_or_else(|| "-".to_string())
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}
