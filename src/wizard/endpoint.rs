use super::{
    missing_choice, parse_optional_number, ChoiceList, FieldInput, FieldSpec, FieldValue,
    InputKind, SearchableSelect, StepCheck, ValidationError, Wizard, WizardCore, WizardError,
};
use crate::catalog::Catalog;
use crate::config::PlaceholderDefaults;
use crate::model::{Agent, DatabaseType, Endpoint, EndpointRole};
use crate::ops::{ConnectionProbe, ConnectionReport, OperationError, SimulatedOperation};
use crate::shared::ids::EndpointId;
use std::time::Duration;

const STEP_TITLES: &[&str] = &["General", "Connection", "Review"];
const GENERAL_STEP: usize = 1;
const CONNECTION_STEP: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointField {
    Name,
    DatabaseType,
    Role,
    Agent,
    Host,
    Port,
    Database,
    Username,
    Password,
}

#[derive(Debug)]
pub struct EndpointWizard {
    core: WizardCore,
    existing: Option<EndpointId>,
    placeholders: PlaceholderDefaults,
    agents: Vec<Agent>,
    name: String,
    database_type: SearchableSelect<DatabaseType>,
    role: SearchableSelect<EndpointRole>,
    agent: SearchableSelect<Agent>,
    host: String,
    port: String,
    database: String,
    username: String,
    password: String,
    connection_test: SimulatedOperation<ConnectionReport>,
    last_test: Option<Result<ConnectionReport, OperationError>>,
}

impl EndpointWizard {
    pub fn create(catalog: &Catalog, placeholders: PlaceholderDefaults) -> Self {
        let agents: Vec<Agent> = catalog.agents.iter().cloned().collect();
        Self {
            core: WizardCore::new(STEP_TITLES.len()),
            existing: None,
            placeholders,
            agent: SearchableSelect::new(agents_for_role(&agents, None), agent_label),
            agents,
            name: String::new(),
            database_type: SearchableSelect::new(DatabaseType::ALL.to_vec(), |kind| {
                kind.label().to_string()
            }),
            role: SearchableSelect::new(EndpointRole::ALL.to_vec(), |role| {
                role.label().to_string()
            }),
            host: String::new(),
            port: String::new(),
            database: String::new(),
            username: String::new(),
            password: String::new(),
            connection_test: SimulatedOperation::new(),
            last_test: None,
        }
    }

    pub fn edit(existing: &Endpoint, catalog: &Catalog, placeholders: PlaceholderDefaults) -> Self {
        let mut wizard = Self::create(catalog, placeholders);
        wizard.existing = Some(existing.id.clone());
        wizard.name = existing.name.clone();
        wizard
            .database_type
            .select_where(|kind| *kind == existing.database_type);
        wizard.role.select_where(|role| *role == existing.role);
        wizard.refresh_agents();
        wizard
            .agent
            .select_where(|agent| agent.id == existing.agent_id);
        wizard.host = existing.host.clone();
        wizard.port = existing.port.to_string();
        wizard.database = existing.database.clone();
        wizard.username = existing.username.clone();
        wizard.password = existing.password.clone();
        wizard
    }

    fn refresh_agents(&mut self) {
        let role = self.role.selected().copied();
        self.agent.set_options(agents_for_role(&self.agents, role));
    }

    /// Host, port and username with placeholder defaults applied.
    fn resolved_connection(&self, kind: DatabaseType) -> (String, u16, String) {
        let fill = |value: &str, placeholder: &str| {
            if value.trim().is_empty() && self.placeholders.enabled {
                placeholder.to_string()
            } else {
                value.trim().to_string()
            }
        };
        let port = self
            .port
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|port| *port > 0)
            .unwrap_or_else(|| kind.default_port());
        (
            fill(&self.host, &self.placeholders.host),
            port,
            fill(&self.username, &self.placeholders.username),
        )
    }

    fn draft_url(&self) -> Option<String> {
        let kind = *self.database_type.selected()?;
        let (host, port, username) = self.resolved_connection(kind);
        Some(format!(
            "{}://{}@{}:{}/{}",
            kind.url_scheme(),
            username,
            host,
            port,
            self.database.trim()
        ))
    }

    /// Starts the simulated connection test. Only offered on the connection step.
    pub fn test_connection(&mut self, delay: Duration) -> Result<bool, WizardError> {
        if self.lifecycle() != super::WizardLifecycle::Open {
            return Err(WizardError::Closed);
        }
        if self.current_step() != CONNECTION_STEP {
            self.core
                .set_error("connection test is available on the Connection step");
            return Ok(false);
        }
        let (Some(database_type), Some(url)) =
            (self.database_type.selected().copied(), self.draft_url())
        else {
            self.core.set_error("choose a database type before testing");
            return Ok(false);
        };
        let started = self
            .connection_test
            .start(ConnectionProbe { database_type, url }, delay);
        if started {
            self.last_test = None;
        }
        Ok(started)
    }

    pub fn connection_test_pending(&self) -> bool {
        self.connection_test.is_pending()
    }

    /// Collects a finished connection test, if one just completed.
    pub fn poll_connection_test(&mut self) -> Option<Result<ConnectionReport, OperationError>> {
        self.connection_test.poll();
        self.collect_test()
    }

    pub fn wait_connection_test(
        &mut self,
        timeout: Duration,
    ) -> Option<Result<ConnectionReport, OperationError>> {
        self.connection_test.wait(timeout);
        self.collect_test()
    }

    fn collect_test(&mut self) -> Option<Result<ConnectionReport, OperationError>> {
        let result = self.connection_test.take_result()?;
        self.last_test = Some(result.clone());
        Some(result)
    }

    pub fn last_test(&self) -> Option<&Result<ConnectionReport, OperationError>> {
        self.last_test.as_ref()
    }
}

fn agent_label(agent: &Agent) -> String {
    agent.label()
}

fn agents_for_role(agents: &[Agent], role: Option<EndpointRole>) -> Vec<Agent> {
    agents
        .iter()
        .filter(|agent| match role {
            Some(role) => agent.role.serves(role),
            None => EndpointRole::ALL.iter().any(|side| agent.role.serves(*side)),
        })
        .cloned()
        .collect()
}

impl Wizard for EndpointWizard {
    type Record = Endpoint;
    type Field = EndpointField;

    fn noun(&self) -> &'static str {
        "endpoint"
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

    fn existing_id(&self) -> Option<&EndpointId> {
        self.existing.as_ref()
    }

    fn generate_id(&self, now: i64) -> Result<EndpointId, String> {
        EndpointId::generate(now)
    }

    fn fields_on_step(&self, step: usize) -> Vec<EndpointField> {
        match step {
            GENERAL_STEP => vec![
                EndpointField::Name,
                EndpointField::DatabaseType,
                EndpointField::Role,
                EndpointField::Agent,
            ],
            CONNECTION_STEP => vec![
                EndpointField::Host,
                EndpointField::Port,
                EndpointField::Database,
                EndpointField::Username,
                EndpointField::Password,
            ],
            _ => Vec::new(),
        }
    }

    fn field_spec(&self, field: EndpointField) -> FieldSpec {
        let connection_required = !self.placeholders.enabled;
        match field {
            EndpointField::Name => FieldSpec::required("Name", InputKind::Text),
            EndpointField::DatabaseType => FieldSpec::required("Database type", InputKind::Choice),
            EndpointField::Role => FieldSpec::required("Role", InputKind::Choice),
            EndpointField::Agent => FieldSpec::required("Agent", InputKind::Choice),
            EndpointField::Host => FieldSpec {
                label: "Host",
                kind: InputKind::Text,
                required: connection_required,
            },
            EndpointField::Port => FieldSpec::optional("Port", InputKind::Number),
            EndpointField::Database => FieldSpec::required("Database", InputKind::Text),
            EndpointField::Username => FieldSpec {
                label: "Username",
                kind: InputKind::Text,
                required: connection_required,
            },
            EndpointField::Password => FieldSpec::required("Password", InputKind::Secret),
        }
    }

    fn field_value(&self, field: EndpointField) -> FieldValue<'_> {
        match field {
            EndpointField::Name => FieldValue::Text(&self.name),
            EndpointField::DatabaseType => FieldValue::Choice(&self.database_type),
            EndpointField::Role => FieldValue::Choice(&self.role),
            EndpointField::Agent => FieldValue::Choice(&self.agent),
            EndpointField::Host => FieldValue::Text(&self.host),
            EndpointField::Port => FieldValue::Text(&self.port),
            EndpointField::Database => FieldValue::Text(&self.database),
            EndpointField::Username => FieldValue::Text(&self.username),
            EndpointField::Password => FieldValue::Text(&self.password),
        }
    }

    fn field_input(&mut self, field: EndpointField) -> FieldInput<'_> {
        match field {
            EndpointField::Name => FieldInput::Text(&mut self.name),
            EndpointField::DatabaseType => FieldInput::Choice(&mut self.database_type),
            EndpointField::Role => FieldInput::Choice(&mut self.role),
            EndpointField::Agent => FieldInput::Choice(&mut self.agent),
            EndpointField::Host => FieldInput::Text(&mut self.host),
            EndpointField::Port => FieldInput::Text(&mut self.port),
            EndpointField::Database => FieldInput::Text(&mut self.database),
            EndpointField::Username => FieldInput::Text(&mut self.username),
            EndpointField::Password => FieldInput::Text(&mut self.password),
        }
    }

    fn after_edit(&mut self, field: EndpointField) {
        if field == EndpointField::Role {
            self.refresh_agents();
        }
    }

    fn validate_step(&self, step: usize) -> Result<(), ValidationError> {
        match step {
            GENERAL_STEP => {
                let role = self.role.selected().copied();
                let agent = self.agent.selected();
                StepCheck::new(step)
                    .require("name", &self.name)
                    .require_choice("database type", self.database_type.selected())
                    .require_choice("role", role)
                    .require_choice("agent", agent)
                    .ensure(
                        match (agent, role) {
                            (Some(agent), Some(role)) => agent.role.serves(role),
                            _ => true,
                        },
                        "agent cannot serve the selected role",
                    )
                    .finish()
            }
            CONNECTION_STEP => {
                let mut check = StepCheck::new(step)
                    .require("database", &self.database)
                    .require("password", &self.password);
                if !self.placeholders.enabled {
                    check = check
                        .require("host", &self.host)
                        .require("username", &self.username);
                }
                let port = match parse_optional_number::<u32>("port", &self.port) {
                    Ok(Some(value)) if !(1..=65_535).contains(&value) => {
                        Err("port must be between 1 and 65535".to_string())
                    }
                    other => other.map(|_| ()),
                };
                check.check(port).finish()
            }
            _ => Ok(()),
        }
    }

    fn assemble(&self, id: EndpointId) -> Result<Endpoint, ValidationError> {
        let database_type = *self
            .database_type
            .selected()
            .ok_or_else(|| missing_choice(GENERAL_STEP, "database type"))?;
        let role = *self
            .role
            .selected()
            .ok_or_else(|| missing_choice(GENERAL_STEP, "role"))?;
        let agent = self
            .agent
            .selected()
            .ok_or_else(|| missing_choice(GENERAL_STEP, "agent"))?;
        let (host, port, username) = self.resolved_connection(database_type);
        Ok(Endpoint {
            id,
            name: self.name.trim().to_string(),
            database_type,
            role,
            agent_id: agent.id.clone(),
            host,
            port,
            database: self.database.trim().to_string(),
            username,
            password: self.password.clone(),
        })
    }

    fn summary_lines(&self, _now: i64) -> Vec<String> {
        let mut lines = vec![format!("Name: {}", self.name.trim())];
        if let Some(kind) = self.database_type.selected() {
            lines.push(format!("Type: {}", kind.label()));
        }
        if let Some(role) = self.role.selected() {
            lines.push(format!("Role: {}", role.label()));
        }
        if let Some(label) = self.agent.selected_label() {
            lines.push(format!("Agent: {label}"));
        }
        if let Some(url) = self.draft_url() {
            lines.push(format!("URL: {url}"));
        }
        if self.placeholders.enabled
            && (self.host.trim().is_empty() || self.username.trim().is_empty())
        {
            lines.push("Blank host/username use placeholder defaults.".to_string());
        }
        lines
    }

    fn operation_line(&self) -> Option<String> {
        if self.connection_test.is_pending() {
            return Some("Testing connection...".to_string());
        }
        match &self.last_test {
            Some(Ok(report)) => Some(format!(
                "Connection OK: {} ({} ms)",
                report.server_banner, report.latency_ms
            )),
            Some(Err(err)) => Some(format!("Connection test failed: {err}")),
            None => None,
        }
    }

    fn release_operations(&mut self) {
        self.connection_test.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::{RecordingTarget, StepOutcome, WizardLifecycle};

    fn type_text(wizard: &mut EndpointWizard, text: &str) {
        for ch in text.chars() {
            wizard.type_char(ch).expect("type");
        }
    }

    fn fill_general(wizard: &mut EndpointWizard) {
        type_text(wizard, "Billing");
        wizard.move_focus(true);
        type_text(wizard, "postg");
        wizard.move_focus(true);
        type_text(wizard, "source");
        wizard.move_focus(true);
        type_text(wizard, "hub");
    }

    #[test]
    fn next_is_blocked_until_general_fields_are_set() {
        let catalog = Catalog::demo().expect("catalog");
        let mut wizard = EndpointWizard::create(&catalog, PlaceholderDefaults::default());
        assert!(matches!(wizard.next(), Ok(StepOutcome::Blocked(_))));
        assert_eq!(wizard.current_step(), 1);
        assert!(wizard.core().last_error().is_some());
        assert_eq!(wizard.back(), Ok(false));

        fill_general(&mut wizard);
        assert_eq!(wizard.next(), Ok(StepOutcome::Advanced(2)));
        assert!(wizard.core().last_error().is_none());
    }

    #[test]
    fn deploy_fills_placeholders_and_default_port() {
        let catalog = Catalog::demo().expect("catalog");
        let mut wizard = EndpointWizard::create(&catalog, PlaceholderDefaults::default());
        fill_general(&mut wizard);
        wizard.next().expect("next");
        wizard.move_focus(true);
        wizard.move_focus(true);
        type_text(&mut wizard, "billing");
        wizard.move_focus(true);
        wizard.move_focus(true);
        type_text(&mut wizard, "secret");
        assert_eq!(wizard.next(), Ok(StepOutcome::Advanced(3)));

        let mut target = RecordingTarget::default();
        let deployed = wizard.deploy(&mut target, 1_700_000_000).expect("deploy");
        assert_eq!(target.saved.len(), 1);
        let endpoint = &deployed.record;
        assert!(endpoint.id.as_str().starts_with("ep-"));
        assert_eq!(endpoint.host, "0.0.0.0");
        assert_eq!(endpoint.username, "user");
        assert_eq!(endpoint.port, 5432);
        assert_eq!(endpoint.agent_id.as_str(), "agt-hub");
        assert_eq!(wizard.lifecycle(), WizardLifecycle::Deployed);
        assert_eq!(
            wizard.deploy(&mut target, 1_700_000_001),
            Err(WizardError::Closed)
        );
        assert_eq!(target.saved.len(), 1);
    }

    #[test]
    fn disabled_placeholders_require_host_and_username() {
        let catalog = Catalog::demo().expect("catalog");
        let mut wizard = EndpointWizard::create(&catalog, PlaceholderDefaults::disabled());
        fill_general(&mut wizard);
        wizard.next().expect("next");
        wizard.database = "billing".to_string();
        wizard.password = "secret".to_string();
        let err = wizard
            .validate_step(CONNECTION_STEP)
            .expect_err("host and username missing");
        assert_eq!(err.missing, vec!["host", "username"]);
    }

    #[test]
    fn out_of_range_port_blocks_connection_step() {
        let catalog = Catalog::demo().expect("catalog");
        let mut wizard = EndpointWizard::create(&catalog, PlaceholderDefaults::default());
        wizard.database = "billing".to_string();
        wizard.password = "secret".to_string();
        wizard.port = "70000".to_string();
        let err = wizard.validate_step(CONNECTION_STEP).expect_err("port");
        assert_eq!(err.problems, vec!["port must be between 1 and 65535"]);
        wizard.port = "0".to_string();
        assert!(wizard.validate_step(CONNECTION_STEP).is_err());
        wizard.port = "1521".to_string();
        assert!(wizard.validate_step(CONNECTION_STEP).is_ok());
    }

    #[test]
    fn edit_reuses_id_and_updates_in_place() {
        let mut catalog = Catalog::demo().expect("catalog");
        let existing = catalog.endpoints.get_index(0).expect("endpoint").clone();
        let mut wizard =
            EndpointWizard::edit(&existing, &catalog, PlaceholderDefaults::default());
        assert!(wizard.is_edit());
        assert_eq!(wizard.title(), "Edit endpoint");
        wizard.next().expect("general");
        wizard.password = "rotated".to_string();
        wizard.next().expect("connection");
        let deployed = wizard
            .deploy(&mut catalog.endpoints, 1_700_000_000)
            .expect("deploy");
        assert_eq!(deployed.record.id, existing.id);
        assert_eq!(deployed.outcome, crate::catalog::SaveOutcome::Updated);
        assert_eq!(catalog.endpoints.len(), 4);
        assert_eq!(
            catalog.endpoints.get_index(0).map(|e| e.password.as_str()),
            Some("rotated")
        );
    }

    #[test]
    fn connection_test_only_runs_on_connection_step() {
        let catalog = Catalog::demo().expect("catalog");
        let mut wizard = EndpointWizard::create(&catalog, PlaceholderDefaults::default());
        assert_eq!(wizard.test_connection(Duration::from_millis(1)), Ok(false));

        fill_general(&mut wizard);
        wizard.next().expect("next");
        assert_eq!(wizard.test_connection(Duration::from_millis(5)), Ok(true));
        assert!(wizard.connection_test_pending());
        let result = wizard
            .wait_connection_test(Duration::from_secs(5))
            .expect("finished");
        let report = result.expect("probe succeeds");
        assert!(report.url.starts_with("postgresql://user@0.0.0.0:5432/"));
        assert!(wizard
            .operation_line()
            .is_some_and(|line| line.starts_with("Connection OK")));
    }

    #[test]
    fn cancel_stops_pending_test_and_closes() {
        let catalog = Catalog::demo().expect("catalog");
        let mut wizard = EndpointWizard::create(&catalog, PlaceholderDefaults::default());
        fill_general(&mut wizard);
        wizard.next().expect("next");
        wizard
            .test_connection(Duration::from_millis(200))
            .expect("start");
        wizard.cancel().expect("cancel");
        assert!(!wizard.connection_test_pending());
        assert_eq!(wizard.lifecycle(), WizardLifecycle::Cancelled);
        assert_eq!(wizard.next(), Err(WizardError::Closed));
    }
}
