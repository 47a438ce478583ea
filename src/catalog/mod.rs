pub mod list_state;

pub use list_state::{ListState, SaveOutcome, SaveTarget};

use crate::model::{Agent, Endpoint, EndpointRole, GeneratedReport, Pipeline, Task};
use crate::shared::ids::AgentId;
use serde::Deserialize;

const DEMO_CATALOG_YAML: &str = include_str!("demo_catalog.yaml");

#[derive(Debug, Deserialize)]
struct CatalogSeed {
    #[serde(default)]
    agents: Vec<Agent>,
    #[serde(default)]
    endpoints: Vec<Endpoint>,
    #[serde(default)]
    pipelines: Vec<Pipeline>,
    #[serde(default)]
    tasks: Vec<Task>,
}

/// Every list the console screens own.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub agents: ListState<Agent>,
    pub endpoints: ListState<Endpoint>,
    pub pipelines: ListState<Pipeline>,
    pub tasks: ListState<Task>,
    pub reports: ListState<GeneratedReport>,
}

impl Catalog {
    pub fn from_yaml(raw: &str) -> Result<Self, String> {
        let seed: CatalogSeed =
            serde_yaml::from_str(raw).map_err(|err| format!("invalid catalog seed: {err}"))?;
        Ok(Self {
            agents: ListState::new(seed.agents),
            endpoints: ListState::new(seed.endpoints),
            pipelines: ListState::new(seed.pipelines),
            tasks: ListState::new(seed.tasks),
            reports: ListState::default(),
        })
    }

    pub fn demo() -> Result<Self, String> {
        Self::from_yaml(DEMO_CATALOG_YAML)
    }

    /// Agents that may host an endpoint on the given side.
    pub fn agents_serving(&self, side: EndpointRole) -> Vec<Agent> {
        self.agents
            .iter()
            .filter(|agent| agent.role.serves(side))
            .cloned()
            .collect()
    }

    pub fn endpoints_for_agent(&self, agent_id: &AgentId) -> Vec<Endpoint> {
        self.endpoints
            .iter()
            .filter(|endpoint| &endpoint.agent_id == agent_id)
            .cloned()
            .collect()
    }

    pub fn endpoints_with_role(&self, role: EndpointRole) -> Vec<Endpoint> {
        self.endpoints
            .iter()
            .filter(|endpoint| endpoint.role == role)
            .cloned()
            .collect()
    }

    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("agents={}", self.agents.len()),
            format!("endpoints={}", self.endpoints.len()),
            format!("pipelines={}", self.pipelines.len()),
            format!("tasks={}", self.tasks.len()),
            format!("reports={}", self.reports.len()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AgentRole, PipelineStages, TaskType};

    #[test]
    fn demo_catalog_parses() {
        let catalog = Catalog::demo().expect("demo catalog");
        assert_eq!(catalog.agents.len(), 4);
        assert_eq!(catalog.endpoints.len(), 4);
        assert_eq!(catalog.pipelines.len(), 1);
        assert_eq!(catalog.tasks.len(), 1);
        assert!(catalog.reports.is_empty());

        let pipeline = catalog.pipelines.get_index(0).expect("pipeline");
        assert_eq!(pipeline.stages, PipelineStages::default());
        let task = catalog.tasks.get_index(0).expect("task");
        assert_eq!(task.task_type, TaskType::DataValidation);
        task.schedule.validate().expect("valid seed schedule");
    }

    #[test]
    fn demo_endpoints_reference_known_agents() {
        let catalog = Catalog::demo().expect("demo catalog");
        for endpoint in &catalog.endpoints {
            let agent = catalog
                .agents
                .get(&endpoint.agent_id)
                .expect("endpoint agent exists");
            assert!(agent.role.serves(endpoint.role), "{}", endpoint.name);
        }
    }

    #[test]
    fn agents_serving_excludes_relays() {
        let catalog = Catalog::demo().expect("demo catalog");
        let sources = catalog.agents_serving(EndpointRole::Source);
        assert!(sources.iter().all(|agent| agent.role != AgentRole::Relay));
        assert!(sources.iter().any(|agent| agent.role == AgentRole::Both));
    }
}
