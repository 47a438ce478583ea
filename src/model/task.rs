use super::{Record, TaskSchedule};
use crate::shared::ids::{EndpointId, PipelineId, TaskId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    InitialLoad,
    DataValidation,
    Automation,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [Self::InitialLoad, Self::DataValidation, Self::Automation];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InitialLoad => "INITIAL_LOAD",
            Self::DataValidation => "DATA_VALIDATION",
            Self::Automation => "AUTOMATION",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::InitialLoad => "Initial load",
            Self::DataValidation => "Data validation",
            Self::Automation => "Pipeline automation",
        }
    }

    /// Automation tasks drive a pipeline; the others copy or compare a DB pair.
    pub fn uses_pipeline(self) -> bool {
        self == Self::Automation
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskSource {
    Pipeline {
        pipeline_id: PipelineId,
    },
    DatabasePair {
        source_endpoint_id: EndpointId,
        target_endpoint_id: EndpointId,
    },
}

impl TaskSource {
    pub fn describe(&self) -> String {
        match self {
            Self::Pipeline { pipeline_id } => format!("pipeline {pipeline_id}"),
            Self::DatabasePair {
                source_endpoint_id,
                target_endpoint_id,
            } => format!("{source_endpoint_id} -> {target_endpoint_id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub source: TaskSource,
    #[serde(default)]
    pub schedule: TaskSchedule,
    #[serde(default)]
    pub status: TaskStatus,
}

impl Record for Task {
    type Id = TaskId;
    const KIND: &'static str = "task";

    fn id(&self) -> &TaskId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_type_serializes_in_screaming_case() {
        let task = Task {
            id: TaskId::parse("task-1").expect("id"),
            name: "Nightly Load".to_string(),
            description: String::new(),
            task_type: TaskType::InitialLoad,
            source: TaskSource::DatabasePair {
                source_endpoint_id: EndpointId::parse("ep-1").expect("id"),
                target_endpoint_id: EndpointId::parse("ep-2").expect("id"),
            },
            schedule: TaskSchedule::Manual,
            status: TaskStatus::Idle,
        };
        let value = serde_json::to_value(&task).expect("encode");
        assert_eq!(value["type"], "INITIAL_LOAD");
        assert_eq!(value["status"], "IDLE");
        assert_eq!(value["source"]["kind"], "database_pair");
    }
}
