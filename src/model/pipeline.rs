use super::Record;
use crate::shared::ids::{AgentId, EndpointId, PipelineId};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BATCH_SIZE: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExtractMode {
    #[default]
    LogBased,
    TriggerBased,
    Query,
}

impl ExtractMode {
    pub const ALL: [ExtractMode; 3] = [Self::LogBased, Self::TriggerBased, Self::Query];

    pub fn label(self) -> &'static str {
        match self {
            Self::LogBased => "Log-based CDC",
            Self::TriggerBased => "Trigger-based CDC",
            Self::Query => "Query polling",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMode {
    #[default]
    Upsert,
    Append,
}

impl ApplyMode {
    pub const ALL: [ApplyMode; 2] = [Self::Upsert, Self::Append];

    pub fn label(self) -> &'static str {
        match self {
            Self::Upsert => "Upsert",
            Self::Append => "Append only",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    #[default]
    SourceWins,
    TargetWins,
    Halt,
}

impl ConflictPolicy {
    pub const ALL: [ConflictPolicy; 3] = [Self::SourceWins, Self::TargetWins, Self::Halt];

    pub fn label(self) -> &'static str {
        match self {
            Self::SourceWins => "Source wins",
            Self::TargetWins => "Target wins",
            Self::Halt => "Halt pipeline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtractStage {
    pub mode: ExtractMode,
    pub batch_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct SendStage {
    pub compression: bool,
    pub encryption: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PostStage {
    pub apply_mode: ApplyMode,
    pub conflict_policy: ConflictPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PipelineStages {
    pub extract: ExtractStage,
    pub send: SendStage,
    pub post: PostStage,
}

impl Default for PipelineStages {
    fn default() -> Self {
        Self {
            extract: ExtractStage {
                mode: ExtractMode::default(),
                batch_size: DEFAULT_BATCH_SIZE,
            },
            send: SendStage {
                compression: true,
                encryption: true,
            },
            post: PostStage {
                apply_mode: ApplyMode::default(),
                conflict_policy: ConflictPolicy::default(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PipelineSide {
    pub agent_id: AgentId,
    pub endpoint_id: EndpointId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    #[default]
    Draft,
    Running,
    Stopped,
}

impl PipelineStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Pipeline {
    pub id: PipelineId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub source: PipelineSide,
    pub target: PipelineSide,
    #[serde(default)]
    pub relay_agent_id: Option<AgentId>,
    #[serde(default)]
    pub stages: PipelineStages,
    #[serde(default)]
    pub status: PipelineStatus,
}

impl Record for Pipeline {
    type Id = PipelineId;
    const KIND: &'static str = "pipeline";

    fn id(&self) -> &PipelineId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
