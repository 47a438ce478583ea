use super::{EndpointRole, Record};
use crate::shared::ids::AgentId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Source,
    Target,
    Relay,
    Both,
}

impl AgentRole {
    pub const ALL: [AgentRole; 4] = [Self::Source, Self::Target, Self::Relay, Self::Both];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
            Self::Relay => "relay",
            Self::Both => "both",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "source" => Ok(Self::Source),
            "target" => Ok(Self::Target),
            "relay" => Ok(Self::Relay),
            "both" => Ok(Self::Both),
            _ => Err("agent role must be one of: source, target, relay, both".to_string()),
        }
    }

    /// Whether an endpoint on the given side may be bound to this agent.
    pub fn serves(self, side: EndpointRole) -> bool {
        match self {
            Self::Both => true,
            Self::Relay => false,
            Self::Source => side == EndpointRole::Source,
            Self::Target => side == EndpointRole::Target,
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Online,
    Offline,
    Degraded,
}

impl AgentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Degraded => "degraded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub role: AgentRole,
    pub host: String,
    pub version: String,
    pub status: AgentStatus,
}

impl Record for Agent {
    type Id = AgentId;
    const KIND: &'static str = "agent";

    fn id(&self) -> &AgentId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Agent {
    pub fn label(&self) -> String {
        format!("{} ({}, {})", self.name, self.role, self.host)
    }
}

/// Case-insensitive name/host match, optionally narrowed to one role.
pub fn filter_agents<'a, I>(agents: I, query: &str, role: Option<AgentRole>) -> Vec<&'a Agent>
where
    I: IntoIterator<Item = &'a Agent>,
{
    let needle = query.trim().to_ascii_lowercase();
    agents
        .into_iter()
        .filter(|agent| role.map_or(true, |role| agent.role == role))
        .filter(|agent| {
            needle.is_empty()
                || agent.name.to_ascii_lowercase().contains(&needle)
                || agent.host.to_ascii_lowercase().contains(&needle)
        })
        .collect()
}
