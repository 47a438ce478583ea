pub mod agent;
pub mod endpoint;
pub mod pipeline;
pub mod report;
pub mod schedule;
pub mod task;

pub use agent::{filter_agents, Agent, AgentRole, AgentStatus};
pub use endpoint::{DatabaseType, Endpoint, EndpointRole};
pub use pipeline::{
    ApplyMode, ConflictPolicy, ExtractMode, ExtractStage, Pipeline, PipelineSide, PipelineStages,
    PipelineStatus, PostStage, SendStage, DEFAULT_BATCH_SIZE,
};
pub use report::{GeneratedReport, ReportKind, ReportPoint, ReportRange, ReportSummary};
pub use schedule::{format_run_at, parse_cron_expression, ScheduleKind, TaskSchedule};
pub use task::{Task, TaskSource, TaskStatus, TaskType};

/// A record held in a console list, addressed by its typed id.
pub trait Record: Clone {
    type Id: Clone + PartialEq + std::fmt::Display;
    const KIND: &'static str;

    fn id(&self) -> &Self::Id;
    fn name(&self) -> &str;
}
