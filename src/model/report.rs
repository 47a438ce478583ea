use super::Record;
use crate::shared::ids::{PipelineId, ReportId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    #[default]
    Throughput,
    Latency,
    ErrorRate,
    TaskRuns,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        Self::Throughput,
        Self::Latency,
        Self::ErrorRate,
        Self::TaskRuns,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Throughput => "Throughput (rows/s)",
            Self::Latency => "Apply latency (ms)",
            Self::ErrorRate => "Error rate (%)",
            Self::TaskRuns => "Task runs",
        }
    }

    /// Base level and spread of the synthetic series.
    pub(crate) fn value_profile(self) -> (f64, f64) {
        match self {
            Self::Throughput => (1_200.0, 800.0),
            Self::Latency => (250.0, 400.0),
            Self::ErrorRate => (0.2, 1.5),
            Self::TaskRuns => (4.0, 12.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportRange {
    #[default]
    Last24Hours,
    Last7Days,
    Last30Days,
}

impl ReportRange {
    pub const ALL: [ReportRange; 3] = [Self::Last24Hours, Self::Last7Days, Self::Last30Days];

    pub fn label(self) -> &'static str {
        match self {
            Self::Last24Hours => "Last 24 hours",
            Self::Last7Days => "Last 7 days",
            Self::Last30Days => "Last 30 days",
        }
    }

    /// Number of buckets and bucket width in seconds.
    pub fn buckets(self) -> (usize, i64) {
        match self {
            Self::Last24Hours => (24, 3_600),
            Self::Last7Days => (7, 86_400),
            Self::Last30Days => (30, 86_400),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReportPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ReportSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl ReportSummary {
    pub fn from_points(points: &[ReportPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut total = 0.0;
        for point in points {
            min = min.min(point.value);
            max = max.max(point.value);
            total += point.value;
        }
        Some(Self {
            min,
            max,
            mean: total / points.len() as f64,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GeneratedReport {
    pub id: ReportId,
    pub title: String,
    pub kind: ReportKind,
    pub range: ReportRange,
    #[serde(default)]
    pub pipeline_id: Option<PipelineId>,
    pub generated_at: String,
    pub points: Vec<ReportPoint>,
    pub summary: Option<ReportSummary>,
}

impl Record for GeneratedReport {
    type Id = ReportId;
    const KIND: &'static str = "report";

    fn id(&self) -> &ReportId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_tracks_min_max_mean() {
        let points = vec![
            ReportPoint {
                label: "a".to_string(),
                value: 2.0,
            },
            ReportPoint {
                label: "b".to_string(),
                value: 6.0,
            },
        ];
        let summary = ReportSummary::from_points(&points).expect("summary");
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 6.0);
        assert_eq!(summary.mean, 4.0);
        assert!(ReportSummary::from_points(&[]).is_none());
    }
}
