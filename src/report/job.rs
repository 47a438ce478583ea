use crate::model::{GeneratedReport, ReportKind, ReportPoint, ReportRange, ReportSummary};
use crate::ops::{ConsoleOperation, OperationError};
use crate::shared::ids::{PipelineId, ReportId};
use chrono::TimeZone;
use chrono_tz::Tz;
use sha2::{Digest, Sha256};

/// Builds a synthetic report. The series depends only on its inputs, so the
/// same request always yields the same numbers.
#[derive(Debug, Clone)]
pub struct ReportJob {
    pub title: String,
    pub kind: ReportKind,
    pub range: ReportRange,
    pub pipeline_id: Option<PipelineId>,
    pub now: i64,
    pub timezone: Tz,
}

impl ConsoleOperation for ReportJob {
    type Output = GeneratedReport;

    fn label(&self) -> &'static str {
        "report-generation"
    }

    fn run(self) -> Result<GeneratedReport, OperationError> {
        let id = ReportId::generate(self.now).map_err(OperationError::Failed)?;
        let points = synthetic_series(
            self.kind,
            self.range,
            self.pipeline_id.as_ref(),
            self.now,
            self.timezone,
        );
        Ok(GeneratedReport {
            id,
            title: self.title,
            kind: self.kind,
            range: self.range,
            pipeline_id: self.pipeline_id,
            generated_at: format_local(self.now, self.timezone, "%Y-%m-%d %H:%M %Z"),
            summary: ReportSummary::from_points(&points),
            points,
        })
    }
}

pub fn synthetic_series(
    kind: ReportKind,
    range: ReportRange,
    pipeline_id: Option<&PipelineId>,
    now: i64,
    timezone: Tz,
) -> Vec<ReportPoint> {
    let (count, width) = range.buckets();
    let (base, spread) = kind.value_profile();
    let scope = pipeline_id.map_or("all", |id| id.as_str());
    let last_bucket = now - now.rem_euclid(width);
    let label_format = if width < 86_400 { "%H:%M" } else { "%b %d" };
    (0..count)
        .map(|index| {
            let start = last_bucket - (count - 1 - index) as i64 * width;
            let value = base + spread * bucket_fraction(kind, scope, start);
            ReportPoint {
                label: format_local(start, timezone, label_format),
                value: (value * 100.0).round() / 100.0,
            }
        })
        .collect()
}

/// Maps `(kind, scope, bucket)` to a stable value in `[0, 1]`.
fn bucket_fraction(kind: ReportKind, scope: &str, bucket_start: i64) -> f64 {
    let mut hasher = Sha256::new();
    hasher.update(format!("{kind:?}").as_bytes());
    hasher.update([0]);
    hasher.update(scope.as_bytes());
    hasher.update([0]);
    hasher.update(bucket_start.to_le_bytes());
    let digest = hasher.finalize();
    let mut head = [0_u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(head) as f64 / u64::MAX as f64
}

fn format_local(unix_ts: i64, timezone: Tz, pattern: &str) -> String {
    timezone
        .timestamp_opt(unix_ts, 0)
        .single()
        .map(|dt| dt.format(pattern).to_string())
        .unwrap_or_else(|| unix_ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn series_is_deterministic_and_sized_by_range() {
        let first = synthetic_series(ReportKind::Latency, ReportRange::Last7Days, None, NOW, Tz::UTC);
        let second =
            synthetic_series(ReportKind::Latency, ReportRange::Last7Days, None, NOW, Tz::UTC);
        assert_eq!(first, second);
        assert_eq!(first.len(), 7);
        let (base, spread) = ReportKind::Latency.value_profile();
        assert!(first
            .iter()
            .all(|point| point.value >= base && point.value <= base + spread));
    }

    #[test]
    fn scope_changes_the_series() {
        let pipeline = PipelineId::parse("pl-orders").expect("id");
        let all = synthetic_series(
            ReportKind::Throughput,
            ReportRange::Last24Hours,
            None,
            NOW,
            Tz::UTC,
        );
        let scoped = synthetic_series(
            ReportKind::Throughput,
            ReportRange::Last24Hours,
            Some(&pipeline),
            NOW,
            Tz::UTC,
        );
        assert_eq!(all.len(), 24);
        assert_ne!(all, scoped);
    }

    #[test]
    fn hourly_labels_follow_the_timezone() {
        // 2023-11-14 22:13:20 UTC
        let utc = synthetic_series(ReportKind::TaskRuns, ReportRange::Last24Hours, None, NOW, Tz::UTC);
        let tokyo = synthetic_series(
            ReportKind::TaskRuns,
            ReportRange::Last24Hours,
            None,
            NOW,
            Tz::Asia__Tokyo,
        );
        assert_eq!(utc.last().map(|p| p.label.as_str()), Some("22:00"));
        assert_eq!(tokyo.last().map(|p| p.label.as_str()), Some("07:00"));
    }

    #[test]
    fn job_produces_summary_and_report_id() {
        let report = ReportJob {
            title: "Weekly latency".to_string(),
            kind: ReportKind::Latency,
            range: ReportRange::Last7Days,
            pipeline_id: None,
            now: NOW,
            timezone: Tz::UTC,
        }
        .run()
        .expect("report");
        assert!(report.id.as_str().starts_with("rpt-"));
        assert_eq!(report.generated_at, "2023-11-14 22:13 UTC");
        assert!(report.summary.is_some());
    }
}
