//! Report designer: picks what to chart and produces synthetic data series.

pub mod job;

pub use job::{synthetic_series, ReportJob};

use crate::catalog::Catalog;
use crate::model::{GeneratedReport, ReportKind, ReportRange};
use crate::ops::{OperationError, SimulatedOperation};
use crate::shared::ids::PipelineId;
use crate::wizard::{ChoiceList, SearchableSelect};
use chrono_tz::Tz;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesignerField {
    Title,
    Kind,
    Range,
    Scope,
    Generate,
}

impl DesignerField {
    pub const ALL: [DesignerField; 5] = [
        Self::Title,
        Self::Kind,
        Self::Range,
        Self::Scope,
        Self::Generate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Kind => "Metric",
            Self::Range => "Range",
            Self::Scope => "Pipeline",
            Self::Generate => "[ Generate report ]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportScope {
    AllPipelines,
    Pipeline { id: PipelineId, name: String },
}

impl ReportScope {
    fn label(&self) -> String {
        match self {
            Self::AllPipelines => "All pipelines".to_string(),
            Self::Pipeline { name, .. } => name.clone(),
        }
    }

    fn pipeline_id(&self) -> Option<PipelineId> {
        match self {
            Self::AllPipelines => None,
            Self::Pipeline { id, .. } => Some(id.clone()),
        }
    }
}

#[derive(Debug)]
pub struct ReportDesigner {
    pub title: String,
    pub kind: SearchableSelect<ReportKind>,
    pub range: SearchableSelect<ReportRange>,
    pub scope: SearchableSelect<ReportScope>,
    focus: usize,
    job: SimulatedOperation<GeneratedReport>,
    message: Option<String>,
}

impl ReportDesigner {
    pub fn new(catalog: &Catalog) -> Self {
        let mut kind =
            SearchableSelect::new(ReportKind::ALL.to_vec(), |kind| kind.label().to_string());
        kind.select_where(|candidate| *candidate == ReportKind::default());
        let mut range =
            SearchableSelect::new(ReportRange::ALL.to_vec(), |range| range.label().to_string());
        range.select_where(|candidate| *candidate == ReportRange::default());
        let mut scope = SearchableSelect::new(scope_options(catalog), ReportScope::label);
        scope.select_where(|candidate| *candidate == ReportScope::AllPipelines);
        Self {
            title: String::new(),
            kind,
            range,
            scope,
            focus: 0,
            job: SimulatedOperation::new(),
            message: None,
        }
    }

    /// Re-reads the pipeline list after catalog changes.
    pub fn refresh_scopes(&mut self, catalog: &Catalog) {
        self.scope.set_options(scope_options(catalog));
        if self.scope.selected().is_none() {
            self.scope
                .select_where(|candidate| *candidate == ReportScope::AllPipelines);
        }
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focused_field(&self) -> DesignerField {
        DesignerField::ALL[self.focus.min(DesignerField::ALL.len() - 1)]
    }

    pub fn move_focus(&mut self, forward: bool) {
        if forward {
            self.focus = (self.focus + 1).min(DesignerField::ALL.len() - 1);
        } else {
            self.focus = self.focus.saturating_sub(1);
        }
    }

    fn focused_choice(&mut self) -> Option<&mut dyn ChoiceList> {
        match self.focused_field() {
            DesignerField::Kind => Some(&mut self.kind),
            DesignerField::Range => Some(&mut self.range),
            DesignerField::Scope => Some(&mut self.scope),
            DesignerField::Title | DesignerField::Generate => None,
        }
    }

    pub fn type_char(&mut self, ch: char) {
        if self.focused_field() == DesignerField::Title {
            self.title.push(ch);
        } else if let Some(choice) = self.focused_choice() {
            choice.push_char(ch);
        }
    }

    pub fn backspace(&mut self) {
        if self.focused_field() == DesignerField::Title {
            self.title.pop();
        } else if let Some(choice) = self.focused_choice() {
            choice.pop_char();
        }
    }

    pub fn cycle(&mut self, forward: bool) {
        if let Some(choice) = self.focused_choice() {
            choice.cycle(forward);
        }
    }

    pub fn is_generating(&self) -> bool {
        self.job.is_pending()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Starts a report job. Returns false when input is missing or a job is
    /// already running.
    pub fn generate(&mut self, delay: Duration, now: i64, timezone: Tz) -> bool {
        let title = self.title.trim();
        let (Some(kind), Some(range)) = (self.kind.selected(), self.range.selected()) else {
            self.message = Some("choose a metric and a range".to_string());
            return false;
        };
        if title.is_empty() {
            self.message = Some("report title is required".to_string());
            return false;
        }
        let job = ReportJob {
            title: title.to_string(),
            kind: *kind,
            range: *range,
            pipeline_id: self.scope.selected().and_then(ReportScope::pipeline_id),
            now,
            timezone,
        };
        if !self.job.start(job, delay) {
            self.message = Some("a report is already being generated".to_string());
            return false;
        }
        self.message = Some("Generating report...".to_string());
        true
    }

    pub fn poll(&mut self) -> Option<Result<GeneratedReport, OperationError>> {
        self.job.poll();
        self.collect()
    }

    pub fn wait(&mut self, timeout: Duration) -> Option<Result<GeneratedReport, OperationError>> {
        self.job.wait(timeout);
        self.collect()
    }

    pub fn cancel(&mut self) {
        if self.job.is_pending() {
            self.job.cancel();
            self.message = Some("Report generation cancelled.".to_string());
        }
    }

    fn collect(&mut self) -> Option<Result<GeneratedReport, OperationError>> {
        let result = self.job.take_result()?;
        self.message = Some(match &result {
            Ok(report) => format!("Generated report `{}`.", report.title),
            Err(err) => format!("Report generation failed: {err}"),
        });
        Some(result)
    }

    pub fn rows(&self) -> Vec<(DesignerField, String)> {
        DesignerField::ALL
            .iter()
            .map(|field| {
                let value = match field {
                    DesignerField::Title => self.title.clone(),
                    DesignerField::Kind => self.kind.selected_label().unwrap_or_default(),
                    DesignerField::Range => self.range.selected_label().unwrap_or_default(),
                    DesignerField::Scope => self.scope.selected_label().unwrap_or_default(),
                    DesignerField::Generate => String::new(),
                };
                (*field, value)
            })
            .collect()
    }
}

fn scope_options(catalog: &Catalog) -> Vec<ReportScope> {
    std::iter::once(ReportScope::AllPipelines)
        .chain(catalog.pipelines.iter().map(|pipeline| ReportScope::Pipeline {
            id: pipeline.id.clone(),
            name: pipeline.name.clone(),
        }))
        .collect()
}
