//! Pipeline observer: hooks for logging, profiling and debugging.
//!
//! Observers are told about stage boundaries and intermediate artifacts
//! without being coupled to stage logic. [`NoopObserver`] costs nothing,
//! [`StageTimingObserver`] records per-stage timings and
//! [`TracingObserver`] forwards reports to `tracing`.

use std::time::{Duration, Instant};

use crate::cluster::Cluster;
use crate::types::{KeywordNode, Lang};

pub const STAGE_DETECT: &str = "detect";
pub const STAGE_EXTRACT: &str = "extract";
pub const STAGE_CLUSTER: &str = "cluster";
pub const STAGE_TREE: &str = "tree";
pub const STAGE_TRANSLATE: &str = "translate";
pub const STAGE_SUMMARIZE: &str = "summarize";

/// Stages of the keyword path, in run order
pub const KEYWORD_STAGES: [&str; 5] = [
    STAGE_DETECT,
    STAGE_EXTRACT,
    STAGE_CLUSTER,
    STAGE_TREE,
    STAGE_TRANSLATE,
];

/// Wall-clock timer for one stage
#[derive(Debug, Clone, Copy)]
pub struct StageClock {
    started: Instant,
}

impl StageClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// What a stage reports when it finishes
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub elapsed: Duration,
    /// Items the stage produced (phrases, clusters, nodes...)
    pub items: Option<usize>,
    /// The stage fell back to a degraded result
    pub degraded: bool,
}

impl StageReport {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            elapsed,
            items: None,
            degraded: false,
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Builder for reports that carry counts
#[derive(Debug, Clone)]
pub struct StageReportBuilder {
    report: StageReport,
}

impl StageReportBuilder {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            report: StageReport::new(elapsed),
        }
    }

    pub fn items(mut self, items: usize) -> Self {
        self.report.items = Some(items);
        self
    }

    pub fn degraded(mut self, degraded: bool) -> Self {
        self.report.degraded = degraded;
        self
    }

    pub fn build(self) -> StageReport {
        self.report
    }
}

/// Receives callbacks at stage boundaries
///
/// Every method has an empty default, so implementors override only what
/// they need.
pub trait PipelineObserver: Send {
    fn on_stage_start(&mut self, _stage: &'static str) {}

    fn on_stage_end(&mut self, _stage: &'static str, _report: &StageReport) {}

    fn on_language(&mut self, _lang: Lang) {}

    fn on_phrases(&mut self, _phrases: &[String]) {}

    fn on_clusters(&mut self, _clusters: &[Cluster]) {}

    fn on_forest(&mut self, _forest: &[KeywordNode]) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Records the report of every finished stage
#[derive(Debug, Clone, Default)]
pub struct StageTimingObserver {
    reports: Vec<(&'static str, StageReport)>,
}

impl StageTimingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finished stages in completion order
    pub fn reports(&self) -> &[(&'static str, StageReport)] {
        &self.reports
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.reports.iter().map(|(name, _)| *name).collect()
    }

    pub fn report(&self, stage: &str) -> Option<&StageReport> {
        self.reports
            .iter()
            .find(|(name, _)| *name == stage)
            .map(|(_, report)| report)
    }

    pub fn total(&self) -> Duration {
        self.reports.iter().map(|(_, r)| r.elapsed).sum()
    }
}

impl PipelineObserver for StageTimingObserver {
    fn on_stage_end(&mut self, stage: &'static str, report: &StageReport) {
        self.reports.push((stage, report.clone()));
    }
}

/// Emits a `debug` event per finished stage
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_stage_end(&mut self, stage: &'static str, report: &StageReport) {
        tracing::debug!(
            stage,
            elapsed_ms = report.elapsed_ms(),
            items = report.items,
            degraded = report.degraded,
            "stage finished"
        );
    }

    fn on_language(&mut self, lang: Lang) {
        tracing::debug!(%lang, "language detected");
    }
}
