//! Pipeline stats aggregation.
//!
//! [`PipelineAggregator`] lists a pipeline's failed jobs through an injected
//! [`JobSource`], summarizes each failed test job's log, and merges the
//! results into a fresh [`ComponentCatalog`] to produce a [`PipelineReport`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{ComponentCatalog, ComponentStatus, UNPARSEABLE_SENTINEL};
use crate::error::{CiStatsError, CiStatsResult};
use crate::log_stats::{summarize_log, LogSummary};
use crate::report::{PipelineReport, PipelineTotals};

/// Page size of the failed-jobs listing. Only the first page is read.
pub const FAILED_JOBS_PAGE_SIZE: usize = 50;

/// Job names starting with this prefix are test jobs.
pub const TEST_JOB_PREFIX: &str = "test";

/// The part of a CI job the aggregator needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRef {
    pub id: u64,
    pub name: String,
}

impl JobRef {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn is_test_job(&self) -> bool {
        self.name.starts_with(TEST_JOB_PREFIX)
    }
}

/// Injectable source of failed jobs and their logs.
///
/// Implement this trait to plug in a CI platform API or a test stub.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// List the jobs of `pipeline_id` in a failed state, at most `page_size`.
    async fn list_failed_jobs(
        &self,
        pipeline_id: &str,
        page_size: usize,
    ) -> CiStatsResult<Vec<JobRef>>;

    /// Fetch the raw log text of a job.
    async fn job_log_text(&self, job: &JobRef) -> CiStatsResult<String>;
}

/// What to do when a single job log cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the whole aggregation with the transport error.
    #[default]
    FailFast,
    /// Mark the job `Unavailable`, record a warning and continue.
    KeepGoing,
}

/// Builds a [`PipelineReport`] from a pipeline's failed jobs.
pub struct PipelineAggregator {
    source: Arc<dyn JobSource>,
    policy: FailurePolicy,
    catalog: ComponentCatalog,
}

impl PipelineAggregator {
    pub fn new(source: Arc<dyn JobSource>) -> Self {
        Self {
            source,
            policy: FailurePolicy::default(),
            catalog: ComponentCatalog::build(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the default component catalog.
    pub fn with_catalog(mut self, catalog: ComponentCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Aggregate the failed test jobs of `pipeline_id`.
    ///
    /// Jobs are processed one at a time in listing order. A listing failure is
    /// always returned as an error; log failures follow the [`FailurePolicy`].
    pub async fn aggregate(&self, pipeline_id: &str) -> CiStatsResult<PipelineReport> {
        let mut catalog = self.catalog.clone();
        let mut totals = PipelineTotals::default();
        let mut warnings = Vec::new();

        let mut jobs = self
            .source
            .list_failed_jobs(pipeline_id, FAILED_JOBS_PAGE_SIZE)
            .await?;
        let truncated = jobs.len() >= FAILED_JOBS_PAGE_SIZE;
        if truncated {
            warn!(
                pipeline_id = %pipeline_id,
                page_size = FAILED_JOBS_PAGE_SIZE,
                "Failed-jobs listing filled a whole page; later jobs are not reported"
            );
            jobs.truncate(FAILED_JOBS_PAGE_SIZE);
        }
        info!(pipeline_id = %pipeline_id, failed_jobs = jobs.len(), "Aggregating pipeline");

        for job in jobs.iter().filter(|j| j.is_test_job()) {
            let log_text = match self.source.job_log_text(job).await {
                Ok(text) => text,
                Err(e) if self.policy == FailurePolicy::KeepGoing => {
                    warn!(job_id = job.id, job = %job.name, error = %e, "Skipping job log");
                    warnings.push(e.to_string());
                    catalog.set_status(
                        &job.name,
                        ComponentStatus::Unavailable {
                            reason: transport_detail(&e),
                        },
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };

            let status = match summarize_log(&log_text) {
                LogSummary::Failed { errors, failures } => {
                    totals.add(errors, failures);
                    ComponentStatus::Failed { errors, failures }
                }
                LogSummary::NotFailed(line) => ComponentStatus::Unknown { text: line },
                LogSummary::Missing => {
                    warn!(job_id = job.id, job = %job.name, "No summary line in job log");
                    ComponentStatus::Unknown {
                        text: UNPARSEABLE_SENTINEL.to_string(),
                    }
                }
            };
            debug!(job_id = job.id, job = %job.name, status = %status, "Job summarized");
            catalog.set_status(&job.name, status);
        }

        info!(
            pipeline_id = %pipeline_id,
            errors = totals.errors,
            failures = totals.failures,
            "Pipeline aggregated"
        );

        Ok(PipelineReport {
            pipeline_id: pipeline_id.to_string(),
            components: catalog.into_entries(),
            totals,
            warnings,
            truncated,
            generated_at: Utc::now(),
        })
    }
}

fn transport_detail(err: &CiStatsError) -> String {
    match err {
        CiStatsError::JobListing { detail, .. } | CiStatsError::JobLog { detail, .. } => {
            detail.clone()
        }
        other => other.to_string(),
    }
}
