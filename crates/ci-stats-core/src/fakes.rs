//! In-memory job source (testing only)
//!
//! `MemoryJobSource` satisfies the [`JobSource`] contract without a CI
//! platform: failed jobs and their logs are registered up front, and every
//! log request is recorded for assertions.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::aggregator::{JobRef, JobSource};
use crate::error::{CiStatsError, CiStatsResult};

/// In-memory failed-jobs listing with per-job logs.
#[derive(Debug, Default)]
pub struct MemoryJobSource {
    jobs: Vec<JobRef>,
    logs: HashMap<u64, String>,
    unreachable_logs: HashSet<u64>,
    listing_error: Option<String>,
    page_sizes: Mutex<Vec<usize>>,
    fetched: Mutex<Vec<u64>>,
}

impl MemoryJobSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a failed job and the log text it returns.
    pub fn with_failed_job(mut self, id: u64, name: &str, log: &str) -> Self {
        self.jobs.push(JobRef::new(id, name));
        self.logs.insert(id, log.to_string());
        self
    }

    /// Register a failed job whose log request fails.
    pub fn with_unreachable_log(mut self, id: u64, name: &str) -> Self {
        self.jobs.push(JobRef::new(id, name));
        self.unreachable_logs.insert(id);
        self
    }

    /// Make the failed-jobs listing itself fail.
    pub fn with_listing_error(mut self, detail: &str) -> Self {
        self.listing_error = Some(detail.to_string());
        self
    }

    /// Page sizes requested so far, in call order.
    pub fn requested_page_sizes(&self) -> Vec<usize> {
        self.page_sizes.lock().unwrap().clone()
    }

    /// Job ids whose logs were requested, in call order.
    pub fn fetched_logs(&self) -> Vec<u64> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobSource for MemoryJobSource {
    async fn list_failed_jobs(
        &self,
        pipeline_id: &str,
        page_size: usize,
    ) -> CiStatsResult<Vec<JobRef>> {
        self.page_sizes.lock().unwrap().push(page_size);
        if let Some(detail) = &self.listing_error {
            return Err(CiStatsError::JobListing {
                pipeline_id: pipeline_id.to_string(),
                detail: detail.clone(),
            });
        }
        Ok(self.jobs.iter().take(page_size).cloned().collect())
    }

    async fn job_log_text(&self, job: &JobRef) -> CiStatsResult<String> {
        self.fetched.lock().unwrap().push(job.id);
        if self.unreachable_logs.contains(&job.id) {
            return Err(CiStatsError::JobLog {
                job_id: job.id,
                job_name: job.name.clone(),
                detail: "connection refused".to_string(),
            });
        }
        Ok(self.logs.get(&job.id).cloned().unwrap_or_default())
    }
}
