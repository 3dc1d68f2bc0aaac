//! GitLab REST v4 client
//!
//! Lists a pipeline's failed jobs and downloads job traces. Implements
//! [`JobSource`] so the aggregator can run against a live instance.

use std::time::Duration;

use async_trait::async_trait;
use ci_stats_core::{CiStatsError, CiStatsResult, JobRef, JobSource};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::config::GitLabConfig;
use crate::error::GitLabError;
use crate::Result;

/// Header carrying the personal/project access token (`PRIVATE-TOKEN`).
pub const PRIVATE_TOKEN_HEADER: HeaderName = HeaderName::from_static("private-token");

/// GitLab client for pipeline job queries
pub struct GitLabClient {
    config: GitLabConfig,
    http_client: reqwest::Client,
}

impl GitLabClient {
    /// Create a new GitLab client
    pub fn new(config: GitLabConfig) -> Result<Self> {
        let mut token = HeaderValue::from_str(&config.private_token).map_err(|_| {
            GitLabError::InvalidConfig {
                name: "GITLAB_PRIVATE_TOKEN",
                value: "<redacted>".to_string(),
            }
        })?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(PRIVATE_TOKEN_HEADER, token);

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("ci-stats/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(GitLabClient {
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GitLabConfig::from_env()?)
    }

    pub fn config(&self) -> &GitLabConfig {
        &self.config
    }

    /// URL listing the failed jobs of a pipeline (first page only)
    pub fn failed_jobs_url(&self, pipeline_id: &str, page_size: usize) -> String {
        format!(
            "{}pipelines/{}/jobs?per_page={}&scope[]=failed",
            self.config.project_url(),
            pipeline_id,
            page_size
        )
    }

    /// URL of a job's raw trace
    pub fn job_trace_url(&self, job_id: u64) -> String {
        format!("{}jobs/{}/trace", self.config.project_url(), job_id)
    }

    /// List the failed jobs of a pipeline
    pub async fn failed_jobs(&self, pipeline_id: &str, page_size: usize) -> Result<Vec<JobRef>> {
        if pipeline_id.is_empty() || !pipeline_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GitLabError::InvalidPipelineId(pipeline_id.to_string()));
        }

        let url = self.failed_jobs_url(pipeline_id, page_size);
        let body = self.get_text(&url).await?;
        serde_json::from_str(&body).map_err(|e| GitLabError::Decode {
            url,
            detail: e.to_string(),
        })
    }

    /// Download a job's trace as text
    pub async fn job_trace(&self, job_id: u64) -> Result<String> {
        let url = self.job_trace_url(job_id);
        self.get_text(&url).await
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        debug!(url = %url, "GET");
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GitLabError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!(url = %url, bytes = body.len(), "Response received");
        Ok(body)
    }
}

#[async_trait]
impl JobSource for GitLabClient {
    async fn list_failed_jobs(
        &self,
        pipeline_id: &str,
        page_size: usize,
    ) -> CiStatsResult<Vec<JobRef>> {
        self.failed_jobs(pipeline_id, page_size)
            .await
            .map_err(|e| CiStatsError::JobListing {
                pipeline_id: pipeline_id.to_string(),
                detail: e.to_string(),
            })
    }

    async fn job_log_text(&self, job: &JobRef) -> CiStatsResult<String> {
        self.job_trace(job.id)
            .await
            .map_err(|e| CiStatsError::JobLog {
                job_id: job.id,
                job_name: job.name.clone(),
                detail: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GitLabClient {
        let config = GitLabConfig::new("https://gitlab.example.com/", "glpat-secret");
        GitLabClient::new(config).unwrap()
    }

    #[test]
    fn test_failed_jobs_url() {
        assert_eq!(
            client().failed_jobs_url("5120", 50),
            "https://gitlab.example.com/api/v4/projects/147/pipelines/5120/jobs?per_page=50&scope[]=failed"
        );
    }

    #[test]
    fn test_job_trace_url() {
        assert_eq!(
            client().job_trace_url(99),
            "https://gitlab.example.com/api/v4/projects/147/jobs/99/trace"
        );
    }

    #[test]
    fn test_new_rejects_token_with_newline() {
        let config = GitLabConfig::new("https://gitlab.example.com", "bad\ntoken");
        let err = GitLabClient::new(config).err().unwrap();
        assert!(!err.to_string().contains("bad"));
    }

    #[tokio::test]
    async fn test_failed_jobs_rejects_non_numeric_pipeline() {
        let err = client().failed_jobs("12/../../users", 50).await.unwrap_err();
        assert!(matches!(err, GitLabError::InvalidPipelineId(_)));
    }
}
