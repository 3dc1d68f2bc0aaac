//! Error types for pipeline stats aggregation.

use thiserror::Error;

/// Errors produced while aggregating a pipeline's job statistics.
///
/// Log parsing never fails: a log without a summary line is rendered as a
/// sentinel in the report. Only transport and rendering problems surface here.
#[derive(Debug, Error)]
pub enum CiStatsError {
    /// The failed-jobs listing for a pipeline could not be retrieved.
    #[error("failed to list failed jobs for pipeline '{pipeline_id}': {detail}")]
    JobListing { pipeline_id: String, detail: String },

    /// The log (trace) of a single job could not be retrieved.
    #[error("failed to fetch log for job {job_id} ('{job_name}'): {detail}")]
    JobLog {
        job_id: u64,
        job_name: String,
        detail: String,
    },

    /// Report serialization failed.
    #[error("report serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CiStatsError {
    /// `true` for errors caused by talking to the CI platform.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CiStatsError::JobListing { .. } | CiStatsError::JobLog { .. }
        )
    }
}

/// Convenience result alias.
pub type CiStatsResult<T> = std::result::Result<T, CiStatsError>;
