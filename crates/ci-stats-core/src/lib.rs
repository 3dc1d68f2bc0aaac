//! ci-stats core library
//!
//! Summarizes a CI pipeline run:
//! - [`ComponentCatalog`]: the ordered list of expected test jobs
//! - [`log_stats`]: recovers error/failure counts from a job's log
//! - [`PipelineAggregator`]: merges failed jobs into the catalog with totals

pub mod aggregator;
pub mod catalog;
pub mod error;
pub mod fakes;
pub mod log_stats;
pub mod report;
pub mod telemetry;

// Re-export key types
pub use aggregator::{
    FailurePolicy, JobRef, JobSource, PipelineAggregator, FAILED_JOBS_PAGE_SIZE, TEST_JOB_PREFIX,
};
pub use catalog::{ComponentCatalog, ComponentEntry, ComponentStatus, UNPARSEABLE_SENTINEL};
pub use error::{CiStatsError, CiStatsResult};
pub use log_stats::{extract_summary_line, parse_counts, summarize_log, LogSummary};
pub use report::{PipelineReport, PipelineTotals};
pub use telemetry::init_tracing;
