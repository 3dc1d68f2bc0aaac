//! GitLab integration for ci-stats
//!
//! Provides [`GitLabClient`], a [`ci_stats_core::JobSource`] backed by the
//! GitLab REST v4 API, and [`GitLabConfig`], its environment-derived settings.

pub mod client;
pub mod config;
pub mod error;

pub use client::{GitLabClient, PRIVATE_TOKEN_HEADER};
pub use config::{GitLabConfig, DEFAULT_PROJECT_ID, DEFAULT_TIMEOUT_SECS};
pub use error::GitLabError;

/// Result type for GitLab operations
pub type Result<T> = std::result::Result<T, GitLabError>;
