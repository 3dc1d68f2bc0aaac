//! Error types for the GitLab client

use thiserror::Error;

/// Errors that can occur talking to GitLab
#[derive(Error, Debug)]
pub enum GitLabError {
    /// A required configuration variable is not set
    #[error("{0} is not set")]
    MissingConfig(&'static str),

    /// A configuration variable has an unusable value
    #[error("Invalid value for {name}: {value}")]
    InvalidConfig { name: &'static str, value: String },

    /// Pipeline ids are numeric
    #[error("Invalid pipeline id: {0:?}")]
    InvalidPipelineId(String),

    /// Network-level failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(String),

    /// GitLab answered with a non-success status
    #[error("GitLab returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Response body was not the expected JSON
    #[error("Unexpected response from {url}: {detail}")]
    Decode { url: String, detail: String },
}

impl From<reqwest::Error> for GitLabError {
    fn from(err: reqwest::Error) -> Self {
        GitLabError::Http(err.to_string())
    }
}
