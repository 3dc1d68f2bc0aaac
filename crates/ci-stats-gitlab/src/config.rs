//! GitLab connection configuration

use std::fmt;

use crate::error::GitLabError;
use crate::Result;

/// Project queried when `GITLAB_PROJECT_ID` is not set.
pub const DEFAULT_PROJECT_ID: &str = "147";

/// Request timeout when `GITLAB_TIMEOUT_SECS` is not set.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// GitLab API configuration
#[derive(Clone, PartialEq, Eq)]
pub struct GitLabConfig {
    /// Instance root, e.g. `https://gitlab.example.com`
    pub base_url: String,
    /// Numeric or URL-encoded project id
    pub project_id: String,
    /// Sent as the `PRIVATE-TOKEN` header
    pub private_token: String,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl GitLabConfig {
    /// Create config for a specific instance with default project and timeout
    pub fn new(base_url: &str, private_token: &str) -> Self {
        GitLabConfig {
            base_url: base_url.to_string(),
            project_id: DEFAULT_PROJECT_ID.to_string(),
            private_token: private_token.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the project id
    pub fn with_project_id(mut self, project_id: &str) -> Self {
        self.project_id = project_id.to_string();
        self
    }

    /// Set the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - GITLAB_BASE_URL (required)
    /// - GITLAB_PRIVATE_TOKEN (required)
    /// - GITLAB_PROJECT_ID (optional, default: "147")
    /// - GITLAB_TIMEOUT_SECS (optional, default: 30)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create from an arbitrary variable lookup, using the same names as
    /// [`GitLabConfig::from_env`]. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let base_url = get("GITLAB_BASE_URL").ok_or(GitLabError::MissingConfig("GITLAB_BASE_URL"))?;
        let private_token =
            get("GITLAB_PRIVATE_TOKEN").ok_or(GitLabError::MissingConfig("GITLAB_PRIVATE_TOKEN"))?;
        let project_id = get("GITLAB_PROJECT_ID").unwrap_or_else(|| DEFAULT_PROJECT_ID.to_string());
        let timeout_secs: u64 = match get("GITLAB_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| GitLabError::InvalidConfig {
                    name: "GITLAB_TIMEOUT_SECS",
                    value: raw.clone(),
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(GitLabError::InvalidConfig {
                name: "GITLAB_BASE_URL",
                value: base_url,
            });
        }

        Ok(GitLabConfig {
            base_url,
            project_id,
            private_token,
            timeout_secs,
        })
    }

    /// `{base_url}/api/v4/projects/{project_id}/`
    pub fn project_url(&self) -> String {
        format!(
            "{}/api/v4/projects/{}/",
            self.base_url.trim_end_matches('/'),
            self.project_id
        )
    }
}

impl fmt::Debug for GitLabConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitLabConfig")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .field("private_token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
