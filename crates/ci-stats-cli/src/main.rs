//! ci-stats - test failure summary for a GitLab CI pipeline
//!
//! `ci-stats <PIPELINE_ID>` lists the pipeline's failed jobs, reads the test
//! runner summary from each failed test job's trace, and prints every
//! expected test component with its status followed by pipeline totals.
//!
//! Configuration comes from `GITLAB_BASE_URL`, `GITLAB_PRIVATE_TOKEN`,
//! `GITLAB_PROJECT_ID` and `GITLAB_TIMEOUT_SECS`, optionally via a `.env` file.

use anyhow::{Context, Result};
use ci_stats_core::{FailurePolicy, PipelineAggregator, PipelineReport};
use ci_stats_gitlab::{GitLabClient, GitLabConfig};
use clap::{Parser, ValueEnum};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "ci-stats")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Summarize test failures of a GitLab CI pipeline", long_about = None)]
struct Cli {
    /// Pipeline to summarize
    pipeline_id: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    log_json: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Report jobs whose trace cannot be fetched instead of aborting
    #[arg(long)]
    keep_going: bool,

    /// GitLab project (overrides GITLAB_PROJECT_ID)
    #[arg(long)]
    project_id: Option<String>,

    /// Read configuration from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    ci_stats_core::init_tracing(cli.log_json, level);

    let mut config = load_config(cli.env_file.as_deref())?;
    if let Some(project_id) = &cli.project_id {
        config = config.with_project_id(project_id);
    }
    info!(
        base_url = %config.base_url,
        project_id = %config.project_id,
        "Using GitLab project"
    );

    let client = GitLabClient::new(config).context("Failed to create GitLab client")?;
    let policy = if cli.keep_going {
        FailurePolicy::KeepGoing
    } else {
        FailurePolicy::FailFast
    };

    let report = PipelineAggregator::new(Arc::new(client))
        .with_policy(policy)
        .aggregate(&cli.pipeline_id.to_string())
        .await
        .with_context(|| format!("Failed to summarize pipeline {}", cli.pipeline_id))?;

    print!("{}", render(&report, cli.format)?);
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }

    Ok(())
}

/// Resolve GitLab configuration.
///
/// Without `env_file`, `./.env` is loaded if present (never overriding the
/// process environment). With `env_file`, its values take precedence.
fn load_config(env_file: Option<&Path>) -> Result<GitLabConfig> {
    match env_file {
        Some(path) => config_from_env_file(path),
        None => {
            dotenvy::dotenv().ok();
            GitLabConfig::from_env().context("Invalid GitLab configuration")
        }
    }
}

fn config_from_env_file(path: &Path) -> Result<GitLabConfig> {
    let vars: HashMap<String, String> = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    GitLabConfig::from_lookup(|name| vars.get(name).cloned().or_else(|| std::env::var(name).ok()))
        .with_context(|| format!("Invalid GitLab configuration in {}", path.display()))
}

fn render(report: &PipelineReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(report.render_text()),
        OutputFormat::Json => {
            let mut json = report.render_json().context("Failed to render report")?;
            json.push('\n');
            Ok(json)
        }
    }
}
