//! Test-runner summary parsing for raw job logs.
//!
//! The test runner ends each job with a one-line summary such as
//! `FAILED (skipped=4, errors=2, failures=1)`. That line is the only place
//! the counts live, so everything that depends on its format goes through
//! [`summarize_log`].

use std::sync::LazyLock;

use regex::Regex;

/// Substring that marks the summary line.
pub const SUMMARY_MARKER: &str = "skipped=";

/// Substring that flags a summary line as a failed run.
pub const FAILED_MARKER: &str = "FAILED";

static ERRORS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"errors=([0-9]+)").expect("errors regex is valid"));

static FAILURES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"failures=([0-9]+)").expect("failures regex is valid"));

/// What a job log says about its test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSummary {
    /// No summary line in the log.
    Missing,
    /// A summary line without the `FAILED` flag, kept verbatim.
    NotFailed(String),
    /// A `FAILED` summary line and its counts.
    Failed { errors: u64, failures: u64 },
}

/// Return the first line containing [`SUMMARY_MARKER`].
///
/// Lines end at `\n`, `\r\n` or a bare `\r`; CI traces use carriage returns
/// around collapsible section markers.
pub fn extract_summary_line(log_text: &str) -> Option<&str> {
    log_text
        .split(['\n', '\r'])
        .find(|line| line.contains(SUMMARY_MARKER))
}

/// Extract `(errors, failures)` from a summary line.
///
/// Each token is searched independently; a missing token counts as zero.
pub fn parse_counts(summary_line: &str) -> (u64, u64) {
    (
        first_count(&ERRORS_RE, summary_line),
        first_count(&FAILURES_RE, summary_line),
    )
}

fn first_count(re: &Regex, text: &str) -> u64 {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        // Only ASCII digits match, so a parse error means overflow.
        .map(|m| m.as_str().parse().unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Classify a raw job log.
pub fn summarize_log(log_text: &str) -> LogSummary {
    match extract_summary_line(log_text) {
        None => LogSummary::Missing,
        Some(line) if line.contains(FAILED_MARKER) => {
            let (errors, failures) = parse_counts(line);
            LogSummary::Failed { errors, failures }
        }
        Some(line) => LogSummary::NotFailed(line.to_string()),
    }
}
