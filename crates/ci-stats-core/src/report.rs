//! Pipeline report and its text/JSON renderings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{ComponentEntry, ComponentStatus};
use crate::error::CiStatsResult;

/// Width of the identifier column in the text report.
pub const LABEL_WIDTH: usize = 30;

/// Width of the `=` line separating entries from totals.
pub const SEPARATOR_WIDTH: usize = 70;

/// Pipeline-wide error and failure counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineTotals {
    pub errors: u64,
    pub failures: u64,
}

impl PipelineTotals {
    pub fn add(&mut self, errors: u64, failures: u64) {
        self.errors = self.errors.saturating_add(errors);
        self.failures = self.failures.saturating_add(failures);
    }

    pub fn is_zero(&self) -> bool {
        self.errors == 0 && self.failures == 0
    }
}

/// Result of aggregating one pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub pipeline_id: String,
    /// Entries in catalog order, unknown job names appended.
    pub components: Vec<ComponentEntry>,
    pub totals: PipelineTotals,
    /// One line per job whose log could not be fetched.
    pub warnings: Vec<String>,
    /// The failed-jobs listing filled a whole page; later jobs may be missing.
    pub truncated: bool,
    pub generated_at: DateTime<Utc>,
}

impl PipelineReport {
    pub fn status_of(&self, identifier: &str) -> Option<&ComponentStatus> {
        self.components
            .iter()
            .find(|e| e.identifier == identifier)
            .map(|e| &e.status)
    }

    /// Number of entries that are not `Success`.
    pub fn non_success_count(&self) -> usize {
        self.components
            .iter()
            .filter(|e| !e.status.is_success())
            .count()
    }

    /// Render the fixed-column text report.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.components {
            out.push_str(&format!(
                "{:width$} {}\n",
                entry.identifier,
                entry.status,
                width = LABEL_WIDTH
            ));
        }

        out.push_str(&"=".repeat(SEPARATOR_WIDTH));
        out.push_str("\n\nTOTAL\n");
        out.push_str(&format!(
            "{:width$} {}\n",
            "Errors",
            self.totals.errors,
            width = LABEL_WIDTH
        ));
        out.push_str(&format!(
            "{:width$} {}\n",
            "Failures",
            self.totals.failures,
            width = LABEL_WIDTH
        ));
        out
    }

    pub fn render_json(&self) -> CiStatsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
