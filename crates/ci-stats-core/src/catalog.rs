//! Ordered catalog of expected test components.
//!
//! The catalog lists every test job a pipeline is expected to run, in the
//! order CI executes them. Each run builds a fresh catalog seeded with
//! [`ComponentStatus::Success`]; the aggregator overrides entries for jobs
//! that failed.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Sites that run a `common` and a `core` test job each.
pub const NON_BACKOFFICE_SITES: [&str; 7] = [
    "acapi",
    "frontend",
    "processing",
    "redemption",
    "scapi",
    "taapi",
    "worker",
];

/// Backoffice suites are sharded; each shard is its own job.
pub const BACKOFFICE_SHARDS: [&str; 10] = [
    "test:backoffice:common: [0]",
    "test:backoffice:common: [1]",
    "test:backoffice:core: [0]",
    "test:backoffice:core: [1]",
    "test:backoffice:core: [2]",
    "test:backoffice:core: [3]",
    "test:backoffice:core: [4]",
    "test:backoffice:core: [5]",
    "test:backoffice:core: [6]",
    "test:backoffice:core: [7]",
];

/// Placeholder shown when a job log has no summary line.
pub const UNPARSEABLE_SENTINEL: &str = "ERROR!!!";

/// Outcome of one component in a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComponentStatus {
    /// Not reported as failed by the CI platform.
    Success,
    /// The summary line was flagged `FAILED`.
    Failed { errors: u64, failures: u64 },
    /// Raw summary text that was not flagged `FAILED`, or the sentinel.
    Unknown { text: String },
    /// The job log could not be fetched.
    Unavailable { reason: String },
}

impl ComponentStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ComponentStatus::Success)
    }
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentStatus::Success => f.write_str("SUCCESS"),
            ComponentStatus::Failed { errors, failures } => write!(
                f,
                "FAILED:   {:10}  {:14}",
                format!("errors={errors}"),
                format!("failures={failures}")
            ),
            ComponentStatus::Unknown { text } => f.write_str(text),
            ComponentStatus::Unavailable { reason } => write!(f, "UNAVAILABLE: {reason}"),
        }
    }
}

/// A named component and its current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEntry {
    pub identifier: String,
    pub status: ComponentStatus,
}

/// Insertion-ordered mapping of component identifier to status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentCatalog {
    entries: Vec<ComponentEntry>,
    index: HashMap<String, usize>,
}

impl ComponentCatalog {
    /// Build the catalog in CI execution order, every entry `Success`.
    pub fn build() -> Self {
        let sites = NON_BACKOFFICE_SITES.iter().flat_map(|site| {
            [
                format!("test:{site}:common"),
                format!("test:{site}:core"),
            ]
        });
        let shards = BACKOFFICE_SHARDS.iter().map(|s| s.to_string());
        Self::from_identifiers(sites.chain(shards))
    }

    /// Build a catalog from an arbitrary ordered identifier list.
    ///
    /// Duplicates keep their first position.
    pub fn from_identifiers<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog = Self::default();
        for identifier in identifiers {
            let identifier = identifier.into();
            if !catalog.index.contains_key(&identifier) {
                catalog.push(identifier, ComponentStatus::Success);
            }
        }
        catalog
    }

    /// Set the status of `identifier`, appending it if it is not yet known.
    ///
    /// Known identifiers keep their position.
    pub fn set_status(&mut self, identifier: &str, status: ComponentStatus) {
        match self.index.get(identifier) {
            Some(&pos) => self.entries[pos].status = status,
            None => self.push(identifier.to_string(), status),
        }
    }

    pub fn get(&self, identifier: &str) -> Option<&ComponentStatus> {
        self.index
            .get(identifier)
            .map(|&pos| &self.entries[pos].status)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains_key(identifier)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentEntry> {
        self.entries.iter()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.identifier.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<ComponentEntry> {
        self.entries
    }

    fn push(&mut self, identifier: String, status: ComponentStatus) {
        self.index.insert(identifier.clone(), self.entries.len());
        self.entries.push(ComponentEntry { identifier, status });
    }
}
