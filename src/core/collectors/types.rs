use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use super::error::CollectorError;

/// Result alias used across the collector pipeline.
pub type CollectorResult<T> = std::result::Result<T, CollectorError>;

/// The rabbitmqctl subcommand a collector runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subcommand {
    /// `rabbitmqctl status`: node status term only.
    Status,
    /// `rabbitmqctl report`: status term plus per-vhost sections.
    Report,
}

impl Subcommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subcommand::Status => "status",
            Subcommand::Report => "report",
        }
    }
}

impl fmt::Display for Subcommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Captured output of one rabbitmqctl invocation.
#[derive(Debug, Clone)]
pub struct RawReport {
    subcommand: Subcommand,
    text: String,
}

impl RawReport {
    pub fn new(subcommand: Subcommand, text: impl Into<String>) -> Self {
        Self {
            subcommand,
            text: text.into(),
        }
    }

    pub fn subcommand(&self) -> Subcommand {
        self.subcommand
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Integer metrics produced by one collection tick, keyed by metric name.
///
/// Keys that could not be resolved are absent rather than zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MetricSet {
    values: BTreeMap<&'static str, i64>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &'static str, value: i64) {
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, i64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys from `expected` that this set does not carry.
    pub fn missing<'a>(&self, expected: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        expected
            .into_iter()
            .filter(|key| !self.values.contains_key(*key))
            .collect()
    }
}
