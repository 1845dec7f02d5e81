//! Configuration for which collectors run and how often.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Names accepted in `metrics.collectors.enabled`.
pub const KNOWN_COLLECTORS: [&str; 2] = ["status", "report"];

/// The set of enabled collectors and collection timing.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CollectorsConfig {
    /// Collectors executed on every tick, in order.
    #[validate(
        length(
            min = 1,
            message = "At least one collector must be enabled, possible values: status, report"
        ),
        custom(function = "validate_collector_names")
    )]
    pub enabled: Vec<String>,

    /// Interval (in seconds) between collection ticks.
    #[validate(range(min = 1, message = "Collection must be at least 1 second"))]
    pub collection_interval: u64,

    /// Run a single tick and exit instead of looping.
    pub oneshot: bool,
}

fn validate_collector_names(names: &[String]) -> Result<(), ValidationError> {
    if let Some(unknown) = names
        .iter()
        .find(|n| !KNOWN_COLLECTORS.contains(&n.as_str()))
    {
        let mut err = ValidationError::new("unknown_collector");
        err.message = Some(format!("Unknown collector: {}", unknown).into());
        return Err(err);
    }
    Ok(())
}

impl Default for CollectorsConfig {
    fn default() -> Self {
        Self {
            enabled: vec!["report".to_string()],
            collection_interval: 10,
            oneshot: false,
        }
    }
}

impl CollectorsConfig {
    /// Return enabled collector names
    pub fn enabled_names(&self) -> Vec<&str> {
        self.enabled.iter().map(String::as_str).collect()
    }
}

/// Top-level metrics configuration container.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MetricsConfig {
    #[validate(nested)]
    pub collectors: CollectorsConfig,
}
