//! Where collected gauges are written.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Output protocol for dispatched gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkFormat {
    /// collectd exec plugin plain-text protocol (`PUTVAL ...`).
    #[default]
    Collectd,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SinkConfig {
    pub format: SinkFormat,

    /// Plugin name attached to every value.
    #[validate(length(min = 1, message = "Plugin name must not be empty"))]
    pub plugin: String,

    /// Host part of collectd identifiers.
    #[validate(length(min = 1, message = "Hostname must not be empty"))]
    pub hostname: String,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            format: SinkFormat::default(),
            plugin: "rabbitmq".to_string(),
            hostname: std::env::var("COLLECTD_HOSTNAME")
                .ok()
                .filter(|h| !h.is_empty())
                .unwrap_or_else(|| "localhost".to_string()),
        }
    }
}
