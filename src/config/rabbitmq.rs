//! Configuration for invoking the RabbitMQ administration tool.

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Location and invocation options for `rabbitmqctl`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RabbitmqConfig {
    /// Path to the rabbitmqctl executable.
    #[validate(custom(function = "validate_ctl_path"))]
    pub ctl_path: PathBuf,

    /// Extra arguments placed before the subcommand (e.g. `["-n", "rabbit@mq01"]`).
    pub args: Vec<String>,

    /// Seconds to wait for the tool to exit. `0` disables the limit.
    #[validate(range(max = 3600, message = "Timeout must not exceed one hour"))]
    pub timeout: u64,

    /// Log per-field diagnostics at info level instead of debug.
    pub verbose: bool,
}

fn validate_ctl_path(path: &PathBuf) -> Result<(), ValidationError> {
    if path.as_os_str().is_empty() {
        let mut err = ValidationError::new("empty_ctl_path");
        err.message = Some("rabbitmqctl path must not be empty".into());
        return Err(err);
    }
    Ok(())
}

impl RabbitmqConfig {
    /// Configured timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }
}

impl Default for RabbitmqConfig {
    fn default() -> Self {
        Self {
            ctl_path: PathBuf::from("/usr/sbin/rabbitmqctl"),
            args: Vec::new(),
            timeout: 30,
            verbose: false,
        }
    }
}
