//! Invocation of the rabbitmqctl executable.

use std::{path::PathBuf, process::Stdio, time::Duration};

use tokio::process::Command;
use tracing::{debug, warn};

use super::{
    error::CollectorError,
    types::{CollectorResult, RawReport, Subcommand},
};

/// Runs the administration tool and captures its output.
///
/// The executable is spawned directly (no shell) as
/// `<path> <args..> <subcommand>`.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    path: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandRunner {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Arguments placed before the subcommand, e.g. `-n rabbit@host`.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn command_name(&self) -> String {
        self.path.display().to_string()
    }

    /// Runs the subcommand to completion and returns stdout followed by
    /// stderr as one report.
    ///
    /// A non-zero exit status is logged but still yields a report: the tool
    /// prints diagnostics that downstream parsing simply fails to match.
    pub async fn run(&self, subcommand: Subcommand) -> CollectorResult<RawReport> {
        let command = self.command_name();
        debug!("Running {} {:?} {}", command, self.args, subcommand);

        let child = Command::new(&self.path)
            .args(&self.args)
            .arg(subcommand.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CollectorError::CommandExecution {
                command: command.clone(),
                source,
            })?;

        // On timeout the future (and the child with it) is dropped, which
        // kills the process.
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| CollectorError::CommandTimeout {
                    command: command.clone(),
                    secs: limit.as_secs(),
                })?,
            None => child.wait_with_output().await,
        }
        .map_err(|source| CollectorError::CommandExecution {
            command: command.clone(),
            source,
        })?;

        if !output.status.success() {
            warn!("{} {} exited with {}", command, subcommand, output.status);
        }

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(RawReport::new(subcommand, text))
    }
}
