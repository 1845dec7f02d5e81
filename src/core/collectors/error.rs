use thiserror::Error;

/// Error type for the collector pipeline.
///
/// Invocation-level variants (`CommandExecution`, `CommandTimeout`) abort a
/// collection tick. Field-level variants (`MissingField`, `ParseError`) only
/// drop a single metric from the tick.
#[derive(Error, Debug)]
pub enum CollectorError {
    /// The external tool could not be spawned or its output could not be read.
    #[error("Command '{command}' failed: {source}")]
    CommandExecution {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The external tool did not exit within the configured timeout.
    #[error("Command '{command}' timed out after {secs}s")]
    CommandTimeout { command: String, secs: u64 },

    /// A known field or section was not present in the report.
    #[error("Missing required field: {field} in {location}")]
    MissingField { field: String, location: String },

    /// A value was located but could not be coerced to an integer.
    #[error("Failed to parse {metric} from {location}: {reason}")]
    ParseError {
        metric: String,
        location: String,
        reason: String,
    },

    /// Tried to access a collector by name, but it was not registered.
    #[error("Collector not found for: {0}")]
    CollectorNotFound(String),
}

impl CollectorError {
    /// True for errors that only invalidate one metric, not the whole tick.
    pub fn is_field_level(&self) -> bool {
        matches!(
            self,
            CollectorError::MissingField { .. } | CollectorError::ParseError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_level_classification() {
        let missing = CollectorError::MissingField {
            field: "disk_free".into(),
            location: "status".into(),
        };
        let parse = CollectorError::ParseError {
            metric: "memory".into(),
            location: "status".into(),
            reason: "invalid digit".into(),
        };
        let timeout = CollectorError::CommandTimeout {
            command: "rabbitmqctl".into(),
            secs: 30,
        };

        assert!(missing.is_field_level());
        assert!(parse.is_field_level());
        assert!(!timeout.is_field_level());
        assert!(!CollectorError::CollectorNotFound("x".into()).is_field_level());
    }

    #[test]
    fn test_error_messages() {
        let err = CollectorError::CommandExecution {
            command: "/usr/sbin/rabbitmqctl".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(
            err.to_string(),
            "Command '/usr/sbin/rabbitmqctl' failed: no such file"
        );

        let err = CollectorError::CommandTimeout {
            command: "rabbitmqctl".into(),
            secs: 5,
        };
        assert_eq!(err.to_string(), "Command 'rabbitmqctl' timed out after 5s");
    }
}
