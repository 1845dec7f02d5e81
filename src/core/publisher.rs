//! Sinks for collected gauges.
//!
//! Both publishers write line-oriented text to stdout, which is what the
//! collectd exec plugin (and most log shippers) read.

use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
};

use serde::Serialize;
use thiserror::Error;

use crate::config::sink::{SinkConfig, SinkFormat};

/// One value handed to a sink: `(plugin, metric key, gauge value)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaugeValue<'a> {
    pub plugin: &'a str,
    pub type_instance: &'a str,
    pub value: i64,
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Failed to write value: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize value: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Output writer lock poisoned")]
    Poisoned,
}

/// Trait for sinks that receive gauges one by one.
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, value: &GaugeValue<'_>) -> Result<(), PublishError>;
}

type Output = Mutex<Box<dyn Write + Send>>;

fn write_line(out: &Output, line: &[u8]) -> Result<(), PublishError> {
    let mut out = out.lock().map_err(|_| PublishError::Poisoned)?;
    out.write_all(line)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

/// Writes values using the collectd exec plugin plain-text protocol.
pub struct CollectdPublisher {
    hostname: String,
    interval: u64,
    out: Output,
}

impl CollectdPublisher {
    pub fn new(hostname: impl Into<String>, interval: u64, out: Box<dyn Write + Send>) -> Self {
        Self {
            hostname: hostname.into(),
            interval,
            out: Mutex::new(out),
        }
    }

    /// `PUTVAL "<host>/<plugin>/gauge-<key>" interval=<secs> N:<value>`
    pub fn format(&self, value: &GaugeValue<'_>) -> String {
        format!(
            "PUTVAL \"{}/{}/gauge-{}\" interval={} N:{}",
            self.hostname, value.plugin, value.type_instance, self.interval, value.value
        )
    }
}

#[async_trait::async_trait]
impl Publisher for CollectdPublisher {
    async fn publish(&self, value: &GaugeValue<'_>) -> Result<(), PublishError> {
        write_line(&self.out, self.format(value).as_bytes())
    }
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    host: &'a str,
    plugin: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    type_instance: &'a str,
    value: i64,
    time: i64,
}

/// Writes one JSON object per value.
pub struct JsonPublisher {
    hostname: String,
    out: Output,
}

impl JsonPublisher {
    pub fn new(hostname: impl Into<String>, out: Box<dyn Write + Send>) -> Self {
        Self {
            hostname: hostname.into(),
            out: Mutex::new(out),
        }
    }
}

#[async_trait::async_trait]
impl Publisher for JsonPublisher {
    async fn publish(&self, value: &GaugeValue<'_>) -> Result<(), PublishError> {
        let record = JsonRecord {
            host: &self.hostname,
            plugin: value.plugin,
            kind: "gauge",
            type_instance: value.type_instance,
            value: value.value,
            time: time::OffsetDateTime::now_utc().unix_timestamp(),
        };
        let line = serde_json::to_vec(&record)?;
        write_line(&self.out, &line)
    }
}

/// Publisher on stdout for the configured sink format.
pub fn from_config(sink: &SinkConfig, interval: u64) -> Arc<dyn Publisher> {
    let stdout: Box<dyn Write + Send> = Box::new(io::stdout());
    match sink.format {
        SinkFormat::Collectd => Arc::new(CollectdPublisher::new(&sink.hostname, interval, stdout)),
        SinkFormat::Json => Arc::new(JsonPublisher::new(&sink.hostname, stdout)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// In-memory writer shared between a publisher and the test.
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuf(pub Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    const MEMORY: GaugeValue<'static> = GaugeValue {
        plugin: "rabbitmq",
        type_instance: "memory",
        value: 58425224,
    };

    #[tokio::test]
    async fn test_collectd_putval_line() {
        let buf = SharedBuf::default();
        let publisher = CollectdPublisher::new("mq01", 10, Box::new(buf.clone()));

        publisher.publish(&MEMORY).await.unwrap();
        publisher
            .publish(&GaugeValue {
                type_instance: "queues_count",
                value: 0,
                ..MEMORY
            })
            .await
            .unwrap();

        assert_eq!(
            buf.contents(),
            "PUTVAL \"mq01/rabbitmq/gauge-memory\" interval=10 N:58425224\n\
             PUTVAL \"mq01/rabbitmq/gauge-queues_count\" interval=10 N:0\n"
        );
    }

    #[tokio::test]
    async fn test_json_line() {
        let buf = SharedBuf::default();
        let publisher = JsonPublisher::new("mq01", Box::new(buf.clone()));

        publisher.publish(&MEMORY).await.unwrap();

        let contents = buf.contents();
        assert!(contents.ends_with('\n'));
        let record: serde_json::Value = serde_json::from_str(contents.trim_end()).unwrap();
        assert_eq!(record["host"], "mq01");
        assert_eq!(record["plugin"], "rabbitmq");
        assert_eq!(record["type"], "gauge");
        assert_eq!(record["type_instance"], "memory");
        assert_eq!(record["value"], 58425224);
        assert!(record["time"].as_i64().unwrap() > 0);
    }
}
