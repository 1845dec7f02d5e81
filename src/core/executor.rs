//! Periodic collection and publishing.
//!
//! The `Executor` runs every enabled collector serially on each tick and
//! dispatches the resulting metrics to the publisher one value at a time.
//! Ticks never overlap: the next one starts only after the previous one has
//! finished and the remainder of the interval has elapsed.

use std::sync::Arc;

use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, error, info, warn};

use super::{
    collectors::{registry::CollectorRegistry, traits::DataProducer},
    publisher::{GaugeValue, Publisher},
};
use crate::{config::metrics::MetricsConfig, verbose};

/// Outcome of one tick, mostly for logging and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    /// Values handed to the publisher successfully.
    pub dispatched: usize,
    /// Collectors whose invocation failed outright.
    pub failed_collectors: usize,
    /// Values the publisher rejected.
    pub failed_publishes: usize,
}

/// Executor that manages periodic collection and publishing of metrics.
pub struct Executor {
    collectors: Vec<Arc<dyn DataProducer>>,
    publisher: Arc<dyn Publisher>,
    config: Arc<MetricsConfig>,
    plugin: String,
    verbose: bool,
}

impl Executor {
    /// Resolves the enabled collectors from `registry`. Unknown names are
    /// logged and skipped.
    pub fn new(
        registry: &CollectorRegistry,
        publisher: Arc<dyn Publisher>,
        config: Arc<MetricsConfig>,
        plugin: impl Into<String>,
        verbose: bool,
    ) -> Self {
        let collectors = config
            .collectors
            .enabled
            .iter()
            .filter_map(|name| match registry.get(name) {
                Ok(c) => Some(c),
                Err(e) => {
                    error!("Collector '{}' not found: {}", name, e);
                    None
                }
            })
            .collect();

        Self::with_collectors(collectors, publisher, config, plugin, verbose)
    }

    pub fn with_collectors(
        collectors: Vec<Arc<dyn DataProducer>>,
        publisher: Arc<dyn Publisher>,
        config: Arc<MetricsConfig>,
        plugin: impl Into<String>,
        verbose: bool,
    ) -> Self {
        Self {
            collectors,
            publisher,
            config,
            plugin: plugin.into(),
            verbose,
        }
    }

    /// Number of collectors that will run on each tick.
    pub fn collector_count(&self) -> usize {
        self.collectors.len()
    }

    /// Runs every collector once and dispatches its values.
    pub async fn tick(&self) -> TickSummary {
        let mut summary = TickSummary::default();

        for collector in &self.collectors {
            let name = collector.name();
            let metrics = match collector.produce().await {
                Ok(m) => m,
                Err(e) => {
                    error!("Failed to collect from '{}': {}", name, e);
                    summary.failed_collectors += 1;
                    continue;
                }
            };

            let missing = metrics.missing(collector.expected_keys());
            if !missing.is_empty() {
                verbose!(
                    self.verbose,
                    "Partial metric set from '{}', missing: {}",
                    name,
                    missing.join(", ")
                );
            }

            for (key, value) in metrics.iter() {
                let gauge = GaugeValue {
                    plugin: &self.plugin,
                    type_instance: key,
                    value,
                };
                match self.publisher.publish(&gauge).await {
                    Ok(()) => {
                        verbose!(self.verbose, "Sent value: {} {}", key, value);
                        summary.dispatched += 1;
                    }
                    Err(e) => {
                        error!("Publish failed for '{}/{}': {}", name, key, e);
                        summary.failed_publishes += 1;
                    }
                }
            }

            debug!("Collected {} values from '{}'", metrics.len(), name);
        }

        summary
    }

    /// Runs ticks at the configured interval, forever.
    pub async fn run(self) -> ! {
        let interval = Duration::from_secs(self.config.collectors.collection_interval);
        info!(
            "Metrics collection started (interval: {}s, collectors: {})",
            self.config.collectors.collection_interval,
            self.collectors.len()
        );
        if self.collectors.is_empty() {
            warn!("No collectors resolved, ticks will publish nothing");
        }

        loop {
            let start = Instant::now();
            let summary = self.tick().await;
            debug!("Tick finished: {:?}", summary);

            let elapsed = start.elapsed();
            if elapsed < interval {
                sleep(interval - elapsed).await;
            } else {
                warn!(
                    "Tick took {:?}, longer than the {:?} interval",
                    elapsed, interval
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tracing_test::traced_test;

    use super::*;
    use crate::{
        config::{metrics::CollectorsConfig, rabbitmq::RabbitmqConfig},
        core::{
            collectors::{
                error::CollectorError,
                types::{CollectorResult, MetricSet},
            },
            publisher::{tests::SharedBuf, CollectdPublisher, PublishError},
        },
    };

    #[derive(Default)]
    struct MockPublisher {
        sent: Mutex<Vec<(String, String, i64)>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Publisher for MockPublisher {
        async fn publish(&self, value: &GaugeValue<'_>) -> Result<(), PublishError> {
            if self.fail {
                return Err(PublishError::Poisoned);
            }
            self.sent.lock().unwrap().push((
                value.plugin.to_string(),
                value.type_instance.to_string(),
                value.value,
            ));
            Ok(())
        }
    }

    impl MockPublisher {
        fn sent(&self) -> Vec<(String, String, i64)> {
            self.sent.lock().unwrap().clone()
        }
    }

    struct StaticCollector;

    #[async_trait::async_trait]
    impl DataProducer for StaticCollector {
        fn name(&self) -> &'static str {
            "static"
        }

        fn expected_keys(&self) -> Vec<&'static str> {
            vec!["memory", "uptime", "disk_space"]
        }

        async fn produce(&self) -> CollectorResult<MetricSet> {
            let mut set = MetricSet::new();
            set.insert("memory", 4096);
            set.insert("uptime", 12);
            Ok(set)
        }
    }

    struct BrokenCollector;

    #[async_trait::async_trait]
    impl DataProducer for BrokenCollector {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn expected_keys(&self) -> Vec<&'static str> {
            vec!["memory"]
        }

        async fn produce(&self) -> CollectorResult<MetricSet> {
            Err(CollectorError::CommandExecution {
                command: "/missing/rabbitmqctl".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        }
    }

    fn metrics_config(enabled: &[&str], interval: u64) -> Arc<MetricsConfig> {
        Arc::new(MetricsConfig {
            collectors: CollectorsConfig {
                enabled: enabled.iter().map(|s| s.to_string()).collect(),
                collection_interval: interval,
                ..Default::default()
            },
        })
    }

    #[tokio::test]
    #[traced_test]
    async fn test_tick_dispatches_every_value() {
        let publisher = Arc::new(MockPublisher::default());
        let executor = Executor::with_collectors(
            vec![Arc::new(StaticCollector)],
            publisher.clone(),
            metrics_config(&["static"], 1),
            "rabbitmq",
            true,
        );

        let summary = executor.tick().await;

        assert_eq!(summary.dispatched, 2);
        assert_eq!(
            publisher.sent(),
            vec![
                ("rabbitmq".to_string(), "memory".to_string(), 4096),
                ("rabbitmq".to_string(), "uptime".to_string(), 12),
            ]
        );
        assert!(logs_contain("missing: disk_space"));
        assert!(logs_contain("Sent value: memory 4096"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_failed_collector_does_not_stop_tick() {
        let publisher = Arc::new(MockPublisher::default());
        let executor = Executor::with_collectors(
            vec![Arc::new(BrokenCollector), Arc::new(StaticCollector)],
            publisher.clone(),
            metrics_config(&["broken", "static"], 1),
            "rabbitmq",
            false,
        );

        let summary = executor.tick().await;

        assert_eq!(summary.failed_collectors, 1);
        assert_eq!(summary.dispatched, 2);
        assert!(logs_contain("Failed to collect from 'broken'"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_publish_errors_are_counted() {
        let publisher = Arc::new(MockPublisher {
            fail: true,
            ..Default::default()
        });
        let executor = Executor::with_collectors(
            vec![Arc::new(StaticCollector)],
            publisher,
            metrics_config(&["static"], 1),
            "rabbitmq",
            false,
        );

        let summary = executor.tick().await;

        assert_eq!(summary.dispatched, 0);
        assert_eq!(summary.failed_publishes, 2);
        assert!(logs_contain("Publish failed"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_unknown_collector_skipped() {
        let registry = CollectorRegistry::new(&RabbitmqConfig::default());
        let executor = Executor::new(
            &registry,
            Arc::new(MockPublisher::default()),
            metrics_config(&["report", "non_existent_collector_123"], 1),
            "rabbitmq",
            false,
        );

        assert_eq!(executor.collector_count(), 1);
        assert!(logs_contain(
            "Collector 'non_existent_collector_123' not found"
        ));
    }

    #[tokio::test]
    async fn test_missing_rabbitmqctl_dispatches_nothing() {
        let registry = CollectorRegistry::new(&RabbitmqConfig {
            ctl_path: "/nonexistent/sbin/rabbitmqctl".into(),
            ..Default::default()
        });
        let publisher = Arc::new(MockPublisher::default());
        let executor = Executor::new(
            &registry,
            publisher.clone(),
            metrics_config(&["status"], 1),
            "rabbitmq",
            false,
        );

        let summary = executor.tick().await;

        assert_eq!(summary.failed_collectors, 1);
        assert!(publisher.sent().is_empty());
    }

    #[tokio::test]
    async fn test_end_to_end_collectd_output() {
        let config = RabbitmqConfig {
            ctl_path: "/bin/sh".into(),
            args: vec![
                "-c".into(),
                "printf '%s' \"$0\"".into(),
                "Status of node rabbit@mq01 ...\n[{disk_free,1000},{uptime,5}]\n\nConnections:\na\n\n"
                    .into(),
            ],
            ..Default::default()
        };
        let registry = CollectorRegistry::new(&config);
        let buf = SharedBuf::default();
        let publisher = Arc::new(CollectdPublisher::new("mq01", 10, Box::new(buf.clone())));
        let executor = Executor::new(
            &registry,
            publisher,
            metrics_config(&["report"], 10),
            "rabbitmq",
            false,
        );

        let summary = executor.tick().await;

        assert_eq!(summary.dispatched, 3);
        assert_eq!(
            buf.contents(),
            "PUTVAL \"mq01/rabbitmq/gauge-connections_count\" interval=10 N:1\n\
             PUTVAL \"mq01/rabbitmq/gauge-disk_space\" interval=10 N:1000\n\
             PUTVAL \"mq01/rabbitmq/gauge-uptime\" interval=10 N:5\n"
        );
    }

    #[tokio::test]
    async fn test_run_keeps_ticking() {
        let publisher = Arc::new(MockPublisher::default());
        let executor = Executor::with_collectors(
            vec![Arc::new(StaticCollector)],
            publisher.clone(),
            metrics_config(&["static"], 1),
            "rabbitmq",
            false,
        );

        let handle = tokio::spawn(async move {
            executor.run().await;
        });

        sleep(Duration::from_millis(1500)).await;
        handle.abort();

        // One tick at start, one after the first interval.
        assert!(publisher.sent().len() >= 4);
    }
}
