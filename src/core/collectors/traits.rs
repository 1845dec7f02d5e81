use super::types::{CollectorResult, MetricSet};

/// Contract for every metric collector.
///
/// A collector performs one complete collection per call: it invokes its
/// source, parses it and returns the resolved metrics. It holds no state
/// between calls, so concurrent calls are independent.
#[async_trait::async_trait]
pub trait DataProducer: Send + Sync + 'static {
    /// Name under which the collector is registered.
    fn name(&self) -> &'static str;

    /// Metric keys this collector can produce, in table order.
    fn expected_keys(&self) -> Vec<&'static str>;

    /// Runs one collection.
    ///
    /// Errors are tick-level (the source could not be read at all).
    /// Individual metrics that cannot be resolved are left out of the set.
    async fn produce(&self) -> CollectorResult<MetricSet>;
}
