use std::{collections::BTreeMap, sync::Arc};

use super::{error::CollectorError, traits::DataProducer, types::CollectorResult};
use crate::config::rabbitmq::RabbitmqConfig;

/// Builds a collector from the rabbitmqctl configuration.
pub type CollectorFactory = fn(&RabbitmqConfig) -> Arc<dyn DataProducer>;

/// A collector submitted to the global inventory at compile time.
pub struct CollectorMeta {
    pub name: &'static str,
    pub factory: CollectorFactory,
}

inventory::collect!(CollectorMeta);

/// Every collector compiled into the binary, instantiated against one
/// configuration.
pub struct CollectorRegistry {
    collectors: BTreeMap<&'static str, Arc<dyn DataProducer>>,
}

impl CollectorRegistry {
    /// Instantiates each submitted collector with `config`.
    pub fn new(config: &RabbitmqConfig) -> Self {
        let mut collectors = BTreeMap::new();

        for meta in inventory::iter::<CollectorMeta> {
            collectors.insert(meta.name, (meta.factory)(config));
        }

        CollectorRegistry { collectors }
    }

    /// Retrieves a collector by name.
    pub fn get(&self, name: &str) -> CollectorResult<Arc<dyn DataProducer>> {
        self.collectors
            .get(name)
            .cloned()
            .ok_or_else(|| CollectorError::CollectorNotFound(name.to_string()))
    }

    /// Registered collector names, sorted.
    pub fn list_names(&self) -> Vec<&'static str> {
        self.collectors.keys().copied().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.collectors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }
}

/// Registers a collector factory with the global inventory.
///
/// ```ignore
/// register_collector!("status", |config| RabbitmqCollector::from_config(Subcommand::Status, config));
/// ```
#[macro_export]
macro_rules! register_collector {
    ($name:expr, $factory:expr) => {
        inventory::submit! {
            $crate::core::collectors::registry::CollectorMeta {
                name: $name,
                factory: |config: &$crate::config::rabbitmq::RabbitmqConfig| {
                    std::sync::Arc::new(($factory)(config))
                        as std::sync::Arc<dyn $crate::core::collectors::traits::DataProducer>
                },
            }
        }
    };
}
