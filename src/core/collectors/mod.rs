//! RabbitMQ collector pipeline.
//!
//! * `command` runs rabbitmqctl and captures its output.
//! * `report` tokenizes that output and answers field and section queries.
//! * `extractor` maps the fixed metric tables onto a parsed report.
//! * `rabbitmq` ties the three together as a registered [`DataProducer`].

pub mod command;
pub mod error;
pub mod extractor;
pub mod rabbitmq;
pub mod registry;
pub mod report;
pub mod traits;
pub mod types;

pub use command::CommandRunner;
pub use error::CollectorError;
pub use extractor::{Extraction, Lookup, MetricRow, REPORT_TABLE};
pub use rabbitmq::RabbitmqCollector;
pub use registry::CollectorRegistry;
pub use report::ReportParser;
pub use traits::DataProducer;
pub use types::{CollectorResult, MetricSet, RawReport, Subcommand};
