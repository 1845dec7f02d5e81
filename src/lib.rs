//! rabbitbee: RabbitMQ metrics collector for collectd
//!
//! Periodically runs `rabbitmqctl status` or `rabbitmqctl report`, parses the
//! loosely structured text it prints into a fixed set of integer gauges and
//! writes them to stdout, either in the collectd exec plugin protocol or as
//! JSON lines.
//!
//! ## Modules
//!
//! * `config`: TOML configuration with `validator` checks and defaults.
//!
//! * `core`: Runtime components:
//!   - rabbitmqctl invocation, report parsing and metric extraction
//!   - collector registry and the `DataProducer` trait
//!   - the collection executor
//!   - publishers (collectd `PUTVAL`, JSON)
//!
//! * `logger`: `tracing` subscriber setup for stderr and journald.

pub mod config;
pub mod core;
pub mod logger;
