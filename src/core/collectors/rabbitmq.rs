use super::{
    command::CommandRunner,
    extractor::{self, MetricRow},
    report::ReportParser,
    traits::DataProducer,
    types::{CollectorResult, MetricSet, Subcommand},
};
use crate::{config::rabbitmq::RabbitmqConfig, register_collector, verbose};

/// Collector backed by one rabbitmqctl subcommand.
#[derive(Debug, Clone)]
pub struct RabbitmqCollector {
    subcommand: Subcommand,
    runner: CommandRunner,
    verbose: bool,
}

impl RabbitmqCollector {
    pub fn new(subcommand: Subcommand, runner: CommandRunner, verbose: bool) -> Self {
        Self {
            subcommand,
            runner,
            verbose,
        }
    }

    pub fn from_config(subcommand: Subcommand, config: &RabbitmqConfig) -> Self {
        let runner = CommandRunner::new(&config.ctl_path)
            .with_args(config.args.clone())
            .with_timeout(config.timeout());
        Self::new(subcommand, runner, config.verbose)
    }

    pub fn subcommand(&self) -> Subcommand {
        self.subcommand
    }

    fn rows(&self) -> &'static [MetricRow] {
        extractor::table(self.subcommand)
    }
}

#[async_trait::async_trait]
impl DataProducer for RabbitmqCollector {
    fn name(&self) -> &'static str {
        self.subcommand.as_str()
    }

    fn expected_keys(&self) -> Vec<&'static str> {
        self.rows().iter().map(|row| row.key).collect()
    }

    async fn produce(&self) -> CollectorResult<MetricSet> {
        let report = self.runner.run(self.subcommand).await?;
        let parser = ReportParser::new(&report);
        let extraction = extractor::extract(&parser, self.rows());

        for (key, err) in &extraction.skipped {
            verbose!(self.verbose, "Skipping {}: {}", key, err);
        }

        Ok(extraction.metrics)
    }
}

register_collector!("status", |config| RabbitmqCollector::from_config(
    Subcommand::Status,
    config
));
register_collector!("report", |config| RabbitmqCollector::from_config(
    Subcommand::Report,
    config
));
