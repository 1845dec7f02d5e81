use std::{
    process,
    sync::{Arc, OnceLock},
};

use rabbitbee::{
    config::Config,
    core::{collectors::registry::CollectorRegistry, executor::Executor, publisher},
    logger::LoggerManager,
    print_error,
};
use tracing::{debug, error, info};

static CONFIG: OnceLock<Config> = OnceLock::new();

pub fn config() -> &'static Config {
    CONFIG.get_or_init(|| {
        Config::new().unwrap_or_else(|e| {
            print_error!("{}", e);
            process::exit(1);
        })
    })
}

fn log_collectors_table(enabled: &[&str], available: &[&str]) {
    use std::collections::BTreeSet;

    let all_names: BTreeSet<&str> = enabled.iter().chain(available.iter()).copied().collect();

    let name_width = all_names
        .iter()
        .map(|s| s.len())
        .max()
        .unwrap_or(10)
        .max("Collector".len());

    info!("{:<width$} | Status", "Collector", width = name_width);
    info!("{}-+-{}", "-".repeat(name_width), "-".repeat(12));

    for name in all_names {
        let status = match (enabled.contains(&name), available.contains(&name)) {
            (true, true) => "ENABLED",
            (true, false) => "ENABLED (missing)",
            (false, true) => "DISABLED",
            (false, false) => "UNKNOWN",
        };
        info!("{:<width$} | {}", name, status, width = name_width);
    }
}

#[tokio::main]
async fn main() {
    let cfg = config();
    let mut logger_manager = LoggerManager::new(cfg.logger.clone()).unwrap_or_else(|e| {
        print_error!("Failed to setup Log Manager: {}", e);
        process::exit(1);
    });
    logger_manager.init().unwrap_or_else(|e| {
        print_error!("Failed to init Log Manager: {}", e);
        process::exit(1);
    });
    info!("Starting rabbitbee version {}...", env!("CARGO_PKG_VERSION"));
    info!("Log level: {}", cfg.logger.level);
    debug!("{:#?}", cfg.rabbitmq);

    let registry = CollectorRegistry::new(&cfg.rabbitmq);
    log_collectors_table(
        &cfg.metrics.collectors.enabled_names(),
        &registry.list_names(),
    );

    if !cfg.rabbitmq.ctl_path.exists() {
        error!(
            "rabbitmqctl not found at {}, collection will fail until it is installed",
            cfg.rabbitmq.ctl_path.display()
        );
    }

    let publisher = publisher::from_config(&cfg.sink, cfg.metrics.collectors.collection_interval);
    let executor = Executor::new(
        &registry,
        publisher,
        Arc::new(cfg.metrics.clone()),
        cfg.sink.plugin.clone(),
        cfg.rabbitmq.verbose,
    );

    if cfg.metrics.collectors.oneshot {
        let summary = executor.tick().await;
        info!("Single collection finished: {:?}", summary);
        if summary.failed_collectors > 0 {
            process::exit(1);
        }
        return;
    }

    info!("Starting metrics collection executor...");

    tokio::select! {
        _ = executor.run() => {
            error!("Executor unexpectedly finished");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }
}
