use std::path::PathBuf;

use bucketsim::Result;
use bucketsim::bucket::Bucket;
use bucketsim::config::Config;
use bucketsim::controller::PoolController;
use bucketsim::error::{ConfigError, Error as SimError};
use bucketsim::producer::run_producer;
use bucketsim::telemetry::init_tracing;
use bucketsim::types::Request;
use tokio::signal;
use tokio::time::{Instant, sleep, sleep_until};
use tracing::{info, warn};

use super::cli::Cli;

const DEFAULT_CONFIG: &str = "config.toml";

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.log_filter.as_deref(), cli.json_logs)?;

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let mut config = Config::from_env_and_file(&config_path)?;

    if let Some(capacity) = cli.capacity {
        if capacity == 0 {
            return Err(SimError::from(ConfigError::InvalidField {
                field: "cli.capacity",
                message: "capacity must be greater than zero".to_string(),
            }));
        }
        config.bucket.capacity = capacity;
    }
    if let Some(min_workers) = cli.min_workers {
        if min_workers == 0 {
            return Err(SimError::from(ConfigError::InvalidField {
                field: "cli.min_workers",
                message: "the pool must keep at least one worker".to_string(),
            }));
        }
        config.bucket.worker_min = min_workers;
    }
    if let Some(max_workers) = cli.max_workers {
        config.bucket.worker_max = max_workers;
    }
    if let Some(prefill) = cli.prefill {
        config.bucket.prefill = prefill;
    }
    if config.bucket.worker_min > config.bucket.worker_max {
        return Err(SimError::from(ConfigError::InvalidField {
            field: "cli.min_workers",
            message: format!(
                "minimum {} exceeds maximum {}",
                config.bucket.worker_min, config.bucket.worker_max
            ),
        }));
    }
    if config.bucket.prefill > config.bucket.capacity {
        return Err(SimError::from(ConfigError::InvalidField {
            field: "cli.prefill",
            message: format!(
                "prefill {} exceeds capacity {}",
                config.bucket.prefill, config.bucket.capacity
            ),
        }));
    }

    let bucket = Bucket::new(
        config.bucket.name.clone(),
        config.bucket.capacity,
        config.bucket.worker_min,
        config.bucket.worker_max,
    );
    for _ in 0..config.bucket.prefill {
        if bucket.try_enqueue(Request::new(config.producer.kind)).is_err() {
            break;
        }
    }
    info!(
        bucket = %bucket.name(),
        capacity = bucket.capacity(),
        prefill = bucket.len(),
        worker_min = bucket.worker_min(),
        worker_max = bucket.worker_max(),
        "bucket initialized"
    );

    let mut controller = PoolController::new(bucket.clone(), config.scaling, config.worker);
    controller.spawn_initial();

    let producer = tokio::spawn(run_producer(bucket.clone(), config.producer));

    let deadline = cli.run_for.map(|run_for| Instant::now() + run_for);
    loop {
        tokio::select! {
            biased;
            _ = signal::ctrl_c() => {
                info!("shutdown signal received, stopping simulation");
                break;
            }
            () = until(deadline) => {
                info!("run duration elapsed, stopping simulation");
                break;
            }
            () = sleep(config.scaling.tick) => {
                controller.evaluate_once();
            }
        }
    }

    bucket.close();
    if let Err(err) = producer.await {
        warn!(error = %err, "producer task terminated unexpectedly");
    }
    controller.shutdown().await;

    Ok(())
}

async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
