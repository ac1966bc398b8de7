use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use serde_with::serde_as;

use crate::Result;
use crate::error::ConfigError;
use crate::types::RequestKind;

use super::defaults::{
    default_backoff, default_bucket_name, default_capacity, default_idle_for, default_pace,
    default_poll_wait, default_process_for, default_request_kind, default_scale_down_at,
    default_scale_up_at, default_tick, default_worker_max, default_worker_min,
};
use super::env::{env_duration, env_parse, env_string};
use super::{
    BucketSettings, Config, HumantimeDuration, ProducerSettings, ScalingSettings,
    WORKER_MAX_BOUNDS, WorkerSettings,
};

pub(super) fn load(path: impl AsRef<Path>) -> std::result::Result<RawConfig, ConfigError> {
    let mut builder = ::config::Config::builder();
    let path = path.as_ref();
    builder = builder.add_source(::config::File::from(path).required(false));
    builder = builder.add_source(
        ::config::Environment::with_prefix("BUCKETSIM")
            .separator("__")
            .try_parsing(true),
    );

    builder
        .build()
        .map_err(|err| ConfigError::Other(err.to_string()))?
        .try_deserialize()
        .map_err(|err| ConfigError::Parse(err.to_string()))
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub(super) bucket: RawBucket,
    #[serde(default)]
    pub(super) producer: RawProducer,
    #[serde(default)]
    pub(super) worker: RawWorker,
    #[serde(default)]
    pub(super) scaling: RawScaling,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawBucket {
    #[serde(default = "default_bucket_name")]
    pub(super) name: String,
    #[serde(default = "default_capacity")]
    pub(super) capacity: usize,
    #[serde(default = "default_worker_min")]
    pub(super) worker_min: usize,
    #[serde(default = "default_worker_max")]
    pub(super) worker_max: usize,
    #[serde(default)]
    pub(super) prefill: usize,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawProducer {
    #[serde(default = "default_request_kind")]
    pub(super) kind: String,
    #[serde(default = "default_pace")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) pace: Duration,
    #[serde(default = "default_backoff")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) backoff: Duration,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawWorker {
    #[serde(default = "default_poll_wait")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) poll_wait: Duration,
    #[serde(default = "default_process_for")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) process_for: Duration,
    #[serde(default = "default_idle_for")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) idle_for: Duration,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawScaling {
    #[serde(default = "default_scale_up_at")]
    pub(super) scale_up_at: f64,
    #[serde(default = "default_scale_down_at")]
    pub(super) scale_down_at: f64,
    #[serde(default = "default_tick")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) tick: Duration,
}

impl RawConfig {
    pub(super) fn apply_env_overrides(&mut self) -> std::result::Result<(), ConfigError> {
        if let Some(name) = env_string("BUCKET_NAME")? {
            self.bucket.name = name;
        }
        if let Some(capacity) = env_parse::<usize>("BUCKET_CAPACITY")? {
            self.bucket.capacity = capacity;
        }
        if let Some(worker_min) = env_parse::<usize>("WORKER_MIN")? {
            self.bucket.worker_min = worker_min;
        }
        if let Some(worker_max) = env_parse::<usize>("WORKER_MAX")? {
            self.bucket.worker_max = worker_max;
        }
        if let Some(prefill) = env_parse::<usize>("BUCKET_PREFILL")? {
            self.bucket.prefill = prefill;
        }
        if let Some(kind) = env_string("REQUEST_KIND")? {
            self.producer.kind = kind;
        }
        if let Some(pace) = env_duration("PRODUCER_PACE")? {
            self.producer.pace = pace;
        }
        if let Some(backoff) = env_duration("PRODUCER_BACKOFF")? {
            self.producer.backoff = backoff;
        }
        if let Some(poll_wait) = env_duration("WORKER_POLL_WAIT")? {
            self.worker.poll_wait = poll_wait;
        }
        if let Some(process_for) = env_duration("WORKER_PROCESS_FOR")? {
            self.worker.process_for = process_for;
        }
        if let Some(idle_for) = env_duration("WORKER_IDLE_FOR")? {
            self.worker.idle_for = idle_for;
        }
        if let Some(scale_up_at) = env_parse::<f64>("SCALE_UP_AT")? {
            self.scaling.scale_up_at = scale_up_at;
        }
        if let Some(scale_down_at) = env_parse::<f64>("SCALE_DOWN_AT")? {
            self.scaling.scale_down_at = scale_down_at;
        }
        if let Some(tick) = env_duration("SCALING_TICK")? {
            self.scaling.tick = tick;
        }
        Ok(())
    }

    pub(super) fn validate_and_build(self) -> Result<Config> {
        if self.bucket.capacity == 0 {
            return Err(ConfigError::InvalidField {
                field: "bucket.capacity",
                message: "capacity must be greater than zero".to_string(),
            }
            .into());
        }
        if self.bucket.worker_min == 0 {
            return Err(ConfigError::InvalidField {
                field: "bucket.worker_min",
                message: "the pool must keep at least one worker".to_string(),
            }
            .into());
        }
        if !WORKER_MAX_BOUNDS.contains(&self.bucket.worker_max) {
            return Err(ConfigError::InvalidField {
                field: "bucket.worker_max",
                message: format!(
                    "expected between {} and {}, got {}",
                    WORKER_MAX_BOUNDS.start(),
                    WORKER_MAX_BOUNDS.end(),
                    self.bucket.worker_max
                ),
            }
            .into());
        }
        if self.bucket.worker_min > self.bucket.worker_max {
            return Err(ConfigError::InvalidField {
                field: "bucket.worker_min",
                message: format!(
                    "minimum {} exceeds maximum {}",
                    self.bucket.worker_min, self.bucket.worker_max
                ),
            }
            .into());
        }
        if self.bucket.prefill > self.bucket.capacity {
            return Err(ConfigError::InvalidField {
                field: "bucket.prefill",
                message: format!(
                    "prefill {} exceeds capacity {}",
                    self.bucket.prefill, self.bucket.capacity
                ),
            }
            .into());
        }

        let kind = RequestKind::from_str(&self.producer.kind).map_err(|err| {
            ConfigError::InvalidField {
                field: "producer.kind",
                message: err,
            }
        })?;
        if self.producer.pace.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "producer.pace",
                message: "pace must be greater than zero".to_string(),
            }
            .into());
        }
        if self.producer.backoff.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "producer.backoff",
                message: "backoff must be greater than zero".to_string(),
            }
            .into());
        }

        if self.worker.poll_wait.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "worker.poll_wait",
                message: "poll wait must be greater than zero".to_string(),
            }
            .into());
        }
        if self.worker.process_for.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "worker.process_for",
                message: "processing duration must be greater than zero".to_string(),
            }
            .into());
        }
        if self.worker.idle_for.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "worker.idle_for",
                message: "idle duration must be greater than zero".to_string(),
            }
            .into());
        }

        if !(self.scaling.scale_up_at > 0.0 && self.scaling.scale_up_at <= 1.0) {
            return Err(ConfigError::InvalidField {
                field: "scaling.scale_up_at",
                message: "threshold must be within (0, 1]".to_string(),
            }
            .into());
        }
        if self.scaling.scale_down_at <= 0.0 {
            return Err(ConfigError::InvalidField {
                field: "scaling.scale_down_at",
                message: "threshold must be greater than zero".to_string(),
            }
            .into());
        }
        if self.scaling.scale_down_at >= self.scaling.scale_up_at {
            return Err(ConfigError::InvalidField {
                field: "scaling.scale_down_at",
                message: "scale-down threshold must sit below scale-up threshold".to_string(),
            }
            .into());
        }
        if self.scaling.tick.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "scaling.tick",
                message: "tick must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(Config {
            bucket: BucketSettings {
                name: self.bucket.name,
                capacity: self.bucket.capacity,
                worker_min: self.bucket.worker_min,
                worker_max: self.bucket.worker_max,
                prefill: self.bucket.prefill,
            },
            producer: ProducerSettings {
                kind,
                pace: self.producer.pace,
                backoff: self.producer.backoff,
            },
            worker: WorkerSettings {
                poll_wait: self.worker.poll_wait,
                process_for: self.worker.process_for,
                idle_for: self.worker.idle_for,
            },
            scaling: ScalingSettings {
                scale_up_at: self.scaling.scale_up_at,
                scale_down_at: self.scaling.scale_down_at,
                tick: self.scaling.tick,
            },
        })
    }
}

impl Default for RawBucket {
    fn default() -> Self {
        Self {
            name: default_bucket_name(),
            capacity: default_capacity(),
            worker_min: default_worker_min(),
            worker_max: default_worker_max(),
            prefill: 0,
        }
    }
}

impl Default for RawProducer {
    fn default() -> Self {
        Self {
            kind: default_request_kind(),
            pace: default_pace(),
            backoff: default_backoff(),
        }
    }
}

impl Default for RawWorker {
    fn default() -> Self {
        Self {
            poll_wait: default_poll_wait(),
            process_for: default_process_for(),
            idle_for: default_idle_for(),
        }
    }
}

impl Default for RawScaling {
    fn default() -> Self {
        Self {
            scale_up_at: default_scale_up_at(),
            scale_down_at: default_scale_down_at(),
            tick: default_tick(),
        }
    }
}
