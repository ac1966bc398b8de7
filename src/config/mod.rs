use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

use crate::Result;
use crate::error::Error as SimError;
use crate::types::RequestKind;

mod defaults;
mod env;
mod raw;
mod serde;

pub(crate) use self::serde::HumantimeDuration;

const WORKER_MAX_BOUNDS: RangeInclusive<usize> = 1..=64;

#[derive(Debug, Clone)]
pub struct Config {
    pub bucket: BucketSettings,
    pub producer: ProducerSettings,
    pub worker: WorkerSettings,
    pub scaling: ScalingSettings,
}

/// Identity and bounds of the one global bucket. Fixed for the process
/// lifetime.
#[derive(Debug, Clone)]
pub struct BucketSettings {
    pub name: String,
    pub capacity: usize,
    pub worker_min: usize,
    pub worker_max: usize,
    /// Requests pre-loaded into the queue before the simulation starts.
    pub prefill: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ProducerSettings {
    pub kind: RequestKind,
    /// Pause between accepted arrivals.
    pub pace: Duration,
    /// Longer pause after a drop, while the queue is saturated.
    pub backoff: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct WorkerSettings {
    /// Bounded wait on the queue before treating it as empty.
    pub poll_wait: Duration,
    /// Simulated per-request service time.
    pub process_for: Duration,
    /// Idle backoff once the queue has drained.
    pub idle_for: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct ScalingSettings {
    /// Fill ratio at or above which one worker is added.
    pub scale_up_at: f64,
    /// Fill ratio below which one worker is removed.
    pub scale_down_at: f64,
    /// Pause between controller evaluations.
    pub tick: Duration,
}

impl Config {
    /// Load configuration from a file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration file cannot be parsed,
    /// when environment overrides are invalid, or when the resulting
    /// values fail validation.
    pub fn from_env_and_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut raw = raw::load(path).map_err(SimError::from)?;
        raw.apply_env_overrides().map_err(SimError::from)?;
        raw.validate_and_build()
    }
}
