use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::bucket::Bucket;
use crate::config::{ScalingSettings, WorkerSettings};
use crate::worker::Worker;

/// Outcome of one scaling evaluation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScaleAction {
    None,
    ScaledUp { worker: String },
    ScaledDown { worker: String },
}

/// Elastic sizing of the worker pool draining one bucket.
///
/// The roster is single-writer: only the controller appends or removes
/// entries. Workers are handed a clone of the bucket, never the roster.
pub struct PoolController {
    bucket: Bucket,
    scaling: ScalingSettings,
    worker_settings: WorkerSettings,
    roster: Vec<Worker>,
    retiring: Vec<JoinHandle<()>>,
    spawned: usize,
}

impl PoolController {
    #[must_use]
    pub fn new(bucket: Bucket, scaling: ScalingSettings, worker_settings: WorkerSettings) -> Self {
        Self {
            bucket,
            scaling,
            worker_settings,
            roster: Vec::new(),
            retiring: Vec::new(),
            spawned: 0,
        }
    }

    #[must_use]
    pub fn roster_len(&self) -> usize {
        self.roster.len()
    }

    /// Brings the pool up to the bucket's minimum. Called once at startup.
    pub fn spawn_initial(&mut self) {
        while self.roster.len() < self.bucket.worker_min() {
            self.spawn_worker();
        }
    }

    /// One scaling evaluation: at most one spawn or one removal.
    ///
    /// Scale-up fires when less than 10% of capacity is free (fill ratio
    /// at or above the threshold) and the pool is below its maximum.
    /// Scale-down fires when fill drops below the lower threshold and the
    /// pool is above its minimum; the most recently added worker is
    /// signalled and removed from the roster without waiting for its task
    /// to finish.
    pub fn evaluate_once(&mut self) -> ScaleAction {
        let fill = self.bucket.fill_ratio();

        if fill >= self.scaling.scale_up_at && self.roster.len() < self.bucket.worker_max() {
            let name = self.spawn_worker();
            info!(
                bucket = %self.bucket.name(),
                queued = self.bucket.len(),
                pool = self.roster.len(),
                worker = %name,
                "scaling up: worker spawned"
            );
            return ScaleAction::ScaledUp { worker: name };
        }

        if fill < self.scaling.scale_down_at && self.roster.len() > self.bucket.worker_min() {
            let Some(worker) = self.roster.pop() else {
                return ScaleAction::None;
            };
            let name = worker.name().to_string();
            self.retiring.push(worker.stop());
            info!(
                bucket = %self.bucket.name(),
                queued = self.bucket.len(),
                pool = self.roster.len(),
                worker = %name,
                "scaling down: worker removed"
            );
            return ScaleAction::ScaledDown { worker: name };
        }

        ScaleAction::None
    }

    /// Signals every remaining worker and waits for all of them, including
    /// workers removed earlier whose tasks were still winding down.
    pub async fn shutdown(mut self) {
        for worker in self.roster.drain(..) {
            self.retiring.push(worker.stop());
        }
        for task in self.retiring {
            if let Err(err) = task.await {
                warn!(error = %err, "worker task terminated unexpectedly");
            }
        }
    }

    fn spawn_worker(&mut self) -> String {
        self.spawned += 1;
        let name = format!("worker-{}", self.spawned);
        let worker = Worker::spawn(name.clone(), self.bucket.clone(), self.worker_settings);
        self.roster.push(worker);
        name
    }
}
