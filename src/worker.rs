use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::info;

use crate::bucket::{Bucket, Dequeue};
use crate::config::WorkerSettings;

/// Handle to a live worker, held in the controller's roster.
///
/// The stop signal is single-use and buffered: sending never blocks, and
/// a signal sent while the worker is mid-request takes effect at its next
/// loop iteration.
pub struct Worker {
    name: String,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl Worker {
    /// Spawns a worker task consuming from `bucket` and returns its handle.
    #[must_use]
    pub fn spawn(name: String, bucket: Bucket, settings: WorkerSettings) -> Self {
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(run(name.clone(), bucket, settings, stop_rx));
        Self {
            name,
            stop: Some(stop_tx),
            task,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signals the worker to stop. Idempotent; signalling a worker that
    /// already exited is a no-op.
    pub fn signal_stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    /// Signals the worker and hands back its task for joining.
    #[must_use]
    pub fn stop(mut self) -> JoinHandle<()> {
        self.signal_stop();
        self.task
    }
}

/// Worker loop. Each iteration races, in priority order: the stop signal,
/// a bounded wait for the queue head, and only then the idle backoff.
/// A request that has been dequeued is always processed to completion;
/// the stop signal is re-checked afterwards, before any further dequeue.
async fn run(
    name: String,
    bucket: Bucket,
    settings: WorkerSettings,
    mut stop: oneshot::Receiver<()>,
) {
    info!(worker = %name, bucket = %bucket.name(), "worker spawned");
    loop {
        tokio::select! {
            biased;
            // A dropped sender counts as a stop as well.
            _ = &mut stop => {
                info!(worker = %name, "worker stopped");
                return;
            }
            outcome = bucket.dequeue_or_wait(settings.poll_wait) => match outcome {
                Dequeue::Item(request) => {
                    info!(
                        worker = %name,
                        kind = %request.kind,
                        queued_ms = request.age().as_millis(),
                        "processing request"
                    );
                    sleep(settings.process_for).await;
                }
                Dequeue::Empty => {
                    info!(worker = %name, idle_for = ?settings.idle_for, "queue empty; worker idling");
                    tokio::select! {
                        biased;
                        _ = &mut stop => {
                            info!(worker = %name, "worker stopped");
                            return;
                        }
                        () = sleep(settings.idle_for) => {}
                    }
                }
                Dequeue::Closed => {
                    info!(worker = %name, "bucket closed; worker exiting");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Worker;
    use crate::bucket::Bucket;
    use crate::config::WorkerSettings;
    use crate::types::{Request, RequestKind};
    use std::time::Duration;
    use tokio::time::sleep;

    fn settings() -> WorkerSettings {
        WorkerSettings {
            poll_wait: Duration::from_millis(250),
            process_for: Duration::from_millis(750),
            idle_for: Duration::from_secs(10),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn pending_stop_wins_over_ready_request() {
        let bucket = Bucket::new("test", 4, 1, 4);
        bucket.try_enqueue(Request::new(RequestKind::Html)).unwrap();

        // Signal before the task gets its first poll: the biased select
        // must observe the stop and exit without touching the queue.
        let worker = Worker::spawn("worker-1".into(), bucket.clone(), settings());
        worker.stop().await.unwrap();

        assert_eq!(bucket.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn finishes_in_flight_request_then_stops() {
        let bucket = Bucket::new("test", 4, 1, 4);
        bucket.try_enqueue(Request::new(RequestKind::Html)).unwrap();

        let mut worker = Worker::spawn("worker-1".into(), bucket.clone(), settings());

        // Let the worker dequeue and start processing.
        while !bucket.is_empty() {
            tokio::task::yield_now().await;
        }

        // Stop lands mid-processing; the queued follow-up must never be
        // dequeued.
        worker.signal_stop();
        bucket.try_enqueue(Request::new(RequestKind::Api)).unwrap();

        worker.stop().await.unwrap();
        assert_eq!(bucket.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn idles_on_empty_queue_instead_of_polling() {
        let bucket = Bucket::new("test", 4, 1, 4);
        let worker = Worker::spawn("worker-1".into(), bucket.clone(), settings());

        // Past the bounded wait, the worker is in its 10s idle backoff.
        sleep(Duration::from_millis(300)).await;
        bucket.try_enqueue(Request::new(RequestKind::Html)).unwrap();

        // Well within the backoff the request is still untouched.
        sleep(Duration::from_secs(1)).await;
        assert_eq!(bucket.len(), 1);

        // Once the backoff elapses the worker picks it up.
        sleep(Duration::from_secs(10)).await;
        assert!(bucket.is_empty());

        worker.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn drains_remaining_requests_after_close() {
        let bucket = Bucket::new("test", 4, 1, 4);
        bucket.try_enqueue(Request::new(RequestKind::Html)).unwrap();
        bucket.try_enqueue(Request::new(RequestKind::Api)).unwrap();
        bucket.close();

        let worker = Worker::spawn("worker-1".into(), bucket.clone(), settings());

        // The task exits on its own once the queue is drained.
        worker.task.await.unwrap();
        assert!(bucket.is_empty());
    }
}
