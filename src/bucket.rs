use std::time::Duration;

use async_channel::{Receiver, Sender, TrySendError, bounded};
use tokio::time::timeout;

use crate::types::Request;

/// Outcome of a bounded-wait dequeue.
#[derive(Debug)]
pub enum Dequeue {
    /// Head of the queue, delivered to exactly one consumer.
    Item(Request),
    /// Nothing arrived within the wait.
    Empty,
    /// The bucket is closed and fully drained.
    Closed,
}

/// A leaky bucket: one bounded FIFO queue of pending requests shared by
/// the producer and every worker, plus the pool bounds that apply to it.
/// Clones are cheap and all refer to the same queue.
#[derive(Clone)]
pub struct Bucket {
    name: String,
    capacity: usize,
    worker_min: usize,
    worker_max: usize,
    tx: Sender<Request>,
    rx: Receiver<Request>,
}

impl Bucket {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        capacity: usize,
        worker_min: usize,
        worker_max: usize,
    ) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = bounded(capacity);
        Self {
            name: name.into(),
            capacity,
            worker_min,
            worker_max,
            tx,
            rx,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub const fn worker_min(&self) -> usize {
        self.worker_min
    }

    #[must_use]
    pub const fn worker_max(&self) -> usize {
        self.worker_max
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Current queue length over fixed capacity, in `0.0..=1.0`.
    #[must_use]
    pub fn fill_ratio(&self) -> f64 {
        self.len() as f64 / self.capacity as f64
    }

    /// Non-blocking enqueue: succeeds iff the queue has room at this
    /// moment. `Full` is the drop signal; `Closed` means the simulation
    /// is shutting down.
    ///
    /// # Errors
    ///
    /// Returns the rejected request inside the error so the caller can
    /// still report on it.
    pub fn try_enqueue(&self, request: Request) -> Result<(), TrySendError<Request>> {
        self.tx.try_send(request)
    }

    /// Bounded blocking dequeue used by workers: waits up to `wait` for
    /// the head of the queue.
    pub async fn dequeue_or_wait(&self, wait: Duration) -> Dequeue {
        match timeout(wait, self.rx.recv()).await {
            Ok(Ok(request)) => Dequeue::Item(request),
            Ok(Err(_)) => Dequeue::Closed,
            Err(_) => Dequeue::Empty,
        }
    }

    /// Closes the queue. Further enqueues fail; workers drain whatever
    /// remains and then observe [`Dequeue::Closed`].
    pub fn close(&self) {
        self.tx.close();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::{Bucket, Dequeue};
    use crate::types::{Request, RequestKind};
    use async_channel::TrySendError;
    use std::time::Duration;

    fn bucket(capacity: usize) -> Bucket {
        Bucket::new("test", capacity, 1, 4)
    }

    #[tokio::test]
    async fn rejects_enqueue_when_full() {
        let bucket = bucket(2);
        assert!(bucket.try_enqueue(Request::new(RequestKind::Html)).is_ok());
        assert!(bucket.try_enqueue(Request::new(RequestKind::Html)).is_ok());

        let rejected = bucket.try_enqueue(Request::new(RequestKind::Api));
        assert!(matches!(rejected, Err(TrySendError::Full(_))));
        assert_eq!(bucket.len(), 2);
    }

    #[tokio::test]
    async fn dequeues_in_arrival_order() {
        let bucket = bucket(4);
        for kind in [RequestKind::Html, RequestKind::Api, RequestKind::Login] {
            bucket.try_enqueue(Request::new(kind)).unwrap();
        }

        let mut seen = Vec::new();
        while let Dequeue::Item(req) = bucket.dequeue_or_wait(Duration::from_millis(10)).await {
            seen.push(req.kind);
        }
        assert_eq!(
            seen,
            vec![RequestKind::Html, RequestKind::Api, RequestKind::Login]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_wait_reports_empty() {
        let bucket = bucket(4);
        let outcome = bucket.dequeue_or_wait(Duration::from_millis(50)).await;
        assert!(matches!(outcome, Dequeue::Empty));
    }

    #[tokio::test]
    async fn close_drains_then_reports_closed() {
        let bucket = bucket(4);
        bucket.try_enqueue(Request::new(RequestKind::Html)).unwrap();
        bucket.close();

        assert!(bucket.is_closed());
        assert!(matches!(
            bucket.try_enqueue(Request::new(RequestKind::Api)),
            Err(TrySendError::Closed(_))
        ));

        let first = bucket.dequeue_or_wait(Duration::from_millis(10)).await;
        assert!(matches!(first, Dequeue::Item(_)));
        let second = bucket.dequeue_or_wait(Duration::from_millis(10)).await;
        assert!(matches!(second, Dequeue::Closed));
    }

    #[tokio::test]
    async fn fill_ratio_tracks_length() {
        let bucket = bucket(20);
        assert!(bucket.is_empty());
        for _ in 0..10 {
            bucket.try_enqueue(Request::new(RequestKind::Html)).unwrap();
        }
        assert!((bucket.fill_ratio() - 0.5).abs() < f64::EPSILON);
    }
}
