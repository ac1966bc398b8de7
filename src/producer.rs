use async_channel::TrySendError;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::bucket::Bucket;
use crate::config::ProducerSettings;
use crate::types::Request;

/// Simulates inbound traffic at a roughly fixed rate. Sole writer to the
/// queue tail: enqueues one request, paces, and retries after a longer
/// backoff whenever the bucket rejects an arrival. Returns once the
/// bucket is closed.
pub async fn run_producer(bucket: Bucket, settings: ProducerSettings) {
    info!(bucket = %bucket.name(), kind = %settings.kind, pace = ?settings.pace, "producer started");
    loop {
        match bucket.try_enqueue(Request::new(settings.kind)) {
            Ok(()) => {
                info!(
                    bucket = %bucket.name(),
                    kind = %settings.kind,
                    queued = bucket.len(),
                    "request received"
                );
                sleep(settings.pace).await;
            }
            Err(TrySendError::Full(request)) => {
                warn!(
                    bucket = %bucket.name(),
                    kind = %request.kind,
                    backoff = ?settings.backoff,
                    "queue full; dropping request"
                );
                sleep(settings.backoff).await;
            }
            Err(TrySendError::Closed(_)) => {
                info!(bucket = %bucket.name(), "bucket closed; producer stopping");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::run_producer;
    use crate::bucket::Bucket;
    use crate::config::ProducerSettings;
    use crate::types::RequestKind;
    use std::time::Duration;
    use tokio::time::sleep;

    fn settings() -> ProducerSettings {
        ProducerSettings {
            kind: RequestKind::Html,
            pace: Duration::from_millis(100),
            backoff: Duration::from_secs(3),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn paces_arrivals_at_the_configured_rate() {
        let bucket = Bucket::new("test", 100, 1, 4);
        let producer = tokio::spawn(run_producer(bucket.clone(), settings()));

        // Arrivals land at t = 0ms, 100ms, ..., 1000ms.
        sleep(Duration::from_millis(1050)).await;
        assert_eq!(bucket.len(), 11);

        bucket.close();
        producer.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn backs_off_after_a_drop_instead_of_spinning() {
        let bucket = Bucket::new("test", 2, 1, 4);
        let producer = tokio::spawn(run_producer(bucket.clone(), settings()));

        // The first two arrivals fill the bucket; the third is dropped at
        // t = 200ms and the producer goes quiet for the 3s backoff.
        sleep(Duration::from_millis(2900)).await;
        assert_eq!(bucket.len(), 2);

        // Free a slot; the retry at t = 3200ms lands in it.
        let _ = bucket.dequeue_or_wait(Duration::from_millis(1)).await;
        sleep(Duration::from_millis(400)).await;
        assert_eq!(bucket.len(), 2);

        bucket.close();
        producer.await.unwrap();
    }

    #[tokio::test]
    async fn stops_once_the_bucket_closes() {
        let bucket = Bucket::new("test", 4, 1, 4);
        bucket.close();

        run_producer(bucket.clone(), settings()).await;
        assert!(bucket.is_empty());
    }
}
