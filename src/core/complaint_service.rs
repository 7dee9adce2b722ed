use crate::core::publisher::{ComplaintPublisher, PublishError};
use crate::domain::{EnrichedComplaint, validate};
use crate::error::Result;
use serde_json::Value;
use std::time::Duration;
use tokio_util::task::TaskTracker;
use tracing::Instrument;

/// Validate, timestamp and forward complaint submissions.
#[derive(Clone, Debug)]
pub struct ComplaintService {
    publisher: ComplaintPublisher,
    tasks: TaskTracker,
}

impl ComplaintService {
    #[must_use]
    pub fn new(publisher: ComplaintPublisher) -> Self {
        Self { publisher, tasks: TaskTracker::new() }
    }

    /// Accepts a raw submission and forwards it to the queue exactly once.
    ///
    /// The publish runs on its own task so that a caller going away mid-request
    /// does not cancel a complaint that has already been accepted.
    ///
    /// # Errors
    /// Returns `AppError::Validation` for malformed input and
    /// `AppError::Publish` if the transport did not take the message.
    pub async fn submit(&self, raw: &Value) -> Result<EnrichedComplaint> {
        let complaint = validate(raw)?;

        let publisher = self.publisher.clone();
        let outbound = complaint.clone();
        let handle =
            self.tasks.spawn(async move { publisher.publish(&outbound).await }.instrument(tracing::Span::current()));

        match handle.await {
            Ok(Ok(())) => Ok(complaint),
            Ok(Err(e)) => Err(e.into()),
            Err(e) => {
                let err = PublishError::Aborted(e.to_string());
                self.publisher.record_failure(&err);
                Err(err.into())
            }
        }
    }

    /// Waits for in-flight publishes, then releases the queue connection.
    pub async fn shutdown(&self, budget: Duration) {
        self.tasks.close();
        if tokio::time::timeout(budget, self.tasks.wait()).await.is_err() {
            tracing::warn!(pending = self.tasks.len(), "Timed out waiting for in-flight publishes");
        }
        self.publisher.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::queue::{MessageQueue, TransportError};
    use crate::error::AppError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingQueue {
        sends: AtomicUsize,
        closed: AtomicBool,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl MessageQueue for CountingQueue {
        async fn send(&self, _queue: &str, _payload: &[u8]) -> std::result::Result<(), TransportError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.sends.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    fn service(queue: Arc<CountingQueue>) -> ComplaintService {
        ComplaintService::new(ComplaintPublisher::new(queue, "complaints-event".to_string(), Duration::from_secs(5)))
    }

    #[tokio::test]
    async fn test_valid_submission_published_once() {
        let queue = Arc::new(CountingQueue::default());
        let service = service(Arc::clone(&queue));

        let raw = json!({"bookingId": "123e4567-e89b-12d3-a456-426614174000", "description": "Late arrival"});
        let complaint = service.submit(&raw).await.unwrap();

        assert_eq!(complaint.description, "Late arrival");
        assert_eq!(queue.sends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_submission_never_published() {
        let queue = Arc::new(CountingQueue::default());
        let service = service(Arc::clone(&queue));

        let err = service.submit(&json!({"bookingId": "not-a-uuid", "description": ""})).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(queue.sends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dropped_caller_does_not_cancel_publish() {
        let queue = Arc::new(CountingQueue { delay: Some(Duration::from_millis(100)), ..CountingQueue::default() });
        let service = service(Arc::clone(&queue));
        let raw = json!({"bookingId": "123e4567-e89b-12d3-a456-426614174000", "description": "Late arrival"});

        // Give up on the request long before the transport answers.
        let abandoned = tokio::time::timeout(Duration::from_millis(10), service.submit(&raw)).await;
        assert!(abandoned.is_err());

        service.shutdown(Duration::from_secs(2)).await;

        assert_eq!(queue.sends.load(Ordering::SeqCst), 1);
        assert!(queue.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_shutdown_closes_queue_when_drain_budget_runs_out() {
        let queue = Arc::new(CountingQueue { delay: Some(Duration::from_secs(2)), ..CountingQueue::default() });
        let service = service(Arc::clone(&queue));
        let raw = json!({"bookingId": "123e4567-e89b-12d3-a456-426614174000", "description": "Late arrival"});

        let in_flight = {
            let service = service.clone();
            tokio::spawn(async move { service.submit(&raw).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let started = std::time::Instant::now();
        service.shutdown(Duration::from_millis(50)).await;

        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(queue.closed.load(Ordering::SeqCst));
        assert_eq!(queue.sends.load(Ordering::SeqCst), 0);

        in_flight.abort();
    }
}
