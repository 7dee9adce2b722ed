use crate::adapters::queue::{FaultClass, MessageQueue, TransportError};
use crate::domain::{EnrichedComplaint, OutboundMessage};
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct Metrics {
    pub published_total: Counter<u64>,
    pub failures_total: Counter<u64>,
    pub publish_duration_seconds: Histogram<f64>,
}

impl Metrics {
    #[must_use]
    pub(crate) fn new() -> Self {
        let meter = global::meter("complaint-service");
        Self {
            published_total: meter
                .u64_counter("complaints_published_total")
                .with_description("Complaints handed to the queue transport")
                .build(),
            failures_total: meter
                .u64_counter("complaints_publish_failures_total")
                .with_description("Publish attempts that failed, by fault class")
                .build(),
            publish_duration_seconds: meter
                .f64_histogram("complaint_publish_duration_seconds")
                .with_description("Duration of publish attempts")
                .build(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("publish timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("failed to encode outbound message: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("publish task did not complete: {0}")]
    Aborted(String),
}

impl PublishError {
    #[must_use]
    pub const fn class(&self) -> FaultClass {
        match self {
            Self::Timeout(_) | Self::Aborted(_) => FaultClass::Transient,
            Self::Transport(e) => e.class(),
            Self::Encode(_) => FaultClass::Permanent,
        }
    }
}

/// Serializes complaints and hands them to the queue transport, one attempt per call.
#[derive(Clone, Debug)]
pub struct ComplaintPublisher {
    queue: Arc<dyn MessageQueue>,
    queue_name: String,
    publish_timeout: Duration,
    metrics: Metrics,
}

impl ComplaintPublisher {
    #[must_use]
    pub fn new(queue: Arc<dyn MessageQueue>, queue_name: String, publish_timeout: Duration) -> Self {
        Self { queue, queue_name, publish_timeout, metrics: Metrics::new() }
    }

    #[must_use]
    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// Publishes a complaint. `Ok` means the transport accepted the message.
    ///
    /// # Errors
    /// Returns `PublishError` if encoding fails, the transport refuses the
    /// message, or the attempt exceeds the configured timeout.
    #[tracing::instrument(
        skip(self, complaint),
        fields(booking_id = %complaint.booking_id, queue = %self.queue_name)
    )]
    pub async fn publish(&self, complaint: &EnrichedComplaint) -> Result<(), PublishError> {
        let payload = serde_json::to_vec(&OutboundMessage::from(complaint))?;
        let start = Instant::now();

        let result = match tokio::time::timeout(self.publish_timeout, self.queue.send(&self.queue_name, &payload)).await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(PublishError::Transport(e)),
            Err(_) => Err(PublishError::Timeout(self.publish_timeout)),
        };

        self.metrics.publish_duration_seconds.record(start.elapsed().as_secs_f64(), &[]);
        match &result {
            Ok(()) => {
                self.metrics.published_total.add(1, &[]);
                tracing::info!("Complaint sent to queue");
            }
            Err(e) => self.record_failure(e),
        }
        result
    }

    pub(crate) fn record_failure(&self, err: &PublishError) {
        let class = err.class();
        self.metrics.failures_total.add(1, &[KeyValue::new("class", class.as_str())]);
        match class {
            FaultClass::Transient => tracing::warn!(error = %err, class = class.as_str(), "Publish failed"),
            FaultClass::Permanent => tracing::error!(error = %err, class = class.as_str(), "Publish failed"),
        }
    }

    /// Releases the transport connection.
    pub async fn shutdown(&self) {
        self.queue.close().await;
    }
}
