use async_trait::async_trait;
use thiserror::Error;

pub mod redis;

pub use self::redis::RedisQueue;

/// Whether retrying the same operation later could succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultClass {
    Transient,
    Permanent,
}

impl FaultClass {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Permanent => "permanent",
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("queue transport unavailable: {0}")]
    Unavailable(String),
    #[error("queue transport rejected the request: {0}")]
    Rejected(String),
    #[error("queue connection has been closed")]
    Closed,
}

impl TransportError {
    #[must_use]
    pub const fn class(&self) -> FaultClass {
        match self {
            Self::Unavailable(_) => FaultClass::Transient,
            Self::Rejected(_) | Self::Closed => FaultClass::Permanent,
        }
    }
}

/// A destination-addressed message queue.
///
/// Implementations share one underlying connection across all callers and
/// must be safe to use from many tasks at once.
#[async_trait]
pub trait MessageQueue: Send + Sync + std::fmt::Debug {
    /// Makes a single attempt to hand `payload` to the transport for delivery to `queue`.
    ///
    /// # Errors
    /// Returns `TransportError` if the transport did not accept the message.
    async fn send(&self, queue: &str, payload: &[u8]) -> Result<(), TransportError>;

    /// Releases the underlying connection. Later sends fail with `TransportError::Closed`.
    async fn close(&self);
}
