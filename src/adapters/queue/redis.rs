use crate::adapters::queue::{FaultClass, MessageQueue, TransportError};
use crate::config::PublisherConfig;
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, ErrorKind, RetryMethod, ServerErrorKind};
use std::time::Duration;
use tokio::sync::Mutex;

type ConnectAttempt = Shared<BoxFuture<'static, Result<ConnectionManager, TransportError>>>;

enum ConnectionState {
    Idle,
    Connecting(ConnectAttempt),
    Connected(ConnectionManager),
    Closed,
}

impl std::fmt::Debug for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("Idle"),
            Self::Connecting(_) => f.write_str("Connecting"),
            Self::Connected(_) => f.write_str("Connected"),
            Self::Closed => f.write_str("Closed"),
        }
    }
}

/// Redis list used as a work queue: producers `LPUSH`, the consumer `BRPOP`s.
///
/// One `ConnectionManager` is shared by every caller. It is multiplexed and
/// reconnects on its own after a dropped connection, so a failed send is
/// followed by a fresh connection on the next call.
#[derive(Debug)]
pub struct RedisQueue {
    client: redis::Client,
    state: Mutex<ConnectionState>,
    connect_timeout: Duration,
}

impl RedisQueue {
    /// Builds a queue client from a connection URL without connecting.
    ///
    /// # Errors
    /// Returns `TransportError::Rejected` if the URL cannot be parsed.
    pub fn new(url: &str, connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = redis::Client::open(url).map_err(|e| classify(&e))?;
        Ok(Self { client, state: Mutex::new(ConnectionState::Idle), connect_timeout })
    }

    /// Acquires the shared connection, retrying transient failures with backoff.
    ///
    /// # Errors
    /// Returns the last `TransportError` once retries are exhausted or a
    /// permanent fault is hit.
    pub async fn connect(&self, config: &PublisherConfig) -> Result<(), TransportError> {
        let strategy = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(config.connect_min_backoff_ms))
            .with_max_delay(Duration::from_millis(config.connect_max_backoff_ms))
            .with_max_times(config.connect_max_retries);

        (|| async { self.connection().await.map(|_| ()) })
            .retry(strategy)
            .when(|e| e.class() == FaultClass::Transient)
            .notify(|e, duration| {
                tracing::warn!(error = %e, retry_in = ?duration, "Queue connection failed, retrying");
            })
            .await
    }

    /// Returns the shared connection. Callers that arrive while an attempt is
    /// in flight await that same attempt; the state lock is never held across it.
    async fn connection(&self) -> Result<ConnectionManager, TransportError> {
        let attempt = {
            let mut state = self.state.lock().await;
            match &*state {
                ConnectionState::Connected(conn) => return Ok(conn.clone()),
                ConnectionState::Closed => return Err(TransportError::Closed),
                ConnectionState::Connecting(attempt) => attempt.clone(),
                ConnectionState::Idle => {
                    let attempt = self.start_attempt();
                    *state = ConnectionState::Connecting(attempt.clone());
                    attempt
                }
            }
        };

        let outcome = attempt.clone().await;

        let mut state = self.state.lock().await;
        if matches!(*state, ConnectionState::Closed) {
            return Err(TransportError::Closed);
        }
        // Only the attempt that is still current may settle the state.
        if matches!(&*state, ConnectionState::Connecting(current) if current.ptr_eq(&attempt)) {
            *state = match &outcome {
                Ok(conn) => {
                    tracing::info!("Connected to queue transport");
                    ConnectionState::Connected(conn.clone())
                }
                Err(_) => ConnectionState::Idle,
            };
        }
        outcome
    }

    fn start_attempt(&self) -> ConnectAttempt {
        let client = self.client.clone();
        let limit = self.connect_timeout;
        async move {
            tokio::time::timeout(limit, client.get_connection_manager())
                .await
                .map_err(|_| TransportError::Unavailable(format!("connection attempt timed out after {limit:?}")))?
                .map_err(|e| classify(&e))
        }
        .boxed()
        .shared()
    }
}

#[async_trait]
impl MessageQueue for RedisQueue {
    async fn send(&self, queue: &str, payload: &[u8]) -> Result<(), TransportError> {
        let mut conn = self.connection().await?;
        conn.lpush::<_, _, i64>(queue, payload).await.map_err(|e| classify(&e))?;
        Ok(())
    }

    async fn close(&self) {
        let mut state = self.state.lock().await;
        if matches!(*state, ConnectionState::Connected(_)) {
            tracing::info!("Disconnected from queue transport");
        }
        *state = ConnectionState::Closed;
    }
}

fn classify(err: &redis::RedisError) -> TransportError {
    let unreachable =
        err.is_timeout() || err.is_connection_dropped() || err.is_connection_refusal() || err.is_io_error();
    // LOADING, TRYAGAIN, MASTERDOWN and READONLY during failover: the server asks to be tried later.
    let busy = matches!(err.retry_method(), RetryMethod::WaitAndRetry)
        || matches!(err.kind(), ErrorKind::Server(ServerErrorKind::ReadOnly));
    if unreachable || busy {
        TransportError::Unavailable(err.to_string())
    } else {
        TransportError::Rejected(err.to_string())
    }
}
