#![allow(dead_code)]
use async_trait::async_trait;
use complaint_service::App;
use complaint_service::adapters::queue::{MessageQueue, TransportError};
use complaint_service::config::{Config, LogFormat, PublisherConfig, ServerConfig, TelemetryConfig};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tokio::sync::watch;

static INIT: Once = Once::new();

pub const BOOKING_ID: &str = "123e4567-e89b-12d3-a456-426614174000";
pub const TEST_QUEUE: &str = "test-complaints-queue";

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("complaint_service=debug".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

pub fn get_test_config() -> Config {
    Config {
        queue_url: "redis://127.0.0.1:6379".to_string(),
        queue_name: TEST_QUEUE.to_string(),
        app_name: "ComplaintService".to_string(),
        app_version: "0.1.0".to_string(),
        debug: false,
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            shutdown_timeout_secs: 5,
            max_body_bytes: 65_536,
        },
        publisher: PublisherConfig {
            publish_timeout_ms: 1000,
            connect_timeout_ms: 300,
            connect_max_retries: 1,
            connect_min_backoff_ms: 10,
            connect_max_backoff_ms: 50,
        },
        telemetry: TelemetryConfig { log_format: LogFormat::Text, otlp_endpoint: None },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueMode {
    Healthy,
    Unreachable,
    Rejecting,
    Hanging,
}

/// In-memory stand-in for the broker that records what it was asked to deliver.
#[derive(Debug)]
pub struct RecordingQueue {
    mode: Mutex<QueueMode>,
    attempts: AtomicUsize,
    closed: AtomicBool,
    delivered: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingQueue {
    pub fn new(mode: QueueMode) -> Arc<Self> {
        Arc::new(Self {
            mode: Mutex::new(mode),
            attempts: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
            delivered: Mutex::new(Vec::new()),
        })
    }

    pub fn set_mode(&self, mode: QueueMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn delivered(&self) -> Vec<(String, serde_json::Value)> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|(queue, payload)| (queue.clone(), serde_json::from_slice(payload).unwrap()))
            .collect()
    }
}

#[async_trait]
impl MessageQueue for RecordingQueue {
    async fn send(&self, queue: &str, payload: &[u8]) -> Result<(), TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let mode = *self.mode.lock().unwrap();
        match mode {
            QueueMode::Healthy => {
                self.delivered.lock().unwrap().push((queue.to_string(), payload.to_vec()));
                Ok(())
            }
            QueueMode::Unreachable => Err(TransportError::Unavailable("Connection refused (os error 111)".to_string())),
            QueueMode::Rejecting => Err(TransportError::Rejected("NOAUTH Authentication required.".to_string())),
            QueueMode::Hanging => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

pub struct TestApp {
    pub url: String,
    pub client: reqwest::Client,
    pub config: Config,
    pub app: App,
    pub shutdown_tx: watch::Sender<bool>,
    pub server: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn spawn(queue: Arc<dyn MessageQueue>) -> Self {
        Self::spawn_with_config(get_test_config(), queue).await
    }

    pub async fn spawn_with_config(config: Config, queue: Arc<dyn MessageQueue>) -> Self {
        setup_tracing();

        let app = App::new(&config, queue);
        let router = app.router(&config);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let server = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.wait_for(|&s| s).await;
                })
                .await
                .unwrap();
        });

        Self { url: format!("http://{addr}"), client: reqwest::Client::new(), config, app, shutdown_tx, server }
    }

    pub async fn submit(&self, body: &serde_json::Value) -> reqwest::Response {
        self.client.post(format!("{}/api/v1/complaints", self.url)).json(body).send().await.unwrap()
    }

    pub async fn health(&self) -> reqwest::Response {
        self.client.get(format!("{}/api/v1/health", self.url)).send().await.unwrap()
    }

    pub async fn shutdown(self) {
        let Self { client, config, app, shutdown_tx, server, .. } = self;
        drop(client);
        let _ = shutdown_tx.send(true);
        app.shutdown(Duration::from_secs(config.server.shutdown_timeout_secs)).await;
        let _ = server.await;
    }
}
