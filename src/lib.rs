#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod telemetry;

use crate::adapters::queue::{FaultClass, MessageQueue, RedisQueue};
use crate::api::AppState;
use crate::config::Config;
use crate::core::complaint_service::ComplaintService;
use crate::core::health_service::HealthService;
use crate::core::publisher::ComplaintPublisher;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// The wired application: request state plus what is needed to shut it down.
#[derive(Debug, Clone)]
pub struct App {
    state: AppState,
}

impl App {
    /// Wires the services around an already-constructed queue transport.
    #[must_use]
    pub fn new(config: &Config, queue: Arc<dyn MessageQueue>) -> Self {
        let publisher = ComplaintPublisher::new(
            queue,
            config.queue_name.clone(),
            Duration::from_millis(config.publisher.publish_timeout_ms),
        );
        let state = AppState {
            complaint_service: ComplaintService::new(publisher),
            health_service: HealthService::new(config.app_name.clone(), config.app_version.clone()),
        };
        Self { state }
    }

    #[must_use]
    pub fn router(&self, config: &Config) -> axum::Router {
        api::app_router(config, self.state.clone())
    }

    /// Drains in-flight publishes within `budget`, then releases the queue connection.
    pub async fn shutdown(&self, budget: Duration) {
        self.state.complaint_service.shutdown(budget).await;
    }
}

/// Creates the shared queue connection.
///
/// A broker that is unreachable at startup is not fatal: the connection is
/// acquired on first publish instead. Misconfiguration is fatal.
///
/// # Errors
/// Returns an error if the connection string is malformed or the broker
/// rejects the connection outright.
pub async fn connect_queue(config: &Config) -> anyhow::Result<Arc<RedisQueue>> {
    let queue = RedisQueue::new(&config.queue_url, Duration::from_millis(config.publisher.connect_timeout_ms))?;

    match queue.connect(&config.publisher).await {
        Ok(()) => {}
        Err(e) if e.class() == FaultClass::Transient => {
            tracing::warn!(error = %e, "Queue transport unreachable at startup, will connect on first publish");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Arc::new(queue))
}

/// Routes panics through tracing before the default hook runs.
pub fn setup_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(panic = %info, "Process panicked");
        default_hook(info);
    }));
}

/// Flips `shutdown_tx` to `true` on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
            () = terminate => tracing::info!("Received SIGTERM, shutting down"),
        }

        let _ = shutdown_tx.send(true);
    });
}
