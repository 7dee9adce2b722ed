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

use complaint_service::config::Config;
use complaint_service::{App, telemetry};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::watch;
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing credentials exit here, before any listener is bound.
    let config = Config::load()?;
    let telemetry_guard = telemetry::init_telemetry(&config)?;

    complaint_service::setup_panic_hook();

    let boot_span = tracing::info_span!("boot_server");
    let (listener, app, shutdown_tx, shutdown_rx) = async {
        tracing::info!(service = %config.app_name, version = %config.app_version, "Starting");
        tracing::info!(queue = %config.queue_name, "Queue destination");

        let queue = complaint_service::connect_queue(&config).await?;
        let app = App::new(&config, queue);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        complaint_service::spawn_signal_handler(shutdown_tx.clone());

        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(address = %addr, "listening");

        Ok::<_, anyhow::Error>((listener, app, shutdown_tx, shutdown_rx))
    }
    .instrument(boot_span)
    .await?;

    let mut api_rx = shutdown_rx.clone();
    let server = axum::serve(listener, app.router(&config)).with_graceful_shutdown(async move {
        let _ = api_rx.wait_for(|&s| s).await;
    });

    if let Err(e) = server.await {
        tracing::error!(error = %e, "Server error");
    }

    let _ = shutdown_tx.send(true);
    app.shutdown(Duration::from_secs(config.server.shutdown_timeout_secs)).await;
    tracing::info!(service = %config.app_name, "Shut down");

    telemetry_guard.shutdown();
    Ok(())
}
