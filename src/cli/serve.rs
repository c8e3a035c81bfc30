use std::{net::SocketAddr, sync::Arc, time::Duration};

use clap::Parser;
use tokio::{net::TcpListener, sync::oneshot};

use crate::{
    cli::device::DeviceArgs,
    coordinator::{poller::poll, ticker::IntervalTicker},
    error::ConfigError,
    prelude::*,
    server,
};

#[derive(Parser)]
pub struct ServeArgs {
    #[clap(flatten)]
    device: DeviceArgs,

    #[clap(long, env = "SOLAX_POLLING_INTERVAL", default_value = "60s")]
    polling_interval: humantime::Duration,

    #[clap(long, env = "BIND_ADDRESS", default_value = "127.0.0.1:8080")]
    bind_address: SocketAddr,
}

impl ServeArgs {
    pub async fn run(self) -> Result {
        let polling_interval = self.polling_interval()?;
        let coordinator = self.device.coordinator()?;

        let listener =
            TcpListener::bind(self.bind_address).await.context("failed to bind to the address")?;
        info!(bind_address = %self.bind_address, ?polling_interval, "serving…");

        let (stop_polling, polling_stopped) = oneshot::channel::<()>();
        let poller = tokio::spawn(poll(
            Arc::clone(&coordinator),
            IntervalTicker::new(polling_interval),
            async move {
                let _ = polling_stopped.await;
            },
        ));

        let served = axum::serve(listener, server::router(coordinator))
            .with_graceful_shutdown(shutdown_signal())
            .await;
        let _ = stop_polling.send(());
        poller.await.context("the poller has crashed")?;
        served?;

        info!("done!");
        Ok(())
    }

    fn polling_interval(&self) -> Result<Duration, ConfigError> {
        let polling_interval: Duration = self.polling_interval.into();
        if polling_interval.is_zero() {
            return Err(ConfigError::ZeroPollingInterval);
        }
        Ok(polling_interval)
    }
}

/// Per <https://github.com/tokio-rs/axum/blob/main/examples/graceful-shutdown/src/main.rs>.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {error:#}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                error!("failed to install the SIGTERM handler: {error:#}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown requested");
}
