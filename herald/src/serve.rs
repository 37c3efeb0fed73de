//! Listener lifecycle: bind, advisory relay probe, graceful shutdown.

use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use tokio::net::TcpListener;

use crate::{
    config::Config,
    error::ServeError,
    http::{self, AppState},
};

/// The bound HTTP server, ready to serve.
#[derive(Debug)]
pub struct ContactServer {
    listener: TcpListener,
    router: Router,
}

impl ContactServer {
    /// Bind the configured port on all interfaces and assemble the router.
    ///
    /// Also fires a background connectivity probe against the dispatch
    /// channel. Its result is only logged: the service starts even when
    /// the relay is down, and individual submissions surface delivery
    /// failures themselves.
    ///
    /// # Errors
    ///
    /// Returns [`ServeError::Bind`] when the address cannot be bound.
    pub async fn bind(config: &Config, state: AppState) -> Result<Self, ServeError> {
        let address = format!("0.0.0.0:{}", config.port);
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServeError::Bind {
                address: address.clone(),
                source,
            })?;

        tracing::info!(%address, "contact server bound");

        let channel = Arc::clone(&state.channel);
        tokio::spawn(async move {
            match channel.probe().await {
                Ok(()) => {
                    tracing::info!(channel = channel.name(), "dispatch channel reachable");
                }
                Err(error) => tracing::warn!(
                    %error,
                    channel = channel.name(),
                    "dispatch channel probe failed; submissions may not deliver"
                ),
            }
        });

        Ok(Self {
            listener,
            router: http::router(state),
        })
    }

    /// The address the listener actually bound, useful with port `0`.
    ///
    /// # Errors
    ///
    /// Returns an error if the local address cannot be read.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until CTRL+C or SIGTERM. In-flight requests finish before
    /// the listener closes.
    ///
    /// # Errors
    ///
    /// Returns [`ServeError::Server`] when the accept loop fails.
    pub async fn serve(self) -> Result<(), ServeError> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|error| ServeError::Server(error.to_string()))?;

        tracing::info!("contact server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    let mut terminate =
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(signal) => signal,
            Err(error) => {
                tracing::error!(%error, "Failed to install the terminate handler");
                let _ = ctrl_c.await;
                return;
            }
        };

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("CTRL+C received, shutting down");
        }
        _ = terminate.recv() => {
            tracing::info!("Terminate signal received, shutting down");
        }
    }
}
