//! Service lifecycle: bind the listener, run the HTTP server, shut down
//! gracefully.

use std::net::SocketAddr;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

use crate::http_server;
use crate::service_config::Config;
use crate::service_state::{State, StateSetupError};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("state setup failed: {0}")]
    State(#[from] StateSetupError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Handle to a running service; dropping it does not stop the server,
/// call [`ShutdownHandle::shutdown`].
pub struct ShutdownHandle {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ShutdownHandle {
    /// Signal graceful shutdown and wait for in-flight requests.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.task.await;
    }
}

/// Start the HTTP service in a background task.
///
/// Returns the bound address (useful when the config asks for port 0)
/// and a handle to stop the server.
pub async fn start_service(config: &Config) -> Result<(SocketAddr, ShutdownHandle), ServiceError> {
    let state = State::from_config(config).await?;
    let app = http_server::router(state);

    let listener = tokio::net::TcpListener::bind(config.api_listen_addr)
        .await
        .map_err(|source| ServiceError::Bind {
            addr: config.api_listen_addr,
            source,
        })?;
    let addr = listener.local_addr()?;
    info!("api listening on {}", addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let serve = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });
        if let Err(e) = serve.await {
            tracing::error!("server error: {}", e);
        }
    });

    Ok((addr, ShutdownHandle { shutdown_tx, task }))
}

/// Run the service in the foreground until ctrl-c.
pub async fn spawn_service(config: &Config) -> Result<(), ServiceError> {
    let (_addr, handle) = start_service(config).await?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    info!("shutting down");
    handle.shutdown().await;
    Ok(())
}
