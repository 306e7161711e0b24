//! Model server lifecycle.
//!
//! A [`ModelServer`] moves through `Created -> Running -> Stopping -> Stopped`
//! exactly once. Restarting means building a new instance.

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic_health::server::HealthReporter;
use tracing::{info, warn};

use super::inference_service::InferenceGrpcService;
use super::logging::RequestLoggerLayer;
use super::workers::WorkerPool;
use crate::config::Config;
use crate::error::{Result, UnaryaError};
use crate::inference::InferenceEngine;
use crate::proto::inference_service_server::InferenceServiceServer;

/// Lifecycle state of a [`ModelServer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Built, not yet listening.
    Created,
    /// Listening and serving requests.
    Running,
    /// Draining in-flight requests.
    Stopping,
    /// Terminal.
    Stopped,
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// gRPC front for a shared [`InferenceEngine`].
///
/// The server runs in a background task. Every call is forwarded to the one
/// engine through a worker pool of `server.workers` permits.
pub struct ModelServer {
    config: Config,
    engine: Arc<InferenceEngine>,
    state: ServerState,
    local_addr: Option<SocketAddr>,
    health: Option<HealthReporter>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server_handle: Option<JoinHandle<Result<()>>>,
}

type InferenceServer = InferenceServiceServer<InferenceGrpcService>;

impl ModelServer {
    /// Creates a server in the `Created` state.
    #[must_use]
    pub fn new(config: Config, engine: Arc<InferenceEngine>) -> Self {
        Self {
            config,
            engine,
            state: ServerState::Created,
            local_addr: None,
            health: None,
            shutdown_tx: None,
            server_handle: None,
        }
    }

    /// Binds the configured address and starts serving in the background.
    ///
    /// Returns the bound address, which differs from the configured one
    /// when the configured port is 0.
    ///
    /// # Errors
    ///
    /// Returns `UnaryaError::Lifecycle` unless the server is `Created`, and
    /// an I/O error if the address cannot be bound.
    pub async fn start(&mut self) -> Result<SocketAddr> {
        if self.state != ServerState::Created {
            return Err(UnaryaError::Lifecycle(format!(
                "cannot start a server that is {}",
                self.state
            )));
        }

        let listener = TcpListener::bind(self.config.server.address).await?;
        let addr = listener.local_addr()?;

        let (mut health, health_service) = tonic_health::server::health_reporter();
        health.set_serving::<InferenceServer>().await;

        let workers = WorkerPool::new(self.config.server.workers);
        let service = InferenceGrpcService::new(Arc::clone(&self.engine), workers);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server_handle = tokio::spawn(async move {
            Server::builder()
                .layer(RequestLoggerLayer)
                .add_service(health_service)
                .add_service(InferenceServiceServer::new(service))
                .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async {
                    // A dropped sender also means shut down.
                    let _ = shutdown_rx.await;
                })
                .await
                .map_err(UnaryaError::from)
        });

        self.local_addr = Some(addr);
        self.health = Some(health);
        self.shutdown_tx = Some(shutdown_tx);
        self.server_handle = Some(server_handle);
        self.state = ServerState::Running;

        info!(address = %addr, workers = self.config.server.workers, "Model server running");
        Ok(addr)
    }

    /// Stops accepting calls, waits for in-flight calls, then stops.
    ///
    /// In-flight handlers are never cancelled. Calling this on a server that
    /// never started, or already stopped, just marks it `Stopped`.
    ///
    /// # Errors
    ///
    /// Returns an error if the server task failed.
    pub async fn shutdown(&mut self) -> Result<()> {
        if self.state != ServerState::Running {
            self.state = ServerState::Stopped;
            return Ok(());
        }

        self.state = ServerState::Stopping;
        info!(address = ?self.local_addr, "Model server stopping");

        if let Some(health) = self.health.as_mut() {
            health.set_not_serving::<InferenceServer>().await;
        }
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            if shutdown_tx.send(()).is_err() {
                warn!("Server task already exited");
            }
        }

        let result = match self.server_handle.take() {
            Some(handle) => Self::join(handle).await,
            None => Ok(()),
        };

        self.state = ServerState::Stopped;
        info!(address = ?self.local_addr, "Model server stopped");
        result
    }

    /// Starts the server, runs until `signal` resolves or the server exits,
    /// then shuts down.
    ///
    /// # Errors
    ///
    /// Returns any error from [`ModelServer::start`], or the error the server
    /// task exited with.
    pub async fn run_until<F>(&mut self, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.start().await?;

        let exited = match self.server_handle.as_mut() {
            Some(handle) => tokio::select! {
                () = signal => None,
                joined = handle => Some(joined),
            },
            None => None,
        };

        if let Some(joined) = exited {
            self.server_handle = None;
            self.shutdown_tx = None;
            self.state = ServerState::Stopped;
            warn!("Model server exited before shutdown was requested");
            return joined.map_err(|e| UnaryaError::Lifecycle(format!("server task failed: {e}")))?;
        }

        info!("Shutdown signal received");
        self.shutdown().await
    }

    async fn join(handle: JoinHandle<Result<()>>) -> Result<()> {
        handle.await.map_err(|e| UnaryaError::Lifecycle(format!("server task failed: {e}")))?
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Bound address, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Whether the server is `Running` and its task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == ServerState::Running
            && self.server_handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for ModelServer {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            warn!("ModelServer dropped while running, signalling shutdown");
            let _ = shutdown_tx.send(());
        }
    }
}
