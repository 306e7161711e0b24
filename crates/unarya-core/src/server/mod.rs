//! Server module for Unarya Core.
//!
//! This module contains the gRPC front, its middleware and the worker pool
//! that runs dispatcher calls.

mod inference_service;
pub mod logging;
mod manager;
mod workers;

pub use inference_service::InferenceGrpcService;
pub use manager::{ModelServer, ServerState};
pub use workers::{WorkerError, WorkerPool};

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::inference::InferenceEngine;

/// Start the model server and run it until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the engine cannot be built, the address cannot be
/// bound, or the server fails while running.
pub async fn run(config: &Config) -> Result<()> {
    let engine = Arc::new(InferenceEngine::from_config(config)?);
    info!(address = %config.server.address, "Starting model server");

    let mut server = ModelServer::new(config.clone(), engine);
    server.run_until(shutdown_signal()).await
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
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
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_fails_on_missing_language_model() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.server.address = "127.0.0.1:0".parse().unwrap();
        config.models.model_dir = temp.path().to_path_buf();
        config.models.language_model = Some("absent".to_string());

        let err = run(&config).await.unwrap_err();
        assert!(err.to_string().contains("Model not found"));
    }
}
