//! Shared test utilities for Unarya Core integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use unarya_core::client::{self, InferenceClient};
use unarya_core::{Config, HandlerTable, InferenceEngine, ModelServer};

/// Starts a model server on an ephemeral port with the given handlers.
///
/// # Returns
/// The running server (shut down when dropped) and its bound address.
pub async fn start_test_server_with(handlers: HandlerTable, workers: usize) -> (ModelServer, SocketAddr) {
    let mut config = Config::default();
    config.server.address = "127.0.0.1:0".parse().unwrap();
    config.server.workers = workers;

    let engine = Arc::new(InferenceEngine::new(handlers, config.cache.ttl()));
    let mut server = ModelServer::new(config, engine);
    let addr = server.start().await.expect("Server failed to start");
    (server, addr)
}

/// Starts a model server with the built-in handlers and four workers.
pub async fn start_test_server() -> (ModelServer, SocketAddr) {
    start_test_server_with(HandlerTable::builtin().unwrap(), 4).await
}

/// Creates a connected gRPC client for testing.
///
/// # Panics
/// Panics if the client fails to connect to the server.
pub async fn create_test_client(addr: SocketAddr) -> InferenceClient {
    client::connect(&format!("http://{addr}"), Duration::from_secs(5))
        .await
        .expect("Failed to connect to server")
}
