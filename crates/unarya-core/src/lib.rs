//! Unarya Core - inference serving layer for code analysis and artifact generation.
//!
//! This crate provides:
//! - the inference engine: operation dispatch behind a TTL result cache
//! - latency metrics for computed requests
//! - the gRPC model server with its lifecycle and worker pool
//! - configuration management and error handling
//!
//! # Example
//!
//! ```rust,no_run
//! use unarya_core::{config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> unarya_core::error::Result<()> {
//!     let config = Config::load()?;
//!     server::run(&config).await
//! }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod inference;
pub mod metrics;
pub mod server;

/// Generated protobuf code for the Unarya gRPC API.
#[allow(clippy::similar_names)]
#[allow(clippy::doc_markdown)]
#[allow(clippy::missing_const_for_fn)]
pub mod proto {
    tonic::include_proto!("unarya");
}

pub use cache::{CacheStats, ResultCache};
pub use config::Config;
pub use error::{Result, UnaryaError};
pub use fingerprint::fingerprint;
pub use inference::{
    HandlerError, HandlerTable, InferenceEngine, InferenceRequest, InferenceResult, Operation,
    OperationHandler, Payload, handler_fn,
};
pub use metrics::{MetricsCollector, MetricsSnapshot};
pub use proto::inference_service_client;
pub use server::{ModelServer, ServerState, WorkerPool};
