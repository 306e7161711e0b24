//! Client helpers for the inference service.

use std::time::{Duration, Instant};

use tokio::time::{MissedTickBehavior, interval};
use tonic::transport::{Channel, Endpoint};
use tracing::debug;

use crate::error::{Result, UnaryaError};
use crate::proto::inference_service_client::InferenceServiceClient;

/// Client type generated for `unarya.InferenceService`.
pub type InferenceClient = InferenceServiceClient<Channel>;

/// Connects to `server` (e.g. `http://127.0.0.1:50051`), retrying until
/// `timeout` elapses.
///
/// # Errors
///
/// Returns `UnaryaError::Config` for a malformed URL, or the last transport
/// error if no connection succeeds in time.
pub async fn connect(server: &str, timeout: Duration) -> Result<InferenceClient> {
    let endpoint = Endpoint::from_shared(server.to_string())
        .map_err(|e| UnaryaError::Config(format!("Invalid server address {server}: {e}")))?
        .connect_timeout(timeout);

    let start = Instant::now();
    let mut poll_interval = interval(Duration::from_millis(100));
    poll_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        poll_interval.tick().await;
        match endpoint.connect().await {
            Ok(channel) => {
                debug!(server = %server, elapsed_ms = start.elapsed().as_millis(), "Connected");
                return Ok(InferenceServiceClient::new(channel));
            }
            Err(e) if start.elapsed() >= timeout => return Err(e.into()),
            Err(e) => debug!(error = %e, "Server not reachable yet, retrying"),
        }
    }
}
