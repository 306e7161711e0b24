//! Health command implementation.

use anyhow::{Context, bail};
use colored::Colorize;
use serde_json::json;
use tonic::transport::Endpoint;
use tonic_health::pb::HealthCheckRequest;
use tonic_health::pb::health_check_response::ServingStatus;
use tonic_health::pb::health_client::HealthClient;

use super::Target;

/// Service name the server registers with the health service.
const SERVICE_NAME: &str = "unarya.InferenceService";

/// Execute the health command.
///
/// Fails unless the server reports the inference service as serving.
pub async fn execute(target: &Target, json_output: bool) -> anyhow::Result<()> {
    let channel = Endpoint::from_shared(target.server.clone())
        .with_context(|| format!("Invalid server address {}", target.server))?
        .connect_timeout(target.timeout)
        .connect()
        .await
        .with_context(|| format!("Failed to connect to {}", target.server))?;

    let response = HealthClient::new(channel)
        .check(HealthCheckRequest { service: SERVICE_NAME.to_string() })
        .await
        .context("Health check failed")?
        .into_inner();

    let status = ServingStatus::try_from(response.status).unwrap_or(ServingStatus::Unknown);
    let serving = status == ServingStatus::Serving;

    if json_output {
        let output = json!({
            "server": target.server,
            "service": SERVICE_NAME,
            "status": status.as_str_name(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if serving {
        println!("{} {} is {}", "✓".green(), target.server, "SERVING".green());
    } else {
        println!("{} {} is {}", "✗".red(), target.server, status.as_str_name().red());
    }

    if !serving {
        bail!("Service is not serving");
    }
    Ok(())
}
