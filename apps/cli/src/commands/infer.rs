//! Infer command implementation.

use anyhow::{Context, bail};
use colored::Colorize;
use serde_json::Value;
use unarya_core::proto::InferRequest;

use super::{Target, from_wire, print_result};

/// Execute the infer command.
///
/// Sends one operation with its JSON payload. Fails when the server reports
/// the operation as unsuccessful.
pub async fn execute(
    target: &Target,
    operation: String,
    payload: String,
    json_output: bool,
) -> anyhow::Result<()> {
    let parsed: Value = serde_json::from_str(&payload).context("Payload is not valid JSON")?;
    if !parsed.is_object() {
        bail!("Payload must be a JSON object");
    }

    let mut client = target.connect().await?;
    let response = client
        .infer(InferRequest { operation: operation.clone(), payload_json: parsed.to_string() })
        .await
        .context("Infer call failed")?
        .into_inner();

    let result = match response.result {
        Some(result) => from_wire(result)?,
        None => bail!("Server returned no result"),
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{} {}", "Operation:".bold(), operation.cyan());
        print_result(&result);
    }

    if !result.success {
        bail!("{}", result.message.as_deref().unwrap_or("Operation failed"));
    }
    Ok(())
}
