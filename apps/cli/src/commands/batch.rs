//! Batch command implementation.

use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde_json::json;
use unarya_core::InferenceRequest;
use unarya_core::proto::{BatchInferRequest, InferRequest};

use super::{Target, from_wire, print_result};

/// Reads the batch file: a JSON array of requests.
pub fn load_requests(path: &Path) -> anyhow::Result<Vec<InferenceRequest>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid batch file {}", path.display()))
}

/// Execute the batch command.
///
/// Results are printed in the order of the input file. Individual failures
/// do not fail the command.
pub async fn execute(target: &Target, input_file: &Path, json_output: bool) -> anyhow::Result<()> {
    let requests = load_requests(input_file)?;

    let wire = requests
        .iter()
        .map(|request| -> serde_json::Result<InferRequest> {
            Ok(InferRequest {
                operation: request.operation.clone(),
                payload_json: serde_json::to_string(&request.payload)?,
            })
        })
        .collect::<serde_json::Result<Vec<_>>>()?;

    let mut client = target.connect().await?;
    let response = client
        .batch_infer(BatchInferRequest { requests: wire })
        .await
        .context("BatchInfer call failed")?
        .into_inner();

    let results = response.results.into_iter().map(from_wire).collect::<anyhow::Result<Vec<_>>>()?;
    let succeeded = results.iter().filter(|r| r.success).count();

    if json_output {
        let output = json!({
            "total": results.len(),
            "succeeded": succeeded,
            "failed": results.len() - succeeded,
            "results": results,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Batch Results".bold().cyan());
    println!();
    for (index, (request, result)) in requests.iter().zip(&results).enumerate() {
        println!("{} {}", format!("[{}]", index + 1).dimmed(), request.operation.cyan());
        print_result(result);
    }
    println!();
    println!(
        "Total: {}  Succeeded: {}  Failed: {}",
        results.len(),
        succeeded.to_string().green(),
        (results.len() - succeeded).to_string().red()
    );
    Ok(())
}
