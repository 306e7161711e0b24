//! Command implementations for the Unarya CLI.

pub mod analyze;
pub mod batch;
pub mod health;
pub mod infer;
pub mod metrics;

use std::time::Duration;

use anyhow::Context;
use colored::Colorize;
use serde_json::Value;
use unarya_core::InferenceResult;
use unarya_core::client::{self, InferenceClient};
use unarya_core::proto::InferResult;

/// Where and how long to try reaching the model server.
#[derive(Debug, Clone)]
pub struct Target {
    pub server: String,
    pub timeout: Duration,
}

impl Target {
    /// Connects an inference client.
    pub async fn connect(&self) -> anyhow::Result<InferenceClient> {
        client::connect(&self.server, self.timeout)
            .await
            .with_context(|| format!("Failed to connect to {}", self.server))
    }
}

/// Converts a wire result back into the engine's result type.
pub fn from_wire(result: InferResult) -> anyhow::Result<InferenceResult> {
    let output = match result.output_json.as_deref() {
        Some(json) => Some(serde_json::from_str::<Value>(json).context("Server sent malformed output")?),
        None => None,
    };
    Ok(InferenceResult { success: result.success, output, message: result.message })
}

/// Prints one result in human-readable form.
pub fn print_result(result: &InferenceResult) {
    let message = result.message.as_deref().unwrap_or("");
    if result.success {
        println!("  {} {}", "✓".green(), message.dimmed());
        if let Some(output) = &result.output {
            let rendered = serde_json::to_string_pretty(output).unwrap_or_else(|_| output.to_string());
            for line in rendered.lines() {
                println!("    {line}");
            }
        }
    } else {
        println!("  {} {}", "✗".red(), message.red());
    }
}
