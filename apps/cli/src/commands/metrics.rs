//! Metrics command implementation.

use anyhow::Context;
use colored::Colorize;
use serde_json::json;
use unarya_core::proto::MetricsRequest;

use super::Target;

/// Execute the metrics command.
pub async fn execute(target: &Target, json_output: bool) -> anyhow::Result<()> {
    let mut client = target.connect().await?;
    let metrics = client
        .get_metrics(MetricsRequest {})
        .await
        .context("GetMetrics call failed")?
        .into_inner();

    if json_output {
        let output = json!({
            "request_count": metrics.request_count,
            "avg_latency": metrics.avg_latency,
            "max_latency": metrics.max_latency,
            "min_latency": metrics.min_latency,
            "cache_entries": metrics.cache_entries,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Server Metrics".bold().cyan());
    println!();
    println!("  Requests:      {}", metrics.request_count.to_string().green());
    if metrics.request_count == 0 {
        println!("  Latency:       {}", "no requests computed yet".dimmed());
    } else {
        println!("  Avg latency:   {:.4}s", metrics.avg_latency);
        println!("  Min latency:   {:.4}s", metrics.min_latency);
        println!("  Max latency:   {:.4}s", metrics.max_latency);
    }
    println!("  Cache entries: {}", metrics.cache_entries);
    Ok(())
}
