//! Analyze command implementation.

use std::path::PathBuf;

use anyhow::{Context, bail};
use colored::Colorize;
use serde_json::json;
use unarya_core::proto::AnalyzeCodeRequest;

use super::Target;

/// Execute the analyze command.
pub async fn execute(
    target: &Target,
    language: String,
    code: Option<String>,
    file: Option<PathBuf>,
    json_output: bool,
) -> anyhow::Result<()> {
    let code_structure = match (code, file) {
        (Some(code), _) => code,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => bail!("Either --code or --file is required"),
    };

    let mut client = target.connect().await?;
    let response = client
        .analyze_code(AnalyzeCodeRequest { language: language.clone(), code_structure })
        .await
        .map_err(|status| anyhow::anyhow!("Analysis failed: {}", status.message()))?
        .into_inner();

    if json_output {
        let output = json!({
            "language": language,
            "insights": response.insights,
            "confidence": response.confidence,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", "Code Analysis".bold().cyan());
        println!();
        println!("  Language:   {}", language.green());
        println!("  Confidence: {}", response.confidence.yellow());
        println!("  Insights:   {}", response.insights);
    }
    Ok(())
}
