//! Unarya CLI - command-line client for the Unarya model server.
//!
//! This CLI provides an `unarya` command that talks to a running
//! `unarya-server` over gRPC.

mod commands;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{analyze, batch, health, infer, metrics};

/// Unarya CLI - code analysis and artifact generation client
#[derive(Parser, Debug)]
#[command(
    name = "unarya",
    author,
    version,
    about = "Unarya - client for the code analysis model server"
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Model server URL
    #[arg(long, default_value = "http://127.0.0.1:50051", global = true)]
    server: String,

    /// Seconds to keep retrying the connection
    #[arg(long, default_value_t = 5, global = true)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze code style and frameworks
    Analyze {
        /// Language of the code
        #[arg(long)]
        language: String,

        /// Code to analyze
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        code: Option<String>,

        /// File holding the code to analyze
        #[arg(long)]
        file: Option<PathBuf>,

        /// Output result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a single operation (preprocess, classify, generate, health, analyze)
    Infer {
        /// Operation name
        operation: String,

        /// Payload as a JSON object
        #[arg(long, default_value = "{}")]
        payload: String,

        /// Output result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run operations listed in a JSON file, in order
    ///
    /// The file holds an array of `{"operation": ..., "payload": {...}}`.
    Batch {
        /// Input file
        input_file: PathBuf,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the server health status
    Health {
        /// Output status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show latency metrics of the server
    Metrics {
        /// Output metrics as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let target = commands::Target { server: args.server, timeout: Duration::from_secs(args.timeout) };

    match args.command {
        Command::Analyze { language, code, file, json } => {
            analyze::execute(&target, language, code, file, json).await?;
        }
        Command::Infer { operation, payload, json } => {
            infer::execute(&target, operation, payload, json).await?;
        }
        Command::Batch { input_file, json } => {
            batch::execute(&target, &input_file, json).await?;
        }
        Command::Health { json } => {
            health::execute(&target, json).await?;
        }
        Command::Metrics { json } => {
            metrics::execute(&target, json).await?;
        }
    }

    Ok(())
}
