//! Revenuebase MCP server - the Revenuebase email verification API exposed as agent tools

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use revenuebase_mcp::config::{Config, API_KEY_ENV};
use revenuebase_mcp::mcp::RevenuebaseServer;
use revenuebase_mcp::types::ENDPOINTS;
use revenuebase_mcp::{Operation, RevenuebaseClient};

#[derive(Parser)]
#[command(name = "revenuebase-mcp")]
#[command(about = "MCP server exposing the Revenuebase email verification API as agent tools")]
#[command(version)]
struct Cli {
    /// Path to a config file (default: <config dir>/revenuebase-mcp/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server (stdio mode, the default)
    Mcp,

    /// Start the MCP server (HTTP mode)
    McpHttp {
        /// Port to listen on (default: from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Invoke a single operation and print the JSON response
    Call {
        #[command(subcommand)]
        operation: CallCommand,
    },

    /// List available tools
    Tools,
}

#[derive(Subcommand)]
enum CallCommand {
    /// Status of a batch email processing job
    BatchProcessEmailStatus { process_id: i64 },
    /// List queued batch jobs
    QueuedProcess,
    /// Remaining credits
    GetCredits,
    /// Generate a new API key
    NewApiKey,
    /// Verify a single email address
    RealTimeEmailVerification { email: String },
    /// Submit an uploaded file for batch verification
    BatchEmailSubmission { filename: String },
    /// Cancel a batch job
    CancelProcess { process_id: i64 },
}

impl From<CallCommand> for Operation {
    fn from(cmd: CallCommand) -> Self {
        match cmd {
            CallCommand::BatchProcessEmailStatus { process_id } => {
                Operation::BatchProcessEmailStatus { process_id }
            }
            CallCommand::QueuedProcess => Operation::QueuedProcess,
            CallCommand::GetCredits => Operation::GetCredits,
            CallCommand::NewApiKey => Operation::NewApiKey,
            CallCommand::RealTimeEmailVerification { email } => {
                Operation::RealTimeEmailVerification { email }
            }
            CallCommand::BatchEmailSubmission { filename } => {
                Operation::BatchEmailSubmission { filename }
            }
            CallCommand::CancelProcess { process_id } => Operation::CancelProcess { process_id },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging (stdout is reserved for the stdio transport)
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("revenuebase_mcp={},tower_http=debug", log_level).into()
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load environment
    let _ = dotenvy::dotenv();

    // Load config
    let config = if let Some(path) = &cli.config {
        Config::load_from_path(path)?
    } else {
        Config::load()?
    };

    if !config.has_api_key() {
        tracing::warn!("{} is not set; every tool call will fail until it is", API_KEY_ENV);
    }

    let client = Arc::new(RevenuebaseClient::new(&config)?);

    match cli.command.unwrap_or(Commands::Mcp) {
        Commands::Mcp => {
            tracing::info!("Starting MCP server (stdio mode)");
            let server = RevenuebaseServer::new(client);
            revenuebase_mcp::mcp::server::serve_stdio(server).await?;
        }

        Commands::McpHttp { port } => {
            let port = port.unwrap_or(config.http_port);
            tracing::info!("Starting MCP server (HTTP mode) on port {}", port);

            let server = RevenuebaseServer::new(client);
            println!("MCP server running at http://localhost:{}/mcp", port);

            revenuebase_mcp::mcp::server::serve_http(server, port).await?;
        }

        Commands::Call { operation } => {
            let operation = Operation::from(operation);
            let response = client.call(&operation).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Commands::Tools => {
            for endpoint in &ENDPOINTS {
                println!(
                    "{:<30} {:<5} {}",
                    endpoint.name,
                    endpoint.method.as_str(),
                    config.endpoint_url(endpoint.path)
                );
            }
        }
    }

    Ok(())
}
