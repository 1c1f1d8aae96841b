use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use gemini_bridge::{BridgeConfig, BridgeServer, GeminiCli, DEFAULT_COMMAND, DEFAULT_MODEL};

/// MCP stdio bridge for the Gemini CLI
#[derive(Parser)]
#[command(
    name = "gemini-bridge",
    version,
    about = "MCP stdio bridge for the Gemini CLI",
    long_about = "Speaks newline-delimited JSON-RPC 2.0 over stdio and delegates \
tool calls to the Gemini CLI. Stdout carries the protocol; all diagnostics go \
to stderr."
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// External command to invoke
    #[arg(long, env = "GEMINI_BRIDGE_COMMAND", default_value = DEFAULT_COMMAND)]
    command: String,

    /// Default model for new sessions
    #[arg(long, env = "GEMINI_BRIDGE_MODEL", default_value = DEFAULT_MODEL)]
    model: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    // The external CLI must be reachable before we accept any request;
    // without it no tool call can ever succeed.
    GeminiCli::new(cli.command.clone())
        .probe()
        .await
        .with_context(|| format!("'{}' is not usable", cli.command))?;
    debug!(command = cli.command, "external CLI probe succeeded");

    let config = BridgeConfig::new(cli.command, cli.model);
    BridgeServer::new(config)
        .serve(tokio::io::stdin(), tokio::io::stdout())
        .await
}

fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    // stdout is the JSON-RPC wire, so diagnostics must stay on stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
