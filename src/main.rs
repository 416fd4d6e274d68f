use anyhow::Result;
use clap::Parser;
use nix_mcp::{McpServer, ServerConfig};
use tracing_subscriber::EnvFilter;

/// Nix MCP Server - exposes Nix flake operations as MCP tools over stdio
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose output
    #[clap(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the JSON-RPC stream; all diagnostics go to stderr.
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let server = McpServer::new(ServerConfig::default());
    server.serve_stdio().await?;

    Ok(())
}
