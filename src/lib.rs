//! # Nix MCP Server
//!
//! Model Context Protocol (MCP) server for the Nix package manager.
//! Exposes a small catalog of nix flake operations (build, eval, flake show,
//! flake check, search) as tools over a standardized JSON-RPC 2.0 interface
//! on stdio.
//!
//! ## Architecture
//!
//! - **Protocol Layer**: JSON-RPC 2.0 types and stdio transport
//! - **Server Layer**: Request routing and the static tool catalog
//! - **Handler Layer**: Per-tool argument extraction and response shaping
//! - **Command Runner**: Subprocess execution with timeout and transcript
//!   logging
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nix_mcp::{McpServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = McpServer::new(ServerConfig::default());
//!     server.serve_stdio().await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod handlers;
pub mod protocol;
pub mod runner;
pub mod server;

// Re-export main types
pub use error::{McpError, Result};
pub use protocol::{JsonRpcRequest, JsonRpcResponse, StdioTransport};
pub use runner::CommandResult;
pub use server::{McpServer, ServerConfig};
