//! MCP server implementation
//!
//! Core server that routes JSON-RPC requests to the nix tool handlers.

pub mod tools;

use crate::error::{McpError, Result};
use crate::handlers::{self, nix_ops};
use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId, StdioTransport};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

pub use tools::ToolDefinition;

/// MCP protocol revision implemented by this server
const PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server name
    pub name: String,

    /// Server version
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "nix-mcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// MCP server
pub struct McpServer {
    config: ServerConfig,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(config: ServerConfig) -> Self {
        info!(
            server = config.name,
            version = config.version,
            "MCP server initialized"
        );

        Self { config }
    }

    /// Serve requests over stdio
    ///
    /// Requests are processed strictly one at a time: each tool call runs
    /// its subprocess to completion (or timeout) before the response is
    /// written, so responses are produced in request order.
    pub async fn serve_stdio(&self) -> Result<()> {
        let mut transport = StdioTransport::new();

        info!("MCP server listening on stdio");

        loop {
            let request = match transport.read_request().await {
                Ok(Some(req)) => req,
                Ok(None) => {
                    info!("Client disconnected");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Failed to read request");
                    let response = JsonRpcResponse::error(None, JsonRpcError::parse_error());
                    transport.write_response(&response).await?;
                    continue;
                }
            };

            if let Some(response) = self.handle_request(request).await {
                transport.write_response(&response).await?;
            }
        }

        transport.close().await?;
        Ok(())
    }

    /// Handle a JSON-RPC request
    ///
    /// Returns `None` for notifications, which never get a response.
    async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            debug!(method = request.method, "Consumed notification");
            return None;
        }

        let id = request.id.clone();

        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params).await,
            "tools/list" => self.handle_tools_list().await,
            "tools/call" => self.handle_tool_call(request.params).await,
            _ => Err(McpError::MethodNotFound(request.method.clone())),
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id.unwrap_or(RequestId::Number(0)), value),
            Err(e) => {
                warn!(error = %e, "Request failed");
                JsonRpcResponse::error(id, e.to_jsonrpc())
            }
        })
    }

    /// Handle initialize request
    async fn handle_initialize(&self, params: Option<Value>) -> Result<Value> {
        info!(?params, "Received initialize request");

        Ok(json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": self.config.name,
                "version": self.config.version
            }
        }))
    }

    /// Handle tools/list request
    async fn handle_tools_list(&self) -> Result<Value> {
        let tools = tools::get_all_tools();

        Ok(json!({
            "tools": tools
        }))
    }

    /// Handle tools/call request
    async fn handle_tool_call(&self, params: Option<Value>) -> Result<Value> {
        let params =
            params.ok_or_else(|| McpError::InvalidParams("Missing parameters".to_string()))?;

        let tool_name = params["name"]
            .as_str()
            .ok_or_else(|| McpError::InvalidParams("Missing tool name".to_string()))?;

        let arguments = params["arguments"].clone();

        info!(tool = tool_name, "Calling tool");

        match tool_name {
            "nix_build" => nix_ops::handle_build(arguments).await,
            "nix_eval" => nix_ops::handle_eval(arguments).await,
            "nix_flake_show" => nix_ops::handle_flake_show(arguments).await,
            "nix_flake_check" => nix_ops::handle_flake_check(arguments).await,
            "nix_search" => nix_ops::handle_search(arguments).await,
            unknown => {
                // Recovered locally: a plain text notice, not a call error,
                // and no log file is written.
                warn!(tool = unknown, "Unknown tool requested");
                Ok(handlers::text_content(format!("Unknown tool: {}", unknown)))
            }
        }
    }
}
