//! Error types for the MCP server

use crate::protocol::JsonRpcError;
use thiserror::Error;

/// Result type for MCP operations
pub type Result<T> = std::result::Result<T, McpError>;

/// MCP server errors
///
/// Tool execution failures are deliberately not represented here: a failing
/// nix subprocess still produces a well-formed tool response with
/// `success: false` and a log file. These variants cover the dispatch layer
/// only.
#[derive(Debug, Error)]
pub enum McpError {
    /// Method not found
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Invalid parameters (e.g. a missing required tool argument)
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    /// Convert to JSON-RPC error
    pub fn to_jsonrpc(&self) -> JsonRpcError {
        match self {
            McpError::MethodNotFound(method) => JsonRpcError::method_not_found(method),
            McpError::InvalidParams(msg) => JsonRpcError::invalid_params(msg),
            McpError::Io(e) => JsonRpcError::internal_error(e.to_string()),
            McpError::Json(e) => JsonRpcError::internal_error(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_not_found_to_jsonrpc() {
        let err = McpError::MethodNotFound("test".to_string());
        let jsonrpc_err = err.to_jsonrpc();
        assert_eq!(jsonrpc_err.code, -32601);
    }

    #[test]
    fn test_invalid_params_to_jsonrpc() {
        let err = McpError::InvalidParams("Missing 'flake_ref' parameter".to_string());
        let jsonrpc_err = err.to_jsonrpc();
        assert_eq!(jsonrpc_err.code, -32602);
        assert!(jsonrpc_err.message.contains("flake_ref"));
    }
}
