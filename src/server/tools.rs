//! MCP tool definitions and registry
//!
//! The catalog is fixed at process start: five nix operations, each with a
//! JSON-schema description of its input.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Tool definition for MCP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,

    /// Tool description
    pub description: String,

    /// Input schema (JSON Schema)
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Get all available tools
pub fn get_all_tools() -> Vec<ToolDefinition> {
    vec![
        tool_nix_build(),
        tool_nix_eval(),
        tool_nix_flake_show(),
        tool_nix_flake_check(),
        tool_nix_search(),
    ]
}

fn tool_nix_build() -> ToolDefinition {
    ToolDefinition {
        name: "nix_build".to_string(),
        description: "Build a Nix derivation or flake. Returns success status, optional store path, and log file path.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "flake_ref": {
                    "type": "string",
                    "description": "Flake reference (e.g., '.#default', 'nixpkgs#hello', '/path/to/flake#package')"
                },
                "extra_args": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Additional arguments to pass to nix build",
                    "default": []
                }
            },
            "required": ["flake_ref"]
        }),
    }
}

fn tool_nix_eval() -> ToolDefinition {
    ToolDefinition {
        name: "nix_eval".to_string(),
        description: "Evaluate a Nix expression or flake attribute. Returns the evaluation result and log file path.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "flake_ref": {
                    "type": "string",
                    "description": "Flake reference or expression (e.g., '.#packages.x86_64-linux.default.version', 'nixpkgs#legacyPackages.x86_64-linux.hello.version')"
                },
                "raw": {
                    "type": "boolean",
                    "description": "Output raw result without quotes (adds --raw flag)",
                    "default": false
                },
                "json": {
                    "type": "boolean",
                    "description": "Output result as JSON (adds --json flag)",
                    "default": false
                }
            },
            "required": ["flake_ref"]
        }),
    }
}

fn tool_nix_flake_show() -> ToolDefinition {
    ToolDefinition {
        name: "nix_flake_show".to_string(),
        description: "Show the outputs of a flake. Returns structured output information and log file path.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "flake_ref": {
                    "type": "string",
                    "description": "Flake reference (e.g., '.', 'nixpkgs', 'github:owner/repo')",
                    "default": "."
                }
            }
        }),
    }
}

fn tool_nix_flake_check() -> ToolDefinition {
    ToolDefinition {
        name: "nix_flake_check".to_string(),
        description: "Check a Nix flake for errors. Returns success status and log file path.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "flake_ref": {
                    "type": "string",
                    "description": "Flake reference (e.g., '.', '/path/to/flake', 'github:owner/repo')",
                    "default": "."
                }
            }
        }),
    }
}

fn tool_nix_search() -> ToolDefinition {
    ToolDefinition {
        name: "nix_search".to_string(),
        description: "Search for Nix packages. Returns search results and log file path.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query (e.g., 'python', 'firefox', '^python3$')"
                },
                "flake_ref": {
                    "type": "string",
                    "description": "Flake to search in (default: nixpkgs)",
                    "default": "nixpkgs"
                }
            },
            "required": ["query"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names() {
        let tools = get_all_tools();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "nix_build",
                "nix_eval",
                "nix_flake_show",
                "nix_flake_check",
                "nix_search"
            ]
        );
    }

    #[test]
    fn test_required_arguments_declared() {
        let tools = get_all_tools();

        for tool in &tools {
            let required = tool.input_schema["required"].as_array();
            match tool.name.as_str() {
                "nix_build" | "nix_eval" => {
                    assert_eq!(required.unwrap(), &vec![serde_json::json!("flake_ref")]);
                }
                "nix_search" => {
                    assert_eq!(required.unwrap(), &vec![serde_json::json!("query")]);
                }
                _ => assert!(required.is_none()),
            }
        }
    }

    #[test]
    fn test_input_schema_wire_name() {
        let tool = tool_nix_build();
        let value = serde_json::to_value(&tool).unwrap();
        assert!(value.get("inputSchema").is_some());
        assert!(value.get("input_schema").is_none());
    }
}
