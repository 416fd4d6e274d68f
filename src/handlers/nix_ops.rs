//! Nix operation handlers
//!
//! Each handler extracts its arguments, builds the nix command line,
//! delegates to the command runner, and shapes the outcome into a typed
//! response. A failing or timed-out nix invocation is not an error at this
//! layer: it becomes `success: false` plus a log file to inspect. The only
//! error that escapes a handler is a missing required argument, which the
//! dispatch layer turns into an invalid-params response.

use super::text_result;
use crate::error::{McpError, Result};
use crate::runner::{self, CommandResult};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// Prefix of every path in the nix store
const STORE_PATH_PREFIX: &str = "/nix/store/";

/// Response for `nix_build`
#[derive(Debug, Serialize)]
pub struct BuildResponse {
    pub success: bool,
    pub log_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<String>,
}

/// Response for `nix_eval`
#[derive(Debug, Serialize)]
pub struct EvalResponse {
    pub success: bool,
    pub log_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

/// Response for `nix_flake_show`
#[derive(Debug, Serialize)]
pub struct FlakeShowResponse {
    pub success: bool,
    pub log_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Value>,
}

/// Response for `nix_flake_check`
#[derive(Debug, Serialize)]
pub struct FlakeCheckResponse {
    pub success: bool,
    pub log_file: String,
}

/// Response for `nix_search`
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub log_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

/// Best-effort JSON decode of captured nix output
enum JsonOutput {
    /// Output parsed as JSON
    Parsed(Value),
    /// Output was not valid JSON; trimmed raw text
    Raw(String),
}

fn decode_json_output(stdout: &str) -> JsonOutput {
    match serde_json::from_str(stdout) {
        Ok(value) => JsonOutput::Parsed(value),
        Err(_) => JsonOutput::Raw(stdout.trim().to_string()),
    }
}

/// Handle nix_build tool
pub async fn handle_build(args: Value) -> Result<Value> {
    let flake_ref = args["flake_ref"]
        .as_str()
        .ok_or_else(|| McpError::InvalidParams("Missing 'flake_ref' parameter".to_string()))?;
    let extra_args: Vec<String> = args["extra_args"]
        .as_array()
        .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .unwrap_or_default();

    info!(flake_ref = flake_ref, "Building flake");

    let argv = build_argv(flake_ref, &extra_args);
    let run = runner::run(&argv, "build").await;

    text_result(&build_response(&run))
}

fn build_argv(flake_ref: &str, extra_args: &[String]) -> Vec<String> {
    let mut argv = vec![
        "nix".to_string(),
        "build".to_string(),
        flake_ref.to_string(),
        "--show-trace".to_string(),
        "--print-out-paths".to_string(),
    ];
    argv.extend(extra_args.iter().cloned());
    argv
}

fn build_response(run: &CommandResult) -> BuildResponse {
    // The last non-blank line of --print-out-paths output is the store path.
    let store_path = if run.success {
        run.stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .filter(|line| line.starts_with(STORE_PATH_PREFIX))
            .map(String::from)
    } else {
        None
    };

    BuildResponse {
        success: run.success,
        log_file: run.log_file.display().to_string(),
        store_path,
    }
}

/// Handle nix_eval tool
pub async fn handle_eval(args: Value) -> Result<Value> {
    let flake_ref = args["flake_ref"]
        .as_str()
        .ok_or_else(|| McpError::InvalidParams("Missing 'flake_ref' parameter".to_string()))?;
    let raw = args["raw"].as_bool().unwrap_or(false);
    let as_json = args["json"].as_bool().unwrap_or(false);

    info!(flake_ref = flake_ref, raw = raw, json = as_json, "Evaluating flake attribute");

    let argv = eval_argv(flake_ref, raw, as_json);
    let run = runner::run(&argv, "eval").await;

    text_result(&eval_response(&run))
}

fn eval_argv(flake_ref: &str, raw: bool, as_json: bool) -> Vec<String> {
    let mut argv = vec![
        "nix".to_string(),
        "eval".to_string(),
        flake_ref.to_string(),
        "--show-trace".to_string(),
    ];
    if raw {
        argv.push("--raw".to_string());
    }
    if as_json {
        argv.push("--json".to_string());
    }
    argv
}

fn eval_response(run: &CommandResult) -> EvalResponse {
    let result = if run.success {
        Some(run.stdout.trim().to_string())
    } else {
        None
    };

    EvalResponse {
        success: run.success,
        log_file: run.log_file.display().to_string(),
        result,
    }
}

/// Handle nix_flake_show tool
pub async fn handle_flake_show(args: Value) -> Result<Value> {
    let flake_ref = args["flake_ref"].as_str().unwrap_or(".");

    info!(flake_ref = flake_ref, "Showing flake outputs");

    let argv = flake_show_argv(flake_ref);
    let run = runner::run(&argv, "flake-show").await;

    text_result(&flake_show_response(&run))
}

fn flake_show_argv(flake_ref: &str) -> Vec<String> {
    vec![
        "nix".to_string(),
        "flake".to_string(),
        "show".to_string(),
        flake_ref.to_string(),
        "--json".to_string(),
    ]
}

fn flake_show_response(run: &CommandResult) -> FlakeShowResponse {
    let outputs = if run.success {
        Some(match decode_json_output(&run.stdout) {
            JsonOutput::Parsed(value) => value,
            JsonOutput::Raw(text) => Value::String(text),
        })
    } else {
        None
    };

    FlakeShowResponse {
        success: run.success,
        log_file: run.log_file.display().to_string(),
        outputs,
    }
}

/// Handle nix_flake_check tool
pub async fn handle_flake_check(args: Value) -> Result<Value> {
    let flake_ref = args["flake_ref"].as_str().unwrap_or(".");

    info!(flake_ref = flake_ref, "Checking flake");

    let argv = flake_check_argv(flake_ref);
    let run = runner::run(&argv, "flake-check").await;

    text_result(&FlakeCheckResponse {
        success: run.success,
        log_file: run.log_file.display().to_string(),
    })
}

fn flake_check_argv(flake_ref: &str) -> Vec<String> {
    vec![
        "nix".to_string(),
        "flake".to_string(),
        "check".to_string(),
        flake_ref.to_string(),
        "--show-trace".to_string(),
    ]
}

/// Handle nix_search tool
pub async fn handle_search(args: Value) -> Result<Value> {
    let query = args["query"]
        .as_str()
        .ok_or_else(|| McpError::InvalidParams("Missing 'query' parameter".to_string()))?;
    let flake_ref = args["flake_ref"].as_str().unwrap_or("nixpkgs");

    info!(query = query, flake_ref = flake_ref, "Searching for packages");

    let argv = search_argv(flake_ref, query);
    let run = runner::run(&argv, "search").await;

    text_result(&search_response(&run))
}

fn search_argv(flake_ref: &str, query: &str) -> Vec<String> {
    vec![
        "nix".to_string(),
        "search".to_string(),
        flake_ref.to_string(),
        query.to_string(),
        "--json".to_string(),
    ]
}

fn search_response(run: &CommandResult) -> SearchResponse {
    let (results, count) = if run.success {
        match decode_json_output(&run.stdout) {
            JsonOutput::Parsed(value) => {
                // nix search emits an object keyed by attribute path; count
                // is defined for objects and arrays only.
                let count = value
                    .as_array()
                    .map(|a| a.len())
                    .or_else(|| value.as_object().map(|o| o.len()));
                (Some(value), count)
            }
            JsonOutput::Raw(text) => (Some(Value::String(text)), None),
        }
    } else {
        (None, None)
    };

    SearchResponse {
        success: run.success,
        log_file: run.log_file.display().to_string(),
        results,
        count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn run_result(success: bool, stdout: &str) -> CommandResult {
        CommandResult {
            success,
            stdout: stdout.to_string(),
            log_file: PathBuf::from("/tmp/nix-mcp-test-0.log"),
        }
    }

    #[test]
    fn test_build_argv_includes_extra_args() {
        let argv = build_argv(".#default", &["--impure".to_string()]);
        assert_eq!(
            argv,
            vec![
                "nix",
                "build",
                ".#default",
                "--show-trace",
                "--print-out-paths",
                "--impure"
            ]
        );
    }

    #[test]
    fn test_build_response_extracts_store_path() {
        let run = run_result(true, "/nix/store/abc123-pkg\n");
        let resp = build_response(&run);

        assert!(resp.success);
        assert_eq!(resp.store_path.as_deref(), Some("/nix/store/abc123-pkg"));
    }

    #[test]
    fn test_build_response_uses_last_nonblank_line() {
        let run = run_result(true, "warning: something\n/nix/store/xyz-pkg\n\n");
        let resp = build_response(&run);

        assert_eq!(resp.store_path.as_deref(), Some("/nix/store/xyz-pkg"));
    }

    #[test]
    fn test_build_response_ignores_non_store_output() {
        let run = run_result(true, "no store path here\n");
        let resp = build_response(&run);

        assert!(resp.store_path.is_none());
    }

    #[test]
    fn test_build_response_on_failure_has_base_fields_only() {
        let run = run_result(false, "");
        let resp = build_response(&run);

        assert!(!resp.success);
        assert!(resp.store_path.is_none());

        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["success"], false);
        assert!(value.get("store_path").is_none());
        assert!(value.get("log_file").is_some());
    }

    #[test]
    fn test_eval_argv_raw_without_json() {
        let argv = eval_argv("nixpkgs#hello.version", true, false);

        assert!(argv.contains(&"--raw".to_string()));
        assert!(!argv.contains(&"--json".to_string()));
    }

    #[test]
    fn test_eval_argv_json() {
        let argv = eval_argv("nixpkgs#hello.meta", false, true);

        assert!(!argv.contains(&"--raw".to_string()));
        assert_eq!(argv.last().unwrap(), "--json");
    }

    #[test]
    fn test_eval_response_trims_stdout() {
        let run = run_result(true, "2.12\n");
        let resp = eval_response(&run);

        assert_eq!(resp.result.as_deref(), Some("2.12"));
    }

    #[test]
    fn test_flake_show_response_parses_json() {
        let run = run_result(true, r#"{"packages": {"x86_64-linux": {}}}"#);
        let resp = flake_show_response(&run);

        assert_eq!(
            resp.outputs,
            Some(serde_json::json!({"packages": {"x86_64-linux": {}}}))
        );
    }

    #[test]
    fn test_flake_show_response_falls_back_to_text() {
        let run = run_result(true, "not json at all\n");
        let resp = flake_show_response(&run);

        assert_eq!(resp.outputs, Some(Value::String("not json at all".to_string())));
    }

    #[test]
    fn test_search_response_counts_object_entries() {
        let run = run_result(
            true,
            r#"{"legacyPackages.x86_64-linux.hello": {"version": "2.12"}, "legacyPackages.x86_64-linux.hey": {"version": "1.0"}}"#,
        );
        let resp = search_response(&run);

        assert_eq!(resp.count, Some(2));
        assert!(resp.results.as_ref().unwrap().is_object());
    }

    #[test]
    fn test_search_response_counts_array_entries() {
        let run = run_result(true, r#"[{"name": "hello"}]"#);
        let resp = search_response(&run);

        assert_eq!(resp.count, Some(1));
    }

    #[test]
    fn test_search_response_falls_back_to_text_without_count() {
        let run = run_result(true, "error: flake does not provide packages\n");
        let resp = search_response(&run);

        assert_eq!(
            resp.results,
            Some(Value::String(
                "error: flake does not provide packages".to_string()
            ))
        );
        assert!(resp.count.is_none());

        let value = serde_json::to_value(&resp).unwrap();
        assert!(value.get("count").is_none());
    }

    #[tokio::test]
    async fn test_handle_build_missing_flake_ref() {
        let err = handle_build(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, McpError::InvalidParams(_)));
    }

    #[tokio::test]
    async fn test_handle_search_missing_query() {
        let err = handle_search(serde_json::json!({"flake_ref": "nixpkgs"}))
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::InvalidParams(_)));
    }
}
