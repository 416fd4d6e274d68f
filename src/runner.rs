//! Nix command execution
//!
//! Runs a nix command line as a child process, enforces a timeout, and
//! writes a transcript of the invocation to a per-call log file under the
//! OS temp directory. Every failure mode is folded into the returned
//! [`CommandResult`]; callers inspect the log file for diagnostic detail.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Combined timeout for a single nix invocation
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Prefix for all transcript filenames
const LOG_FILE_PREFIX: &str = "nix-mcp";

/// Cap on captured bytes per stream; nix search over all of nixpkgs stays
/// well under this
const MAX_CAPTURE_BYTES: usize = 10 * 1024 * 1024;

/// Outcome of a single command execution
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Whether the process ran and exited with status zero
    pub success: bool,

    /// Captured standard output, not trimmed
    pub stdout: String,

    /// Path of the transcript written for this invocation
    pub log_file: PathBuf,
}

/// Run a command with the default timeout, logging to the temp directory.
///
/// Exactly one transcript file is written per call, whether the command
/// succeeds, fails, cannot be launched, or times out.
pub async fn run(argv: &[String], log_prefix: &str) -> CommandResult {
    run_with(argv, log_prefix, &std::env::temp_dir(), COMMAND_TIMEOUT).await
}

async fn run_with(
    argv: &[String],
    log_prefix: &str,
    log_dir: &Path,
    timeout: Duration,
) -> CommandResult {
    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S-%6f");
    let log_file = log_dir.join(format!("{}-{}-{}.log", LOG_FILE_PREFIX, log_prefix, timestamp));
    let command_line = argv.join(" ");

    let (program, args) = match argv.split_first() {
        Some(parts) => parts,
        None => {
            write_transcript(
                &log_file,
                &format!("Command: {}\nError: empty argument vector\n", command_line),
            )
            .await;
            return CommandResult {
                success: false,
                stdout: String::new(),
                log_file,
            };
        }
    };

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(command = %command_line, log_file = %log_file.display(), "Running command");

    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => {
            let stdout = truncate_capture(String::from_utf8_lossy(&output.stdout).into_owned());
            let stderr = truncate_capture(String::from_utf8_lossy(&output.stderr).into_owned());
            let exit_code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "terminated by signal".to_string());

            write_transcript(
                &log_file,
                &format!(
                    "Command: {}\nExit code: {}\n\n=== STDOUT ===\n{}\n\n=== STDERR ===\n{}\n",
                    command_line, exit_code, stdout, stderr
                ),
            )
            .await;

            CommandResult {
                success: output.status.success(),
                stdout,
                log_file,
            }
        }
        Ok(Err(e)) => {
            write_transcript(
                &log_file,
                &format!("Command: {}\nError: {}\n", command_line, e),
            )
            .await;

            CommandResult {
                success: false,
                stdout: String::new(),
                log_file,
            }
        }
        Err(_) => {
            // Timer elapsed; the child is killed when the output future drops.
            write_transcript(
                &log_file,
                &format!(
                    "Command: {}\nError: Command timed out after {} seconds\n",
                    command_line,
                    timeout.as_secs()
                ),
            )
            .await;

            CommandResult {
                success: false,
                stdout: String::new(),
                log_file,
            }
        }
    }
}

/// Write the transcript, swallowing write failures.
///
/// The runner contract is total: a broken temp directory must not turn into
/// a protocol-level error.
async fn write_transcript(log_file: &Path, contents: &str) {
    if let Err(e) = tokio::fs::write(log_file, contents).await {
        warn!(log_file = %log_file.display(), error = %e, "Failed to write transcript");
    }
}

fn truncate_capture(text: String) -> String {
    if text.len() <= MAX_CAPTURE_BYTES {
        return text;
    }

    let mut end = MAX_CAPTURE_BYTES;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    let mut truncated = text[..end].to_string();
    truncated.push_str("\n[output truncated]");
    truncated
}
