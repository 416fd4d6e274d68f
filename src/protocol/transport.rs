//! Stdio transport for JSON-RPC messages
//!
//! Line-delimited JSON over stdin/stdout. Each message is a single line of
//! JSON terminated by a newline. Diagnostic output never goes here; logging
//! is routed to stderr so stdout stays a clean protocol channel.

use super::{JsonRpcRequest, JsonRpcResponse};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error};

/// Stdio transport for JSON-RPC messages
pub struct StdioTransport {
    stdin: BufReader<io::Stdin>,
    stdout: io::Stdout,
}

impl StdioTransport {
    /// Create a new stdio transport
    pub fn new() -> Self {
        Self {
            stdin: BufReader::new(io::stdin()),
            stdout: io::stdout(),
        }
    }

    /// Read the next JSON-RPC request from stdin
    ///
    /// Skips blank lines. Returns `None` on EOF. A line that is not valid
    /// JSON surfaces as an `InvalidData` error so the serve loop can answer
    /// with a parse error and keep going.
    pub async fn read_request(&mut self) -> io::Result<Option<JsonRpcRequest>> {
        let mut line = String::new();

        loop {
            line.clear();

            let n = self.stdin.read_line(&mut line).await?;
            if n == 0 {
                return Ok(None);
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_str(trimmed) {
                Ok(request) => {
                    debug!(request = ?request, "Received JSON-RPC request");
                    return Ok(Some(request));
                }
                Err(e) => {
                    error!(error = %e, line = %trimmed, "Failed to parse JSON-RPC request");
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("Invalid JSON: {}", e),
                    ));
                }
            }
        }
    }

    /// Write a JSON-RPC response to stdout as a single line, then flush
    pub async fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        let mut buf = serde_json::to_vec(response).map_err(|e| {
            error!(error = %e, "Failed to serialize JSON-RPC response");
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Serialization error: {}", e),
            )
        })?;
        buf.push(b'\n');

        debug!(response = ?response, "Sending JSON-RPC response");

        self.stdout.write_all(&buf).await?;
        self.stdout.flush().await?;

        Ok(())
    }

    /// Flush any buffered output before shutdown
    pub async fn close(&mut self) -> io::Result<()> {
        self.stdout.flush().await?;
        Ok(())
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}
