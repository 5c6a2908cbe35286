//! stdio transport for JSON-RPC 2.0 over NDJSON
//!
//! One JSON-RPC message per line on stdin, one response per line on stdout.
//! Nothing but protocol messages may be written to stdout; logs go to stderr.

use crate::server::McpServer;
use crate::types::{McpError, McpRequest, McpResponse, RequestId, JSONRPC_VERSION};
use serde::Deserialize;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

/// Line-delimited JSON-RPC transport.
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

impl LineTransport<BufReader<io::Stdin>, io::Stdout> {
    /// Transport over the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a transport over arbitrary streams.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Read the next non-blank line, undecoded, or `None` at EOF.
    pub async fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        loop {
            let mut line = Vec::new();
            if self.reader.read_until(b'\n', &mut line).await? == 0 {
                return Ok(None);
            }
            if !line.iter().all(u8::is_ascii_whitespace) {
                return Ok(Some(line));
            }
        }
    }

    /// Write one message followed by a newline.
    pub async fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }

    /// Serve requests until the reader reaches EOF.
    pub async fn serve(&mut self, server: &McpServer) -> io::Result<()> {
        info!("Serving MCP over stdio");

        while let Some(line) = self.read_line().await? {
            if let Some(response) = handle_bytes(server, &line).await {
                let encoded = serde_json::to_string(&response)?;
                self.write_line(&encoded).await?;
            }
        }

        info!("Input closed, shutting down");
        Ok(())
    }

    /// Give back the underlying streams.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

/// Decode one raw line and dispatch it.
///
/// Lines that are not valid UTF-8 get a parse error with a Null id.
pub async fn handle_bytes(server: &McpServer, line: &[u8]) -> Option<McpResponse> {
    match std::str::from_utf8(line) {
        Ok(text) => handle_line(server, text.trim()).await,
        Err(e) => {
            warn!(error = %e, "Discarding message that is not UTF-8");
            Some(McpResponse::error(
                RequestId::Null,
                McpError::parse_error().with_data(serde_json::json!(e.to_string())),
            ))
        }
    }
}

/// Parse one line and dispatch it.
///
/// Returns the response to write, if any.
pub async fn handle_line(server: &McpServer, line: &str) -> Option<McpResponse> {
    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Discarding unparsable message");
            return Some(McpResponse::error(
                RequestId::Null,
                McpError::parse_error().with_data(serde_json::json!(e.to_string())),
            ));
        }
    };

    let id = value
        .get("id")
        .and_then(|id| RequestId::deserialize(id).ok())
        .unwrap_or(RequestId::Null);

    let request: McpRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Discarding malformed request");
            return Some(McpResponse::error(
                id,
                McpError::invalid_request().with_data(serde_json::json!(e.to_string())),
            ));
        }
    };

    if request.jsonrpc != JSONRPC_VERSION {
        let message = format!("unsupported jsonrpc version '{}'", request.jsonrpc);
        return Some(McpResponse::error(
            id,
            McpError::invalid_request().with_data(serde_json::json!(message)),
        ));
    }

    debug!(method = %request.method, "Dispatching request");
    server.handle_request(request).await
}
