//! MCP stdio transport: newline-delimited JSON-RPC

use std::io::{BufRead, Write};

use tracing::warn;

use crate::mcp::protocol::{error_codes, JsonRpcRequest, JsonRpcResponse};
use crate::mcp::server::McpServer;
use crate::Result;

/// Read the next line from the reader. `Ok(None)` signals EOF; blank
/// lines are returned as empty strings for the caller to skip.
fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let bytes_read = reader.read_line(&mut line)?;
    if bytes_read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Write one JSON-RPC response followed by a newline and flush.
pub fn write_message<W: Write>(writer: &mut W, response: &JsonRpcResponse) -> Result<()> {
    let json = serde_json::to_string(response)?;
    writeln!(writer, "{json}")?;
    writer.flush()?;
    Ok(())
}

/// Serve MCP over a reader/writer pair until EOF.
///
/// A line that fails to parse gets a PARSE_ERROR response rather than
/// tearing the session down; notifications are consumed silently.
pub async fn serve<R: BufRead, W: Write>(
    server: &McpServer,
    reader: &mut R,
    writer: &mut W,
) -> Result<()> {
    while let Some(line) = read_line(reader)? {
        if line.is_empty() {
            continue;
        }

        let request: JsonRpcRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "unparseable MCP request line");
                let response =
                    JsonRpcResponse::error(None, error_codes::PARSE_ERROR, format!("Parse error: {e}"));
                write_message(writer, &response)?;
                continue;
            }
        };

        if let Some(response) = server.handle_request(request).await {
            write_message(writer, &response)?;
        }
    }
    Ok(())
}
