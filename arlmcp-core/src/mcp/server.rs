//! MCP server: a flat registry of callable tools
//!
//! The registry is populated once at startup and never mutated while
//! serving, so no lock guards it.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::mcp::protocol::{
    error_codes, JsonRpcRequest, JsonRpcResponse, ToolCall, ToolDefinition, ToolReply,
    PROTOCOL_VERSION,
};
use crate::Result;

/// A callable MCP tool.
#[async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (must be unique in the registry)
    fn name(&self) -> &'static str;

    /// Tool description shown to the calling agent
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    /// Execute the tool. Backend failures are reported inside the reply
    /// payload; `Err` is reserved for malformed arguments and
    /// serialization problems.
    async fn execute(&self, arguments: Value) -> Result<ToolReply>;
}

/// MCP server dispatching JSON-RPC requests to registered tools.
pub struct McpServer {
    tools: BTreeMap<&'static str, Arc<dyn McpTool>>,
    server_name: String,
    server_version: String,
}

impl McpServer {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            tools: BTreeMap::new(),
            server_name: name.into(),
            server_version: version.into(),
        }
    }

    /// Register a tool. Called during startup, before serving begins.
    pub fn register(&mut self, tool: Arc<dyn McpTool>) {
        self.tools.insert(tool.name(), tool);
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Dispatch one request. Returns `None` for notifications, which get
    /// no response on the wire.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            debug!(method = %request.method, "notification consumed");
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "ping" => JsonRpcResponse::success(request.id, serde_json::json!({})),
            "tools/list" => self.handle_list_tools(request.id),
            "tools/call" => self.handle_call_tool(request.id, request.params).await,
            _ => JsonRpcResponse::error(
                request.id,
                error_codes::METHOD_NOT_FOUND,
                format!("Unknown method: {}", request.method),
            ),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": self.server_name,
                    "version": self.server_version
                }
            }),
        )
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let definitions: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.input_schema(),
            })
            .collect();
        JsonRpcResponse::success(id, serde_json::json!({ "tools": definitions }))
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let Some(params) = params else {
            return JsonRpcResponse::error(
                id,
                error_codes::INVALID_PARAMS,
                "Missing params for tools/call",
            );
        };

        let call: ToolCall = match serde_json::from_value(params) {
            Ok(call) => call,
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid tool call params: {e}"),
                );
            }
        };

        let Some(tool) = self.tools.get(call.name.as_str()) else {
            return JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Unknown tool: {}", call.name),
            );
        };

        debug!(tool = %call.name, "tool invocation");
        let reply = match tool.execute(call.arguments).await {
            Ok(reply) => reply,
            // Argument/serialization failures become an error-flagged
            // reply; the process never dies on a tool call.
            Err(e) => ToolReply::error(e.to_string()),
        };

        match serde_json::to_value(reply) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(
                id,
                error_codes::INTERNAL_ERROR,
                format!("Failed to serialize tool reply: {e}"),
            ),
        }
    }
}
