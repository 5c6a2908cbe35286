//! MCP server implementation
//!
//! This module provides the tool registry and the JSON-RPC method dispatch
//! of the Unipile MCP server.

use crate::clients::UnipileClient;
use crate::tools::all_tools;
use crate::types::*;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const INSTRUCTIONS: &str = "Tools for the Unipile API. Use list_all_accounts to find the \
account_id of a linked LinkedIn or messaging account; most LinkedIn tools require it. \
List tools return a cursor for the next page.";

/// MCP server error types.
#[derive(Debug, Error)]
pub enum McpServerError {
    /// Tool not found
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool execution failed
    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    /// Invalid parameters
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl McpServerError {
    /// JSON-RPC error for this failure.
    pub fn to_mcp_error(&self) -> McpError {
        match self {
            McpServerError::ToolNotFound(_) | McpServerError::InvalidParams(_) => {
                McpError::invalid_params(self.to_string())
            }
            McpServerError::ExecutionError(_) | McpServerError::Internal(_) => {
                McpError::internal_error(self.to_string())
            }
        }
    }
}

/// Result type for MCP server operations.
pub type McpServerResult<T> = Result<T, McpServerError>;

/// Trait for tool implementations.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool definition.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with given arguments.
    async fn execute(
        &self,
        args: serde_json::Value,
        context: &ToolContext,
    ) -> McpServerResult<ToolResult>;
}

/// Context for tool execution.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    /// ID of the JSON-RPC request that triggered the call
    pub request_id: Option<RequestId>,
}

impl ToolContext {
    /// Create an empty context.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Context for a call made by the given request.
    pub fn for_request(id: RequestId) -> Self {
        Self {
            request_id: Some(id),
        }
    }
}

/// MCP server.
///
/// Holds the registered tools and answers MCP requests. Tools are kept in
/// registration order so `tools/list` is stable across calls.
pub struct McpServer {
    /// Server info
    info: ServerInfo,

    /// Server capabilities
    capabilities: ServerCapabilities,

    /// Registered tools
    tools: Arc<RwLock<Vec<Arc<dyn Tool>>>>,
}

impl McpServer {
    /// Create a new MCP server.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: ServerInfo {
                name: name.into(),
                version: version.into(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolCapabilities {
                    list_changed: false,
                }),
            },
            tools: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a server with every Unipile tool registered.
    pub async fn unipile(client: Arc<UnipileClient>) -> Self {
        let server = Self::new("unipile-mcp", env!("CARGO_PKG_VERSION"));
        server.register_tools(all_tools(client)).await;
        server
    }

    /// Register a tool, replacing any tool with the same name.
    pub async fn register_tool(&self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name;
        let mut tools = self.tools.write().await;

        match tools.iter().position(|t| t.definition().name == name) {
            Some(idx) => {
                warn!(tool = %name, "Replacing already registered tool");
                tools[idx] = tool;
            }
            None => tools.push(tool),
        }
    }

    /// Register multiple tools.
    pub async fn register_tools(&self, tools: Vec<Arc<dyn Tool>>) {
        for tool in tools {
            self.register_tool(tool).await;
        }
    }

    /// Get all tool definitions, in registration order.
    pub async fn list_tools(&self) -> Vec<ToolDefinition> {
        let tools = self.tools.read().await;
        tools.iter().map(|t| t.definition()).collect()
    }

    /// Get tools by category.
    pub async fn list_tools_by_category(&self, category: &str) -> Vec<ToolDefinition> {
        self.list_tools()
            .await
            .into_iter()
            .filter(|d| d.category.as_deref() == Some(category))
            .collect()
    }

    /// Get tools carrying a tag.
    pub async fn list_tools_by_tag(&self, tag: &str) -> Vec<ToolDefinition> {
        self.list_tools()
            .await
            .into_iter()
            .filter(|d| d.has_tag(tag))
            .collect()
    }

    /// Get all categories, in order of first appearance.
    pub async fn list_categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for def in self.list_tools().await {
            if let Some(category) = def.category {
                if !categories.contains(&category) {
                    categories.push(category);
                }
            }
        }
        categories
    }

    /// Execute a tool.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let tool = {
            let tools = self.tools.read().await;
            tools
                .iter()
                .find(|t| t.definition().name == name)
                .cloned()
                .ok_or_else(|| McpServerError::ToolNotFound(name.to_string()))?
        };

        tool.execute(arguments, context).await
    }

    /// Handle an MCP request.
    ///
    /// Returns `None` for notifications, which never get a response.
    pub async fn handle_request(&self, request: McpRequest) -> Option<McpResponse> {
        let id = match request.id {
            Some(id) => id,
            None => {
                debug!(method = %request.method, "Received notification");
                return None;
            }
        };

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "ping" => McpResponse::success(id, serde_json::json!({})),
            "tools/list" => self.handle_tools_list(id).await,
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => {
                debug!(method = %request.method, "Unknown method");
                McpResponse::error(id, McpError::method_not_found(&request.method))
            }
        };

        Some(response)
    }

    fn handle_initialize(&self, id: RequestId, params: Option<serde_json::Value>) -> McpResponse {
        let requested = params
            .as_ref()
            .and_then(|p| p.get("protocolVersion"))
            .and_then(|v| v.as_str());
        let protocol_version = negotiate_protocol_version(requested);

        info!(
            requested = ?requested,
            negotiated = protocol_version,
            "Client initialized session"
        );

        McpResponse::success(
            id,
            serde_json::json!({
                "protocolVersion": protocol_version,
                "capabilities": self.capabilities,
                "serverInfo": self.info,
                "instructions": INSTRUCTIONS
            }),
        )
    }

    async fn handle_tools_list(&self, id: RequestId) -> McpResponse {
        let tools = self.list_tools().await;
        McpResponse::success(id, serde_json::json!({ "tools": tools }))
    }

    async fn handle_tools_call(
        &self,
        id: RequestId,
        params: Option<serde_json::Value>,
    ) -> McpResponse {
        let params = match params {
            Some(p) => p,
            None => return McpResponse::error(id, McpError::invalid_params("Missing params")),
        };

        let call: ToolCall = match serde_json::from_value(params) {
            Ok(c) => c,
            Err(e) => return McpResponse::error(id, McpError::invalid_params(e.to_string())),
        };

        let context = ToolContext::for_request(id.clone());
        debug!(tool = %call.name, "Calling tool");

        let result = self
            .call_tool(&call.name, call.arguments, &context)
            .await
            .and_then(|result| {
                serde_json::to_value(result).map_err(|e| McpServerError::Internal(e.to_string()))
            });

        match result {
            Ok(value) => McpResponse::success(id, value),
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool call rejected");
                McpResponse::error(id, e.to_mcp_error())
            }
        }
    }

    /// Get server info.
    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Get server capabilities.
    pub fn capabilities(&self) -> &ServerCapabilities {
        &self.capabilities
    }
}

/// Pick the protocol version to speak: the client's if supported, else the latest.
pub fn negotiate_protocol_version(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|v| SUPPORTED_PROTOCOL_VERSIONS.iter().copied().find(|s| *s == v))
        .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0])
}
