//! Unipile MCP tools
//!
//! This module provides the seventeen tools exposed by the server, one per
//! Unipile endpoint. All tools share a single [`UnipileClient`].

pub mod linkedin;
pub mod messaging;

pub use linkedin::*;
pub use messaging::*;

use crate::clients::{UnipileClient, UnipileError, UnipileResult};
use crate::server::{McpServerError, McpServerResult, Tool};
use crate::types::ToolResult;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::error;

/// Get all available MCP tools.
///
/// Tools come back in a fixed order (messaging and accounts first, then
/// LinkedIn), which is also the order of `tools/list`.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use unipile_mcp::clients::UnipileClient;
/// use unipile_mcp::tools::all_tools;
///
/// let client = Arc::new(UnipileClient::from_env().unwrap());
/// let tools = all_tools(client);
/// println!("Available tools: {}", tools.len());
/// ```
pub fn all_tools(client: Arc<UnipileClient>) -> Vec<Arc<dyn Tool>> {
    let mut tools = Vec::new();

    // Messaging and account tools (7)
    tools.extend(messaging_tools(client.clone()));

    // LinkedIn tools (10)
    tools.extend(linkedin_tools(client));

    tools
}

/// Deserialize tool arguments, reporting failures as invalid params.
///
/// `null` arguments are read as an empty object.
pub(crate) fn parse_args<T: DeserializeOwned>(args: &serde_json::Value) -> McpServerResult<T> {
    let parsed = match args {
        serde_json::Value::Null => T::deserialize(serde_json::json!({})),
        args => T::deserialize(args),
    };
    parsed.map_err(|e| McpServerError::InvalidParams(e.to_string()))
}

/// Turn a client result into a tool result.
///
/// Arguments rejected before sending are the caller's fault and become
/// invalid params; everything Unipile (or the network) reports is returned
/// as an error result so the model can see it.
pub(crate) fn respond(
    action: &str,
    result: UnipileResult<serde_json::Value>,
) -> McpServerResult<ToolResult> {
    match result {
        Ok(value) => Ok(ToolResult::json(value)),
        Err(UnipileError::InvalidInput(e)) => Err(McpServerError::InvalidParams(e.to_string())),
        Err(e) => {
            error!("Failed to {}: {}", action, e);
            Ok(ToolResult::error(format!("Failed to {}: {}", action, e)))
        }
    }
}
