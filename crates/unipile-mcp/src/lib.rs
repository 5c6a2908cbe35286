//! # Unipile MCP
//!
//! This crate provides an MCP (Model Context Protocol) server exposing the
//! Unipile REST API as callable tools: chats and messages across providers,
//! linked accounts, and LinkedIn posts, profiles, comments, reactions and
//! search.
//!
//! ## Overview
//!
//! The unipile-mcp crate handles:
//! - **Tools**: one tool per Unipile endpoint, with JSON Schema inputs
//! - **JSON-RPC**: MCP protocol implementation over stdio
//! - **Clients**: HTTP client for the Unipile API with retries for reads
//! - **Health**: connectivity probe used by `unipile-mcp health`
//!
//! ## MCP Protocol
//!
//! Supported methods:
//! - `initialize`: Initialize the MCP session
//! - `ping`: Liveness check
//! - `tools/list`: List available tools
//! - `tools/call`: Execute a tool
//!
//! ## Available Tools
//!
//! ### Messaging & Accounts
//! - `list_all_chats`, `list_chat_messages`, `send_chat_message`, `retrieve_chat`
//! - `list_all_messages`
//! - `list_all_accounts`, `retrieve_account`
//!
//! ### LinkedIn
//! - `list_user_posts`, `retrieve_post`, `create_post`
//! - `retrieve_own_profile`, `retrieve_profile`
//! - `list_post_comments`, `create_post_comment`
//! - `list_post_reactions`, `add_reaction_to_post`
//! - `search`
//!
//! ## Usage
//!
//! ### Creating an MCP Server
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use unipile_mcp::clients::UnipileClient;
//! use unipile_mcp::McpServer;
//!
//! async fn setup() -> anyhow::Result<()> {
//!     let client = Arc::new(UnipileClient::from_env()?);
//!     let server = McpServer::unipile(client).await;
//!
//!     let tools = server.list_tools().await;
//!     println!("Registered {} tools", tools.len());
//!     Ok(())
//! }
//! ```
//!
//! ### Handling MCP Requests
//!
//! ```rust,no_run
//! use unipile_mcp::{McpRequest, McpServer};
//!
//! async fn handle(server: &McpServer, json: &str) -> anyhow::Result<()> {
//!     let request: McpRequest = serde_json::from_str(json)?;
//!     if let Some(response) = server.handle_request(request).await {
//!         println!("{}", serde_json::to_string(&response)?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Tool Categories
//!
//! - `messaging`: chats and messages
//! - `accounts`: linked Unipile accounts
//! - `posts`: posts, comments and reactions
//! - `profiles`: user and company profiles
//! - `search`: LinkedIn search

pub mod clients;
pub mod health;
pub mod retry;
pub mod server;
pub mod tools;
pub mod transport;
pub mod types;
pub mod validate;

// Re-export main types
pub use retry::{with_retry_if, RetryConfig};
pub use server::{McpServer, McpServerError, McpServerResult, Tool, ToolContext};
pub use types::{
    ContentBlock, McpError, McpRequest, McpResponse, RequestId, ServerCapabilities, ServerInfo,
    ToolAnnotations, ToolCall, ToolCapabilities, ToolDefinition, ToolResult,
};

// Re-export tool collections
pub use tools::{all_tools, linkedin_tools, messaging_tools};

// Re-export the Unipile client
pub use clients::{ConfigError, UnipileClient, UnipileConfig, UnipileError};

// Re-export health check types
pub use health::{
    HealthCheckConfig, HealthChecker, HealthReport, HealthStatus, LivenessResult,
    ReadinessResult, ServiceHealth, ServiceStatus,
};
