//! Messaging MCP tools
//!
//! Tools for chats, chat messages and linked Unipile accounts. Each tool is
//! a thin mapping onto one endpoint of [`UnipileClient`].

use super::{parse_args, respond};
use crate::clients::messaging::{
    ListAccountsParams, ListChatMessagesParams, ListChatsParams, ListMessagesParams,
    RetrieveChatParams, SendMessageParams,
};
use crate::clients::UnipileClient;
use crate::server::{McpServerResult, Tool, ToolContext};
use crate::types::{ToolAnnotations, ToolDefinition, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct ChatIdArg {
    chat_id: String,
}

#[derive(Debug, Deserialize)]
struct AccountIdArg {
    account_id: String,
}

/// Tool to list chats.
///
/// Supports filtering by read state, creation date, provider and account.
pub struct ListAllChatsTool {
    client: Arc<UnipileClient>,
}

impl ListAllChatsTool {
    pub fn new(client: Arc<UnipileClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ListAllChatsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "list_all_chats",
            "Lists all chats, with options to filter by unread status, pagination, date ranges, and account.",
        )
        .with_category("messaging")
        .with_tags(&["linkedin", "chat", "list", "messaging", "api"])
        .with_annotations(ToolAnnotations::read_only())
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "unread": {
                    "type": "boolean",
                    "description": "Only unread chats (true) or only read chats (false)"
                },
                "cursor": {
                    "type": "string",
                    "description": "Pagination cursor for the next page of entries"
                },
                "before": {
                    "type": "string",
                    "format": "date-time",
                    "description": "Only chats created before this ISO 8601 UTC datetime (exclusive)"
                },
                "after": {
                    "type": "string",
                    "format": "date-time",
                    "description": "Only chats created after this ISO 8601 UTC datetime (exclusive)"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 250,
                    "description": "Number of items to return (1-250)"
                },
                "account_type": {
                    "type": "string",
                    "description": "Filter by provider (e.g., 'LINKEDIN', 'WHATSAPP')"
                },
                "account_id": {
                    "type": "string",
                    "description": "Filter by account IDs (comma-separated)"
                }
            },
            "required": []
        }))
    }

    #[instrument(skip(self, args, _context), fields(tool = "list_all_chats"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let params: ListChatsParams = parse_args(&args)?;
        debug!("Listing chats");
        respond("list chats", self.client.list_all_chats(&params).await)
    }
}

/// Tool to list messages of one chat.
pub struct ListChatMessagesTool {
    client: Arc<UnipileClient>,
}

impl ListChatMessagesTool {
    pub fn new(client: Arc<UnipileClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ListChatMessagesTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "list_chat_messages",
            "Lists messages in a specific chat, with pagination and filtering by date and sender.",
        )
        .with_category("messaging")
        .with_tags(&["linkedin", "chat", "message", "list", "messaging", "api"])
        .with_annotations(ToolAnnotations::read_only())
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "chat_id": {
                    "type": "string",
                    "description": "The ID of the chat to retrieve messages from"
                },
                "cursor": {
                    "type": "string",
                    "description": "Pagination cursor for the next page of entries"
                },
                "before": {
                    "type": "string",
                    "format": "date-time",
                    "description": "Only messages sent before this ISO 8601 UTC datetime (exclusive)"
                },
                "after": {
                    "type": "string",
                    "format": "date-time",
                    "description": "Only messages sent after this ISO 8601 UTC datetime (exclusive)"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 250,
                    "description": "Number of items to return (1-250)"
                },
                "sender_id": {
                    "type": "string",
                    "description": "Only messages from this sender"
                }
            },
            "required": ["chat_id"]
        }))
    }

    #[instrument(skip(self, args, _context), fields(tool = "list_chat_messages"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let ChatIdArg { chat_id } = parse_args(&args)?;
        let params: ListChatMessagesParams = parse_args(&args)?;
        debug!("Listing messages of chat {}", chat_id);
        respond(
            "list chat messages",
            self.client.list_chat_messages(&chat_id, &params).await,
        )
    }
}

/// Tool to send a message in a chat.
///
/// Not idempotent: every call sends a new message.
pub struct SendChatMessageTool {
    client: Arc<UnipileClient>,
}

impl SendChatMessageTool {
    pub fn new(client: Arc<UnipileClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for SendChatMessageTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "send_chat_message",
            "Sends a text message to a specific chat conversation.",
        )
        .with_category("messaging")
        .with_tags(&[
            "linkedin", "chat", "message", "send", "create", "messaging", "api",
        ])
        .with_annotations(ToolAnnotations::additive_write())
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "chat_id": {
                    "type": "string",
                    "description": "The ID of the chat where the message will be sent"
                },
                "text": {
                    "type": "string",
                    "description": "The text content of the message"
                }
            },
            "required": ["chat_id", "text"]
        }))
    }

    #[instrument(skip(self, args, _context), fields(tool = "send_chat_message"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let ChatIdArg { chat_id } = parse_args(&args)?;
        let params: SendMessageParams = parse_args(&args)?;
        debug!("Sending message to chat {}", chat_id);
        respond(
            "send chat message",
            self.client.send_chat_message(&chat_id, &params).await,
        )
    }
}

/// Tool to fetch one chat.
pub struct RetrieveChatTool {
    client: Arc<UnipileClient>,
}

impl RetrieveChatTool {
    pub fn new(client: Arc<UnipileClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for RetrieveChatTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "retrieve_chat",
            "Retrieves a specific chat by its Unipile or provider ID.",
        )
        .with_category("messaging")
        .with_tags(&["linkedin", "chat", "retrieve", "get", "messaging", "api"])
        .with_annotations(ToolAnnotations::read_only())
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "chat_id": {
                    "type": "string",
                    "description": "The Unipile or provider ID of the chat"
                },
                "account_id": {
                    "type": "string",
                    "description": "Mandatory if chat_id is a provider ID. The account ID to use for the request"
                }
            },
            "required": ["chat_id"]
        }))
    }

    #[instrument(skip(self, args, _context), fields(tool = "retrieve_chat"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let ChatIdArg { chat_id } = parse_args(&args)?;
        let params: RetrieveChatParams = parse_args(&args)?;
        debug!("Fetching chat {}", chat_id);
        respond(
            "retrieve chat",
            self.client.retrieve_chat(&chat_id, &params).await,
        )
    }
}

/// Tool to list messages across every chat.
pub struct ListAllMessagesTool {
    client: Arc<UnipileClient>,
}

impl ListAllMessagesTool {
    pub fn new(client: Arc<UnipileClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ListAllMessagesTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "list_all_messages",
            "Lists messages from all chats associated with the account(s), with filtering options.",
        )
        .with_category("messaging")
        .with_tags(&[
            "linkedin",
            "message",
            "list",
            "all_messages",
            "messaging",
            "api",
        ])
        .with_annotations(ToolAnnotations::read_only())
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "cursor": {
                    "type": "string",
                    "description": "Pagination cursor for the next page of entries"
                },
                "before": {
                    "type": "string",
                    "format": "date-time",
                    "description": "Only messages sent before this ISO 8601 UTC datetime (exclusive)"
                },
                "after": {
                    "type": "string",
                    "format": "date-time",
                    "description": "Only messages sent after this ISO 8601 UTC datetime (exclusive)"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 250,
                    "description": "Number of items to return (1-250)"
                },
                "sender_id": {
                    "type": "string",
                    "description": "Only messages from this sender"
                },
                "account_id": {
                    "type": "string",
                    "description": "Only messages of this linked account"
                }
            },
            "required": []
        }))
    }

    #[instrument(skip(self, args, _context), fields(tool = "list_all_messages"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let params: ListMessagesParams = parse_args(&args)?;
        debug!("Listing messages across chats");
        respond(
            "list messages",
            self.client.list_all_messages(&params).await,
        )
    }
}

/// Tool to list linked accounts.
pub struct ListAllAccountsTool {
    client: Arc<UnipileClient>,
}

impl ListAllAccountsTool {
    pub fn new(client: Arc<UnipileClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ListAllAccountsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "list_all_accounts",
            "Lists all accounts linked to Unipile, with pagination.",
        )
        .with_category("accounts")
        .with_tags(&[
            "linkedin", "account", "list", "unipile", "api", "important",
        ])
        .with_annotations(ToolAnnotations::read_only())
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "cursor": {
                    "type": "string",
                    "description": "Pagination cursor for the next page of entries"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 259,
                    "description": "Number of items to return (1-259)"
                }
            },
            "required": []
        }))
    }

    #[instrument(skip(self, args, _context), fields(tool = "list_all_accounts"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let params: ListAccountsParams = parse_args(&args)?;
        debug!("Listing accounts");
        respond(
            "list accounts",
            self.client.list_all_accounts(&params).await,
        )
    }
}

/// Tool to fetch one linked account.
pub struct RetrieveAccountTool {
    client: Arc<UnipileClient>,
}

impl RetrieveAccountTool {
    pub fn new(client: Arc<UnipileClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for RetrieveAccountTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "retrieve_account",
            "Retrieves a specific account linked to Unipile by its ID.",
        )
        .with_category("accounts")
        .with_tags(&[
            "linkedin", "account", "retrieve", "get", "unipile", "api", "important",
        ])
        .with_annotations(ToolAnnotations::read_only())
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "account_id": {
                    "type": "string",
                    "description": "The ID of the account to retrieve"
                }
            },
            "required": ["account_id"]
        }))
    }

    #[instrument(skip(self, args, _context), fields(tool = "retrieve_account"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let AccountIdArg { account_id } = parse_args(&args)?;
        debug!("Fetching account {}", account_id);
        respond(
            "retrieve account",
            self.client.retrieve_account(&account_id).await,
        )
    }
}

/// Get all messaging and account tools.
pub fn messaging_tools(client: Arc<UnipileClient>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(ListAllChatsTool::new(client.clone())),
        Arc::new(ListChatMessagesTool::new(client.clone())),
        Arc::new(SendChatMessageTool::new(client.clone())),
        Arc::new(RetrieveChatTool::new(client.clone())),
        Arc::new(ListAllMessagesTool::new(client.clone())),
        Arc::new(ListAllAccountsTool::new(client.clone())),
        Arc::new(RetrieveAccountTool::new(client)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::UnipileConfig;
    use crate::server::McpServerError;

    fn client() -> Arc<UnipileClient> {
        Arc::new(
            UnipileClient::new(&UnipileConfig::new("http://127.0.0.1:9", "test-key")).unwrap(),
        )
    }

    #[test]
    fn test_send_chat_message_definition() {
        let def = SendChatMessageTool::new(client()).definition();
        assert_eq!(def.name, "send_chat_message");
        assert_eq!(def.required_params(), vec!["chat_id", "text"]);
        assert_eq!(def.annotations, Some(ToolAnnotations::additive_write()));
    }

    #[test]
    fn test_all_messaging_tools() {
        let tools = messaging_tools(client());
        assert_eq!(tools.len(), 7);

        let categories: Vec<_> = tools
            .iter()
            .map(|t| t.definition().category.clone())
            .collect();
        assert!(categories.contains(&Some("messaging".to_string())));
        assert!(categories.contains(&Some("accounts".to_string())));
    }

    #[test]
    fn test_account_tools_flagged_important() {
        for tool in messaging_tools(client()) {
            let def = tool.definition();
            if def.category.as_deref() == Some("accounts") {
                assert!(def.has_tag("important"), "{} not important", def.name);
            }
        }
    }

    #[tokio::test]
    async fn test_missing_chat_id_is_invalid_params() {
        let tool = ListChatMessagesTool::new(client());
        let result = tool
            .execute(serde_json::json!({"limit": 5}), &ToolContext::empty())
            .await;
        assert!(matches!(result, Err(McpServerError::InvalidParams(_))));
    }

    #[tokio::test]
    async fn test_out_of_range_limit_is_invalid_params() {
        let tool = ListAllAccountsTool::new(client());
        let result = tool
            .execute(serde_json::json!({"limit": 500}), &ToolContext::empty())
            .await;
        match result {
            Err(McpServerError::InvalidParams(message)) => assert!(message.contains("limit")),
            other => panic!("expected invalid params, got {:?}", other.map(|r| r.is_error)),
        }
    }
}
