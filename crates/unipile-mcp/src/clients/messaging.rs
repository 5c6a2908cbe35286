//! Messaging and account endpoints.
//!
//! Chats, chat messages and linked accounts. Every method returns the
//! Unipile response body untouched.

use super::unipile::{NoQuery, UnipileClient, UnipileResult};
use crate::validate::{self, empty_as_none, ValidationResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Maximum page size for chat and message listings.
pub const MAX_MESSAGING_LIMIT: u32 = 250;

/// Maximum page size for account listings.
pub const MAX_ACCOUNTS_LIMIT: u32 = 259;

impl UnipileClient {
    /// List chats, optionally filtered by read state, date range and account.
    #[instrument(skip(self, params))]
    pub async fn list_all_chats(&self, params: &ListChatsParams) -> UnipileResult<serde_json::Value> {
        params.validate()?;
        debug!("Listing chats");
        self.get_json(&["api", "v1", "chats"], params).await
    }

    /// List messages of one chat.
    #[instrument(skip(self, params), fields(chat_id = %chat_id))]
    pub async fn list_chat_messages(
        &self,
        chat_id: &str,
        params: &ListChatMessagesParams,
    ) -> UnipileResult<serde_json::Value> {
        validate::required("chat_id", chat_id)?;
        params.validate()?;
        debug!("Listing messages of chat {}", chat_id);
        self.get_json(&["api", "v1", "chats", chat_id, "messages"], params)
            .await
    }

    /// Send a text message in a chat.
    #[instrument(skip(self, params), fields(chat_id = %chat_id))]
    pub async fn send_chat_message(
        &self,
        chat_id: &str,
        params: &SendMessageParams,
    ) -> UnipileResult<serde_json::Value> {
        validate::required("chat_id", chat_id)?;
        validate::required("text", &params.text)?;
        debug!("Sending message to chat {}", chat_id);
        self.post_json(&["api", "v1", "chats", chat_id, "messages"], &NoQuery {}, params)
            .await
    }

    /// Retrieve a chat by its Unipile or provider ID.
    ///
    /// `account_id` is mandatory on Unipile's side when `chat_id` is a
    /// provider ID.
    #[instrument(skip(self, params), fields(chat_id = %chat_id))]
    pub async fn retrieve_chat(
        &self,
        chat_id: &str,
        params: &RetrieveChatParams,
    ) -> UnipileResult<serde_json::Value> {
        validate::required("chat_id", chat_id)?;
        debug!("Fetching chat {}", chat_id);
        self.get_json(&["api", "v1", "chats", chat_id], params).await
    }

    /// List messages across all chats.
    #[instrument(skip(self, params))]
    pub async fn list_all_messages(
        &self,
        params: &ListMessagesParams,
    ) -> UnipileResult<serde_json::Value> {
        params.validate()?;
        debug!("Listing messages across chats");
        self.get_json(&["api", "v1", "messages"], params).await
    }

    /// List linked accounts.
    #[instrument(skip(self, params))]
    pub async fn list_all_accounts(
        &self,
        params: &ListAccountsParams,
    ) -> UnipileResult<serde_json::Value> {
        params.validate()?;
        debug!("Listing accounts");
        self.get_json(&["api", "v1", "accounts"], params).await
    }

    /// Retrieve one linked account.
    #[instrument(skip(self), fields(account_id = %account_id))]
    pub async fn retrieve_account(&self, account_id: &str) -> UnipileResult<serde_json::Value> {
        validate::required("account_id", account_id)?;
        debug!("Fetching account {}", account_id);
        self.get_json(&["api", "v1", "accounts", account_id], &NoQuery {})
            .await
    }
}

/// Query parameters for listing chats.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListChatsParams {
    /// Only unread (`true`) or only read (`false`) chats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unread: Option<bool>,

    /// Pagination cursor.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,

    /// Only items created before this ISO 8601 UTC datetime (exclusive).
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,

    /// Only items created after this ISO 8601 UTC datetime (exclusive).
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,

    /// Page size (1-250).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Provider filter, e.g. `LINKEDIN` or `WHATSAPP`.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,

    /// Comma-separated account IDs.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

impl ListChatsParams {
    /// Validate ranges and datetimes.
    pub fn validate(&self) -> ValidationResult {
        validate::limit("limit", self.limit, 1, MAX_MESSAGING_LIMIT)?;
        validate::datetime("before", self.before.as_deref())?;
        validate::datetime("after", self.after.as_deref())
    }
}

/// Query parameters for listing messages of one chat.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListChatMessagesParams {
    /// Pagination cursor.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,

    /// Only messages sent before this ISO 8601 UTC datetime (exclusive).
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,

    /// Only messages sent after this ISO 8601 UTC datetime (exclusive).
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,

    /// Page size (1-250).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Only messages from this sender.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
}

impl ListChatMessagesParams {
    /// Validate ranges and datetimes.
    pub fn validate(&self) -> ValidationResult {
        validate::limit("limit", self.limit, 1, MAX_MESSAGING_LIMIT)?;
        validate::datetime("before", self.before.as_deref())?;
        validate::datetime("after", self.after.as_deref())
    }
}

/// Body of a chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageParams {
    /// Message text.
    pub text: String,
}

/// Query parameters for retrieving a chat.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrieveChatParams {
    /// Account context, required when the chat ID is a provider ID.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

/// Query parameters for listing messages across chats.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListMessagesParams {
    /// Pagination cursor.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,

    /// Only messages sent before this ISO 8601 UTC datetime (exclusive).
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,

    /// Only messages sent after this ISO 8601 UTC datetime (exclusive).
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,

    /// Page size (1-250).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Only messages from this sender.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,

    /// Only messages of this linked account.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

impl ListMessagesParams {
    /// Validate ranges and datetimes.
    pub fn validate(&self) -> ValidationResult {
        validate::limit("limit", self.limit, 1, MAX_MESSAGING_LIMIT)?;
        validate::datetime("before", self.before.as_deref())?;
        validate::datetime("after", self.after.as_deref())
    }
}

/// Query parameters for listing accounts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListAccountsParams {
    /// Pagination cursor.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,

    /// Page size (1-259).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ListAccountsParams {
    /// Validate the page size.
    pub fn validate(&self) -> ValidationResult {
        validate::limit("limit", self.limit, 1, MAX_ACCOUNTS_LIMIT)
    }
}
