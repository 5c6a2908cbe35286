//! End-to-End tests for the Unipile MCP tools.
//!
//! These tests run the tools against a wiremock server standing in for the
//! Unipile API and verify the HTTP requests they produce: method, path,
//! query string, JSON body and the `X-API-KEY` header. They also cover how
//! Unipile errors surface to the MCP client and when reads are retried.

use std::sync::Arc;
use std::time::Duration;
use unipile_mcp::clients::{UnipileClient, UnipileConfig};
use unipile_mcp::health::{HealthCheckConfig, HealthChecker, HealthStatus, ServiceStatus};
use unipile_mcp::{
    McpError, McpRequest, McpServer, McpServerError, RetryConfig, ToolContext, ToolResult,
};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_API_KEY: &str = "test-unipile-key";

/// Test fixture providing a mock Unipile server and an MCP server wired to it.
struct TestFixture {
    /// Mock Unipile API.
    unipile: MockServer,
    /// MCP server with every tool registered.
    server: McpServer,
}

impl TestFixture {
    /// Create a new test fixture with a mock server.
    async fn new() -> Self {
        let unipile = MockServer::start().await;

        let config = UnipileConfig {
            base_url: unipile.uri(),
            api_key: TEST_API_KEY.to_string(),
            timeout_secs: 5,
            max_attempts: 3,
        };
        let client = UnipileClient::new(&config)
            .unwrap()
            .with_retry(RetryConfig {
                max_attempts: 3,
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
                exponential_base: 2.0,
            });

        let server = McpServer::unipile(Arc::new(client)).await;
        Self { unipile, server }
    }

    /// Call a tool and expect it to be accepted.
    async fn call(&self, tool: &str, args: serde_json::Value) -> ToolResult {
        self.server
            .call_tool(tool, args, &ToolContext::empty())
            .await
            .unwrap_or_else(|e| panic!("{} rejected: {}", tool, e))
    }

    /// Query string of the only request received.
    async fn single_query(&self) -> Vec<(String, String)> {
        let requests = self.unipile.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        requests[0]
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }
}

fn json_of(result: &ToolResult) -> serde_json::Value {
    assert!(!result.is_error, "unexpected error: {}", result.text_content());
    serde_json::from_str(&result.text_content()).unwrap()
}

// =============================================================================
// Messaging and accounts
// =============================================================================

#[tokio::test]
async fn test_list_all_chats_sends_filters() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/chats"))
        .and(header("X-API-KEY", TEST_API_KEY))
        .and(header("Accept", "application/json"))
        .and(query_param("unread", "true"))
        .and(query_param("limit", "10"))
        .and(query_param("account_type", "LINKEDIN"))
        .and(query_param("after", "2025-01-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "ChatList",
            "items": [{"id": "chat-1"}],
            "cursor": "next-page"
        })))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call(
            "list_all_chats",
            serde_json::json!({
                "unread": true,
                "limit": 10,
                "account_type": "LINKEDIN",
                "after": "2025-01-01T00:00:00Z",
                "cursor": ""
            }),
        )
        .await;

    let body = json_of(&result);
    assert_eq!(body["cursor"], "next-page");
    assert_eq!(body["items"][0]["id"], "chat-1");

    let query = fixture.single_query().await;
    assert_eq!(query.len(), 4, "blank cursor must not be sent: {:?}", query);
}

#[tokio::test]
async fn test_list_chat_messages() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/chats/chat-42/messages"))
        .and(header("X-API-KEY", TEST_API_KEY))
        .and(query_param("sender_id", "user-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "MessageList",
            "items": []
        })))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call(
            "list_chat_messages",
            serde_json::json!({"chat_id": "chat-42", "sender_id": "user-7"}),
        )
        .await;

    assert_eq!(json_of(&result)["object"], "MessageList");
    let query = fixture.single_query().await;
    assert_eq!(query, vec![("sender_id".to_string(), "user-7".to_string())]);
}

#[tokio::test]
async fn test_send_chat_message_posts_text() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chats/chat-42/messages"))
        .and(header("X-API-KEY", TEST_API_KEY))
        .and(body_json(serde_json::json!({"text": "Hello there"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "object": "MessageSent",
            "message_id": "msg-1"
        })))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call(
            "send_chat_message",
            serde_json::json!({"chat_id": "chat-42", "text": "Hello there"}),
        )
        .await;

    assert_eq!(json_of(&result)["message_id"], "msg-1");
}

#[tokio::test]
async fn test_send_chat_message_is_never_retried() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chats/chat-42/messages"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call(
            "send_chat_message",
            serde_json::json!({"chat_id": "chat-42", "text": "Hello"}),
        )
        .await;

    assert!(result.is_error);
    assert!(result.text_content().contains("503"));
    assert!(result.text_content().contains("upstream unavailable"));
}

#[tokio::test]
async fn test_retrieve_chat_with_account() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/chats/provider-chat"))
        .and(query_param("account_id", "acc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "Chat",
            "id": "chat-1"
        })))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call(
            "retrieve_chat",
            serde_json::json!({"chat_id": "provider-chat", "account_id": "acc-1"}),
        )
        .await;

    assert_eq!(json_of(&result)["object"], "Chat");
}

#[tokio::test]
async fn test_list_all_messages() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/messages"))
        .and(query_param("account_id", "acc-1"))
        .and(query_param("limit", "250"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "MessageList",
            "items": [{"id": "m1"}, {"id": "m2"}]
        })))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call(
            "list_all_messages",
            serde_json::json!({"account_id": "acc-1", "limit": 250}),
        )
        .await;

    assert_eq!(json_of(&result)["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_retrieve_account() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/acc-1"))
        .and(header("X-API-KEY", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "Account",
            "id": "acc-1",
            "type": "LINKEDIN"
        })))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call("retrieve_account", serde_json::json!({"account_id": "acc-1"}))
        .await;

    assert_eq!(json_of(&result)["type"], "LINKEDIN");
    assert!(fixture.single_query().await.is_empty());
}

// =============================================================================
// LinkedIn
// =============================================================================

#[tokio::test]
async fn test_list_user_posts_for_company() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/1441/posts"))
        .and(query_param("account_id", "acc-1"))
        .and(query_param("is_company", "true"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "PostList",
            "items": []
        })))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call(
            "list_user_posts",
            serde_json::json!({
                "identifier": "1441",
                "account_id": "acc-1",
                "is_company": true,
                "limit": 20
            }),
        )
        .await;

    assert_eq!(json_of(&result)["object"], "PostList");
}

#[tokio::test]
async fn test_retrieve_own_profile() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .and(query_param("account_id", "acc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "AccountOwnerProfile",
            "first_name": "Ada"
        })))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call("retrieve_own_profile", serde_json::json!({"account_id": "acc-1"}))
        .await;

    assert_eq!(json_of(&result)["first_name"], "Ada");
}

#[tokio::test]
async fn test_retrieve_profile_encodes_identifier() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/ada%2Flovelace"))
        .and(query_param("account_id", "acc-1"))
        .and(query_param("linkedin_sections", "*"))
        .and(query_param("notify", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "UserProfile",
            "public_identifier": "ada/lovelace"
        })))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call(
            "retrieve_profile",
            serde_json::json!({
                "identifier": "ada/lovelace",
                "account_id": "acc-1",
                "linkedin_sections": "*",
                "notify": false
            }),
        )
        .await;

    assert_eq!(json_of(&result)["object"], "UserProfile");
}

#[tokio::test]
async fn test_retrieve_post() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/posts/7332661864792854528"))
        .and(query_param("account_id", "acc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "Post",
            "social_id": "urn:li:activity:7332661864792854528"
        })))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call(
            "retrieve_post",
            serde_json::json!({"post_id": "7332661864792854528", "account_id": "acc-1"}),
        )
        .await;

    assert_eq!(
        json_of(&result)["social_id"],
        "urn:li:activity:7332661864792854528"
    );
}

#[tokio::test]
async fn test_list_post_comments_replies() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/posts/post-1/comments"))
        .and(query_param("account_id", "acc-1"))
        .and(query_param("comment_id", "comment-9"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "CommentList",
            "items": []
        })))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call(
            "list_post_comments",
            serde_json::json!({
                "post_id": "post-1",
                "account_id": "acc-1",
                "comment_id": "comment-9",
                "limit": 5
            }),
        )
        .await;

    assert_eq!(json_of(&result)["object"], "CommentList");
}

#[tokio::test]
async fn test_create_post_body() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/posts"))
        .and(header("X-API-KEY", TEST_API_KEY))
        .and(body_json(serde_json::json!({
            "account_id": "acc-1",
            "text": "Shipping {{0}} today",
            "mentions": [{"name": "Ada", "profile_id": "ACoAA1"}],
            "external_link": "https://example.com/launch"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "object": "PostCreated",
            "post_id": "post-77"
        })))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call(
            "create_post",
            serde_json::json!({
                "account_id": "acc-1",
                "text": "Shipping {{0}} today",
                "mentions": [{"name": "Ada", "profile_id": "ACoAA1"}],
                "external_link": "https://example.com/launch"
            }),
        )
        .await;

    assert_eq!(json_of(&result)["post_id"], "post-77");
}

#[tokio::test]
async fn test_list_post_reactions() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/posts/post-1/reactions"))
        .and(query_param("account_id", "acc-1"))
        .and(query_param("cursor", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "ReactionList",
            "items": [{"value": "like"}]
        })))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call(
            "list_post_reactions",
            serde_json::json!({"post_id": "post-1", "account_id": "acc-1", "cursor": "abc"}),
        )
        .await;

    assert_eq!(json_of(&result)["items"][0]["value"], "like");
}

#[tokio::test]
async fn test_create_post_comment_without_json_response() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/posts/urn:li:activity:1/comments"))
        .and(body_json(serde_json::json!({
            "account_id": "acc-1",
            "text": "Congrats {{0}}!",
            "comment_id": "comment-9",
            "mentions": [{"name": "Ada", "profile_id": "ACoAA1"}]
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call(
            "create_post_comment",
            serde_json::json!({
                "post_social_id": "urn:li:activity:1",
                "account_id": "acc-1",
                "text": "Congrats {{0}}!",
                "comment_id": "comment-9",
                "mentions_body": [{"name": "Ada", "profile_id": "ACoAA1"}]
            }),
        )
        .await;

    assert_eq!(
        json_of(&result),
        serde_json::json!({"status": 201, "message": "Comment action processed."})
    );
}

#[tokio::test]
async fn test_add_reaction_to_post() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/posts/reaction"))
        .and(header("X-API-KEY", TEST_API_KEY))
        .and(body_json(serde_json::json!({
            "account_id": "acc-1",
            "post_id": "urn:li:activity:1",
            "reaction_type": "insightful"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "object": "ReactionAdded"
        })))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call(
            "add_reaction_to_post",
            serde_json::json!({
                "post_social_id": "urn:li:activity:1",
                "reaction_type": "insightful",
                "account_id": "acc-1"
            }),
        )
        .await;

    assert_eq!(json_of(&result)["object"], "ReactionAdded");
}

#[tokio::test]
async fn test_add_reaction_plain_text_acknowledgement() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/posts/reaction"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call(
            "add_reaction_to_post",
            serde_json::json!({
                "post_social_id": "urn:li:activity:1",
                "reaction_type": "like",
                "account_id": "acc-1",
                "comment_id": "comment-3"
            }),
        )
        .await;

    assert_eq!(
        json_of(&result),
        serde_json::json!({"status": 200, "message": "Reaction action processed."})
    );
}

#[tokio::test]
async fn test_search_posts() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/linkedin/search"))
        .and(header("X-API-KEY", TEST_API_KEY))
        .and(query_param("account_id", "acc-1"))
        .and(query_param("limit", "10"))
        .and(body_json(serde_json::json!({
            "api": "classic",
            "category": "posts",
            "keywords": "rust async",
            "sort_by": "date",
            "date_posted": "past_month",
            "author": {"industry": ["4"]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "LinkedinSearch",
            "items": [],
            "paging": {"start": 0, "page_count": 10}
        })))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call(
            "search",
            serde_json::json!({
                "account_id": "acc-1",
                "category": "posts",
                "limit": 10,
                "keywords": "rust async",
                "sort_by": "date",
                "date_posted": "past_month",
                "author": {"industry": ["4"]}
            }),
        )
        .await;

    assert_eq!(json_of(&result)["object"], "LinkedinSearch");
}

#[tokio::test]
async fn test_search_people_with_filters() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/linkedin/search"))
        .and(query_param("account_id", "acc-1"))
        .and(body_json(serde_json::json!({
            "api": "sales_navigator",
            "category": "people",
            "keywords": "founder",
            "location": ["102277331"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "LinkedinSearch",
            "items": [{"type": "PEOPLE"}]
        })))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call(
            "search",
            serde_json::json!({
                "account_id": "acc-1",
                "category": "people",
                "api": "sales_navigator",
                "keywords": "founder",
                "filters": {"location": ["102277331"]}
            }),
        )
        .await;

    assert_eq!(json_of(&result)["items"][0]["type"], "PEOPLE");
}

// =============================================================================
// Errors and retries
// =============================================================================

#[tokio::test]
async fn test_not_found_surfaces_as_tool_error() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/posts/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string(r#"{"title":"Resource not found."}"#),
        )
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call(
            "retrieve_post",
            serde_json::json!({"post_id": "missing", "account_id": "acc-1"}),
        )
        .await;

    assert!(result.is_error);
    assert!(result.text_content().contains("Not found"));
    assert!(result.text_content().contains("Resource not found."));
}

#[tokio::test]
async fn test_bad_api_key_surfaces_as_tool_error() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/accounts"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture.call("list_all_accounts", serde_json::json!({})).await;

    assert!(result.is_error);
    assert!(result.text_content().contains("Authentication failed (401)"));
}

#[tokio::test]
async fn test_get_retried_after_server_errors() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/accounts"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&fixture.unipile)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "AccountList",
            "items": [{"id": "acc-1"}]
        })))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call("list_all_accounts", serde_json::json!({"limit": 1}))
        .await;

    assert_eq!(json_of(&result)["items"][0]["id"], "acc-1");
}

#[tokio::test]
async fn test_single_attempt_config_disables_retries() {
    let unipile = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/accounts"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&unipile)
        .await;

    let config = UnipileConfig::from_lookup(|key| match key {
        "UNIPILE_API_KEY" => Some(TEST_API_KEY.to_string()),
        "UNIPILE_BASE_URL" => Some(unipile.uri()),
        "UNIPILE_MAX_ATTEMPTS" => Some("1".to_string()),
        _ => None,
    })
    .unwrap();
    assert_eq!(config.max_attempts, 1);

    let client = Arc::new(UnipileClient::new(&config).unwrap());
    let server = McpServer::unipile(client).await;
    let result = server
        .call_tool("list_all_accounts", serde_json::json!({}), &ToolContext::empty())
        .await
        .unwrap();

    assert!(result.is_error);
    assert!(result.text_content().contains("503"));
}

#[tokio::test]
async fn test_rate_limit_exhausts_retries() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/chats"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "0")
                .set_body_string("Too many requests"),
        )
        .expect(3)
        .mount(&fixture.unipile)
        .await;

    let result = fixture.call("list_all_chats", serde_json::json!({})).await;

    assert!(result.is_error);
    assert!(result.text_content().contains("Rate limited"));
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/chats"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid cursor"))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let result = fixture
        .call("list_all_chats", serde_json::json!({"cursor": "garbage"}))
        .await;

    assert!(result.is_error);
    assert!(result.text_content().contains("invalid cursor"));
}

#[tokio::test]
async fn test_invalid_arguments_send_nothing() {
    let fixture = TestFixture::new().await;

    let out_of_range = fixture
        .server
        .call_tool(
            "list_all_chats",
            serde_json::json!({"limit": 0}),
            &ToolContext::empty(),
        )
        .await;
    assert!(matches!(out_of_range, Err(McpServerError::InvalidParams(_))));

    let bad_date = fixture
        .server
        .call_tool(
            "list_all_messages",
            serde_json::json!({"before": "last tuesday"}),
            &ToolContext::empty(),
        )
        .await;
    assert!(matches!(bad_date, Err(McpServerError::InvalidParams(_))));

    let blank_id = fixture
        .server
        .call_tool(
            "retrieve_chat",
            serde_json::json!({"chat_id": "  "}),
            &ToolContext::empty(),
        )
        .await;
    assert!(matches!(blank_id, Err(McpServerError::InvalidParams(_))));

    let requests = fixture.unipile.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

// =============================================================================
// JSON-RPC
// =============================================================================

#[tokio::test]
async fn test_tools_call_over_json_rpc() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/acc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "Account",
            "id": "acc-1"
        })))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let request = McpRequest::new(1i64, "tools/call").with_params(serde_json::json!({
        "name": "retrieve_account",
        "arguments": {"account_id": "acc-1"}
    }));
    let response = fixture.server.handle_request(request).await.unwrap();

    assert!(response.error.is_none());
    let result: ToolResult = serde_json::from_value(response.result.unwrap()).unwrap();
    assert_eq!(json_of(&result)["id"], "acc-1");
}

#[tokio::test]
async fn test_api_error_is_successful_json_rpc_response() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/posts"))
        .respond_with(ResponseTemplate::new(422).set_body_string("text too long"))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let request = McpRequest::new("call-1", "tools/call").with_params(serde_json::json!({
        "name": "create_post",
        "arguments": {"account_id": "acc-1", "text": "x"}
    }));
    let response = fixture.server.handle_request(request).await.unwrap();

    assert!(response.error.is_none());
    let result = response.result.unwrap();
    assert_eq!(result["isError"], true);
    assert!(result["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("API error (422): text too long"));
}

#[tokio::test]
async fn test_null_arguments_over_json_rpc() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "AccountList",
            "items": []
        })))
        .expect(1)
        .mount(&fixture.unipile)
        .await;

    let request = McpRequest::new(3i64, "tools/call").with_params(serde_json::json!({
        "name": "list_all_accounts",
        "arguments": null
    }));
    let response = fixture.server.handle_request(request).await.unwrap();

    assert!(response.error.is_none());
    assert_eq!(response.result.unwrap()["isError"], false);
    assert!(fixture.single_query().await.is_empty());
}

#[tokio::test]
async fn test_unknown_tool_over_json_rpc() {
    let fixture = TestFixture::new().await;

    let request = McpRequest::new(2i64, "tools/call")
        .with_params(serde_json::json!({"name": "search_posts", "arguments": {}}));
    let response = fixture.server.handle_request(request).await.unwrap();

    assert_eq!(response.error.unwrap().code, McpError::INVALID_PARAMS);
}

#[tokio::test]
async fn test_tools_list_is_stable() {
    let fixture = TestFixture::new().await;

    let first = fixture
        .server
        .handle_request(McpRequest::new(1i64, "tools/list"))
        .await
        .unwrap();
    let second = fixture
        .server
        .handle_request(McpRequest::new(1i64, "tools/list"))
        .await
        .unwrap();

    let first = serde_json::to_string(&first).unwrap();
    assert_eq!(first, serde_json::to_string(&second).unwrap());

    let parsed: serde_json::Value = serde_json::from_str(&first).unwrap();
    let tools = parsed["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 17);
    assert!(tools.iter().all(|t| t.get("inputSchema").is_some()));
}

// =============================================================================
// Health
// =============================================================================

fn health_checker(unipile: &MockServer) -> HealthChecker {
    let client = UnipileClient::new(&UnipileConfig::new(unipile.uri(), TEST_API_KEY)).unwrap();
    HealthChecker::new(Arc::new(client), HealthCheckConfig::default())
}

#[tokio::test]
async fn test_health_check_healthy() {
    let unipile = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/accounts"))
        .and(header("X-API-KEY", TEST_API_KEY))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "AccountList",
            "items": [{"id": "acc-1"}]
        })))
        .expect(1)
        .mount(&unipile)
        .await;

    let report = health_checker(&unipile).check_all().await;

    assert_eq!(report.status, HealthStatus::Healthy);
    assert!(report.is_ok());
    assert_eq!(report.services[0].status, ServiceStatus::Up);
    assert_eq!(report.services[0].accounts, Some(1));
}

#[tokio::test]
async fn test_health_check_rejected_key_is_not_retried() {
    let unipile = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/accounts"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&unipile)
        .await;

    let checker = health_checker(&unipile);
    let report = checker.check_all().await;

    assert_eq!(report.status, HealthStatus::Unhealthy);
    assert!(!report.is_ok());
    assert!(report.message.contains("UNIPILE_API_KEY"));
}

#[tokio::test]
async fn test_readiness_against_unavailable_api() {
    let unipile = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/accounts"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&unipile)
        .await;

    let readiness = health_checker(&unipile).check_readiness().await;

    assert!(!readiness.ready);
    assert!(readiness.reason.unwrap().contains("503"));
}
