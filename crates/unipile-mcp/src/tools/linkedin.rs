//! LinkedIn MCP tools
//!
//! Tools for LinkedIn users, posts, comments, reactions and search through
//! a linked Unipile account.

use super::{parse_args, respond};
use crate::clients::linkedin::{
    AccountParams, AddReactionParams, CreateCommentParams, CreatePostParams, ListCommentsParams,
    ListReactionsParams, ListUserPostsParams, ReactionType, RetrieveProfileParams, SearchParams,
};
use crate::clients::UnipileClient;
use crate::server::{McpServerResult, Tool, ToolContext};
use crate::types::{ToolAnnotations, ToolDefinition, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct IdentifierArg {
    identifier: String,
}

#[derive(Debug, Deserialize)]
struct PostIdArg {
    post_id: String,
}

#[derive(Debug, Deserialize)]
struct PostSocialIdArg {
    post_social_id: String,
}

fn account_id_property() -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": "The ID of the Unipile account to perform the request from"
    })
}

fn cursor_property() -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": "Pagination cursor for the next page of entries"
    })
}

fn limit_property(max: u32) -> serde_json::Value {
    serde_json::json!({
        "type": "integer",
        "minimum": 1,
        "maximum": max,
        "description": format!("Number of items to return (1-{})", max)
    })
}

fn mentions_property() -> serde_json::Value {
    serde_json::json!({
        "type": "array",
        "items": {"type": "object"},
        "description": "Mention objects referenced from the text as {{0}}, {{1}}, ..."
    })
}

/// Tool to list posts of a user or company.
pub struct ListUserPostsTool {
    client: Arc<UnipileClient>,
}

impl ListUserPostsTool {
    pub fn new(client: Arc<UnipileClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ListUserPostsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "list_user_posts",
            "Lists all posts for a specific user or company identified by their provider ID.",
        )
        .with_category("posts")
        .with_tags(&[
            "linkedin",
            "post",
            "list",
            "user_posts",
            "company_posts",
            "content",
            "api",
        ])
        .with_annotations(ToolAnnotations::read_only())
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "identifier": {
                    "type": "string",
                    "description": "The provider internal ID of the user or company"
                },
                "account_id": account_id_property(),
                "cursor": cursor_property(),
                "limit": limit_property(100),
                "is_company": {
                    "type": "boolean",
                    "description": "Whether the identifier refers to a company"
                }
            },
            "required": ["identifier", "account_id"]
        }))
    }

    #[instrument(skip(self, args, _context), fields(tool = "list_user_posts"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let IdentifierArg { identifier } = parse_args(&args)?;
        let params: ListUserPostsParams = parse_args(&args)?;
        debug!("Listing posts of {}", identifier);
        respond(
            "list user posts",
            self.client.list_user_posts(&identifier, &params).await,
        )
    }
}

/// Tool to fetch the profile behind a linked account.
pub struct RetrieveOwnProfileTool {
    client: Arc<UnipileClient>,
}

impl RetrieveOwnProfileTool {
    pub fn new(client: Arc<UnipileClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for RetrieveOwnProfileTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "retrieve_own_profile",
            "Retrieves the profile of the user associated with the given Unipile account_id.",
        )
        .with_category("profiles")
        .with_tags(&["linkedin", "user", "profile", "me", "retrieve", "get", "api"])
        .with_annotations(ToolAnnotations::read_only())
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "account_id": account_id_property()
            },
            "required": ["account_id"]
        }))
    }

    #[instrument(skip(self, args, _context), fields(tool = "retrieve_own_profile"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let params: AccountParams = parse_args(&args)?;
        respond(
            "retrieve own profile",
            self.client.retrieve_own_profile(&params).await,
        )
    }
}

/// Tool to fetch any user or company profile.
pub struct RetrieveProfileTool {
    client: Arc<UnipileClient>,
}

impl RetrieveProfileTool {
    pub fn new(client: Arc<UnipileClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for RetrieveProfileTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "retrieve_profile",
            "Retrieves a user or company profile by provider ID or public identifier.",
        )
        .with_category("profiles")
        .with_tags(&["linkedin", "user", "profile", "retrieve", "get", "api"])
        .with_annotations(ToolAnnotations::read_only())
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "identifier": {
                    "type": "string",
                    "description": "Provider internal ID or public identifier of the profile"
                },
                "account_id": account_id_property(),
                "linkedin_sections": {
                    "type": "string",
                    "description": "Profile sections to include, e.g. '*' or 'experience,skills'"
                },
                "linkedin_api": {
                    "type": "string",
                    "enum": ["classic", "sales_navigator", "recruiter"],
                    "description": "LinkedIn API used for the lookup"
                },
                "notify": {
                    "type": "boolean",
                    "description": "Whether the profile owner is notified of the visit"
                }
            },
            "required": ["identifier", "account_id"]
        }))
    }

    #[instrument(skip(self, args, _context), fields(tool = "retrieve_profile"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let IdentifierArg { identifier } = parse_args(&args)?;
        let params: RetrieveProfileParams = parse_args(&args)?;
        debug!("Fetching profile {}", identifier);
        respond(
            "retrieve profile",
            self.client.retrieve_profile(&identifier, &params).await,
        )
    }
}

/// Tool to fetch one post.
pub struct RetrievePostTool {
    client: Arc<UnipileClient>,
}

impl RetrievePostTool {
    pub fn new(client: Arc<UnipileClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for RetrievePostTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "retrieve_post",
            "Retrieves a specific post by its post ID.",
        )
        .with_category("posts")
        .with_tags(&[
            "linkedin", "post", "retrieve", "get", "content", "api", "important",
        ])
        .with_annotations(ToolAnnotations::read_only())
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "post_id": {
                    "type": "string",
                    "description": "The ID of the post to retrieve"
                },
                "account_id": account_id_property()
            },
            "required": ["post_id", "account_id"]
        }))
    }

    #[instrument(skip(self, args, _context), fields(tool = "retrieve_post"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let PostIdArg { post_id } = parse_args(&args)?;
        let params: AccountParams = parse_args(&args)?;
        debug!("Fetching post {}", post_id);
        respond(
            "retrieve post",
            self.client.retrieve_post(&post_id, &params).await,
        )
    }
}

/// Tool to list comments on a post.
pub struct ListPostCommentsTool {
    client: Arc<UnipileClient>,
}

impl ListPostCommentsTool {
    pub fn new(client: Arc<UnipileClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ListPostCommentsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "list_post_comments",
            "Lists all comments on a post, or the replies to a specific comment.",
        )
        .with_category("posts")
        .with_tags(&["linkedin", "post", "comment", "list", "content", "api"])
        .with_annotations(ToolAnnotations::read_only())
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "post_id": {
                    "type": "string",
                    "description": "The social ID of the post"
                },
                "account_id": account_id_property(),
                "comment_id": {
                    "type": "string",
                    "description": "List the replies to this comment instead of the post's comments"
                },
                "cursor": cursor_property(),
                "limit": limit_property(100)
            },
            "required": ["post_id", "account_id"]
        }))
    }

    #[instrument(skip(self, args, _context), fields(tool = "list_post_comments"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let PostIdArg { post_id } = parse_args(&args)?;
        let params: ListCommentsParams = parse_args(&args)?;
        debug!("Listing comments of post {}", post_id);
        respond(
            "list post comments",
            self.client.list_post_comments(&post_id, &params).await,
        )
    }
}

/// Tool to publish a post.
pub struct CreatePostTool {
    client: Arc<UnipileClient>,
}

impl CreatePostTool {
    pub fn new(client: Arc<UnipileClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CreatePostTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "create_post",
            "Creates a new post on LinkedIn, optionally with mentions and an external link.",
        )
        .with_category("posts")
        .with_tags(&[
            "linkedin", "post", "create", "share", "content", "api", "important",
        ])
        .with_annotations(ToolAnnotations::additive_write())
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "account_id": account_id_property(),
                "text": {
                    "type": "string",
                    "description": "The text content of the post"
                },
                "mentions": mentions_property(),
                "external_link": {
                    "type": "string",
                    "description": "A URL to attach to the post as a link card"
                }
            },
            "required": ["account_id", "text"]
        }))
    }

    #[instrument(skip(self, args, _context), fields(tool = "create_post"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let params: CreatePostParams = parse_args(&args)?;
        respond("create post", self.client.create_post(&params).await)
    }
}

/// Tool to list reactions on a post.
pub struct ListPostReactionsTool {
    client: Arc<UnipileClient>,
}

impl ListPostReactionsTool {
    pub fn new(client: Arc<UnipileClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ListPostReactionsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "list_post_reactions",
            "Lists all reactions on a post, or on a specific comment of that post.",
        )
        .with_category("posts")
        .with_tags(&[
            "linkedin", "post", "reaction", "list", "like", "content", "api",
        ])
        .with_annotations(ToolAnnotations::read_only())
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "post_id": {
                    "type": "string",
                    "description": "The social ID of the post"
                },
                "account_id": account_id_property(),
                "comment_id": {
                    "type": "string",
                    "description": "List the reactions on this comment instead of the post"
                },
                "cursor": cursor_property(),
                "limit": limit_property(100)
            },
            "required": ["post_id", "account_id"]
        }))
    }

    #[instrument(skip(self, args, _context), fields(tool = "list_post_reactions"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let PostIdArg { post_id } = parse_args(&args)?;
        let params: ListReactionsParams = parse_args(&args)?;
        debug!("Listing reactions of post {}", post_id);
        respond(
            "list post reactions",
            self.client.list_post_reactions(&post_id, &params).await,
        )
    }
}

/// Tool to comment on a post.
pub struct CreatePostCommentTool {
    client: Arc<UnipileClient>,
}

impl CreatePostCommentTool {
    pub fn new(client: Arc<UnipileClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CreatePostCommentTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "create_post_comment",
            "Adds a comment to a post, or a reply to a specific comment.",
        )
        .with_category("posts")
        .with_tags(&[
            "linkedin", "post", "comment", "create", "content", "api", "important",
        ])
        .with_annotations(ToolAnnotations::additive_write())
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "post_social_id": {
                    "type": "string",
                    "description": "The social ID of the post to comment on"
                },
                "account_id": account_id_property(),
                "text": {
                    "type": "string",
                    "description": "The comment text; supports mention placeholders like 'Hey {{0}}'"
                },
                "comment_id": {
                    "type": "string",
                    "description": "Reply to this comment instead of commenting on the post"
                },
                "mentions": mentions_property()
            },
            "required": ["post_social_id", "account_id", "text"]
        }))
    }

    #[instrument(skip(self, args, _context), fields(tool = "create_post_comment"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let PostSocialIdArg { post_social_id } = parse_args(&args)?;
        let params: CreateCommentParams = parse_args(&args)?;
        debug!("Commenting on post {}", post_social_id);
        respond(
            "create post comment",
            self.client
                .create_post_comment(&post_social_id, &params)
                .await,
        )
    }
}

/// Tool to react to a post or comment.
pub struct AddReactionToPostTool {
    client: Arc<UnipileClient>,
}

impl AddReactionToPostTool {
    pub fn new(client: Arc<UnipileClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for AddReactionToPostTool {
    fn definition(&self) -> ToolDefinition {
        let reactions: Vec<&str> = ReactionType::ALL.iter().map(|r| r.as_str()).collect();

        ToolDefinition::new(
            "add_reaction_to_post",
            "Adds a reaction to a post, or to a specific comment of that post.",
        )
        .with_category("posts")
        .with_tags(&[
            "linkedin", "post", "reaction", "create", "like", "content", "api", "important",
        ])
        .with_annotations(ToolAnnotations::additive_write())
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "post_social_id": {
                    "type": "string",
                    "description": "The social ID of the post to react to"
                },
                "reaction_type": {
                    "type": "string",
                    "enum": reactions,
                    "description": "The type of reaction"
                },
                "account_id": account_id_property(),
                "comment_id": {
                    "type": "string",
                    "description": "React to this comment instead of the post"
                }
            },
            "required": ["post_social_id", "reaction_type", "account_id"]
        }))
    }

    #[instrument(skip(self, args, _context), fields(tool = "add_reaction_to_post"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let params: AddReactionParams = parse_args(&args)?;
        respond(
            "add reaction",
            self.client.add_reaction_to_post(&params).await,
        )
    }
}

/// Tool to search LinkedIn.
///
/// One tool covers people, companies, posts and jobs; post-specific filters
/// are modeled explicitly and anything else goes through `filters`.
pub struct SearchTool {
    client: Arc<UnipileClient>,
}

impl SearchTool {
    pub fn new(client: Arc<UnipileClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "search",
            "Searches LinkedIn for people, companies, posts or jobs using keywords and filters.",
        )
        .with_category("search")
        .with_tags(&[
            "linkedin", "search", "find", "people", "company", "post", "job", "api", "important",
        ])
        .with_annotations(ToolAnnotations::read_only())
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "account_id": account_id_property(),
                "category": {
                    "type": "string",
                    "enum": ["people", "companies", "posts", "jobs"],
                    "description": "What to search for"
                },
                "api": {
                    "type": "string",
                    "enum": ["classic", "sales_navigator", "recruiter"],
                    "default": "classic",
                    "description": "LinkedIn API to search with"
                },
                "cursor": cursor_property(),
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 100,
                    "description": "Number of items to return (1-50 with the classic API, 1-100 otherwise)"
                },
                "keywords": {
                    "type": "string",
                    "description": "Keywords to search for"
                },
                "sort_by": {
                    "type": "string",
                    "enum": ["relevance", "date"],
                    "description": "Result ordering (posts only)"
                },
                "date_posted": {
                    "type": "string",
                    "enum": ["past_day", "past_week", "past_month"],
                    "description": "Post age (posts only)"
                },
                "content_type": {
                    "type": "string",
                    "enum": ["videos", "images", "live_videos", "collaborative_articles", "documents"],
                    "description": "Post media type (posts only)"
                },
                "posted_by": {
                    "type": "object",
                    "description": "Who posted, e.g. {\"me\": true} or {\"member\": [\"ACoAA...\"]} (posts only)"
                },
                "mentioning": {
                    "type": "object",
                    "description": "Who is mentioned, e.g. {\"company\": [\"1441\"]} (posts only)"
                },
                "author": {
                    "type": "object",
                    "description": "Author attributes, e.g. {\"industry\": [\"4\"]} (posts only)"
                },
                "filters": {
                    "type": "object",
                    "description": "Additional Unipile search filters merged into the request body (e.g. location, industry)"
                }
            },
            "required": ["account_id", "category"]
        }))
    }

    #[instrument(skip(self, args, _context), fields(tool = "search"))]
    async fn execute(
        &self,
        args: serde_json::Value,
        _context: &ToolContext,
    ) -> McpServerResult<ToolResult> {
        let params: SearchParams = parse_args(&args)?;
        debug!("Searching {} via {}", params.category, params.api);
        respond("search", self.client.search(&params).await)
    }
}

/// Get all LinkedIn tools.
pub fn linkedin_tools(client: Arc<UnipileClient>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(ListUserPostsTool::new(client.clone())),
        Arc::new(RetrieveOwnProfileTool::new(client.clone())),
        Arc::new(RetrieveProfileTool::new(client.clone())),
        Arc::new(RetrievePostTool::new(client.clone())),
        Arc::new(ListPostCommentsTool::new(client.clone())),
        Arc::new(CreatePostTool::new(client.clone())),
        Arc::new(ListPostReactionsTool::new(client.clone())),
        Arc::new(CreatePostCommentTool::new(client.clone())),
        Arc::new(AddReactionToPostTool::new(client.clone())),
        Arc::new(SearchTool::new(client)),
    ]
}
