//! LinkedIn endpoints.
//!
//! Users, posts, comments, reactions and search. All of them act on behalf
//! of a linked Unipile account, so `account_id` is required throughout.

use super::unipile::{NoQuery, UnipileClient, UnipileResult};
use crate::validate::{self, empty_as_none, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Maximum page size for posts, comments and reactions.
pub const MAX_POSTS_LIMIT: u32 = 100;

/// Maximum page size for classic LinkedIn search.
pub const MAX_CLASSIC_SEARCH_LIMIT: u32 = 50;

/// Maximum page size for Sales Navigator and Recruiter search.
pub const MAX_PREMIUM_SEARCH_LIMIT: u32 = 100;

/// Fallback body for comment requests answered without JSON.
pub const COMMENT_ACK_MESSAGE: &str = "Comment action processed.";

/// Fallback body for reaction requests answered without JSON.
pub const REACTION_ACK_MESSAGE: &str = "Reaction action processed.";

impl UnipileClient {
    /// List posts written by a user or a company.
    #[instrument(skip(self, params), fields(identifier = %identifier))]
    pub async fn list_user_posts(
        &self,
        identifier: &str,
        params: &ListUserPostsParams,
    ) -> UnipileResult<serde_json::Value> {
        validate::required("identifier", identifier)?;
        params.validate()?;
        debug!("Listing posts of {}", identifier);
        self.get_json(&["api", "v1", "users", identifier, "posts"], params)
            .await
    }

    /// Retrieve the profile of the user owning the account.
    #[instrument(skip(self, params), fields(account_id = %params.account_id))]
    pub async fn retrieve_own_profile(
        &self,
        params: &AccountParams,
    ) -> UnipileResult<serde_json::Value> {
        params.validate()?;
        debug!("Fetching own profile");
        self.get_json(&["api", "v1", "users", "me"], params).await
    }

    /// Retrieve a user or company profile by provider ID or public identifier.
    #[instrument(skip(self, params), fields(identifier = %identifier))]
    pub async fn retrieve_profile(
        &self,
        identifier: &str,
        params: &RetrieveProfileParams,
    ) -> UnipileResult<serde_json::Value> {
        validate::required("identifier", identifier)?;
        validate::required("account_id", &params.account_id)?;
        debug!("Fetching profile {}", identifier);
        self.get_json(&["api", "v1", "users", identifier], params).await
    }

    /// Retrieve a post.
    #[instrument(skip(self, params), fields(post_id = %post_id))]
    pub async fn retrieve_post(
        &self,
        post_id: &str,
        params: &AccountParams,
    ) -> UnipileResult<serde_json::Value> {
        validate::required("post_id", post_id)?;
        params.validate()?;
        debug!("Fetching post {}", post_id);
        self.get_json(&["api", "v1", "posts", post_id], params).await
    }

    /// List comments on a post, or replies to one of its comments.
    #[instrument(skip(self, params), fields(post_id = %post_id))]
    pub async fn list_post_comments(
        &self,
        post_id: &str,
        params: &ListCommentsParams,
    ) -> UnipileResult<serde_json::Value> {
        validate::required("post_id", post_id)?;
        params.validate()?;
        debug!("Listing comments of post {}", post_id);
        self.get_json(&["api", "v1", "posts", post_id, "comments"], params)
            .await
    }

    /// Publish a post.
    #[instrument(skip(self, params), fields(account_id = %params.account_id))]
    pub async fn create_post(&self, params: &CreatePostParams) -> UnipileResult<serde_json::Value> {
        params.validate()?;
        debug!("Creating post");
        self.post_json(&["api", "v1", "posts"], &NoQuery {}, params)
            .await
    }

    /// List reactions on a post or on one of its comments.
    #[instrument(skip(self, params), fields(post_id = %post_id))]
    pub async fn list_post_reactions(
        &self,
        post_id: &str,
        params: &ListReactionsParams,
    ) -> UnipileResult<serde_json::Value> {
        validate::required("post_id", post_id)?;
        params.validate()?;
        debug!("Listing reactions of post {}", post_id);
        self.get_json(&["api", "v1", "posts", post_id, "reactions"], params)
            .await
    }

    /// Comment on a post, or reply to one of its comments.
    #[instrument(skip(self, params), fields(post_social_id = %post_social_id))]
    pub async fn create_post_comment(
        &self,
        post_social_id: &str,
        params: &CreateCommentParams,
    ) -> UnipileResult<serde_json::Value> {
        validate::required("post_social_id", post_social_id)?;
        params.validate()?;
        debug!("Commenting on post {}", post_social_id);
        self.post_json_lenient(
            &["api", "v1", "posts", post_social_id, "comments"],
            params,
            COMMENT_ACK_MESSAGE,
        )
        .await
    }

    /// React to a post or to one of its comments.
    #[instrument(skip(self, params), fields(post_social_id = %params.post_social_id))]
    pub async fn add_reaction_to_post(
        &self,
        params: &AddReactionParams,
    ) -> UnipileResult<serde_json::Value> {
        params.validate()?;
        debug!("Reacting with '{}'", params.reaction_type);
        self.post_json_lenient(&["api", "v1", "posts", "reaction"], params, REACTION_ACK_MESSAGE)
            .await
    }

    /// Search people, companies, posts or jobs.
    #[instrument(skip(self, params), fields(category = %params.category, api = %params.api))]
    pub async fn search(&self, params: &SearchParams) -> UnipileResult<serde_json::Value> {
        params.validate()?;
        debug!("Searching LinkedIn");
        self.post_json(
            &["api", "v1", "linkedin", "search"],
            &params.query(),
            &params.body(),
        )
        .await
    }
}

/// Query carrying only the acting account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountParams {
    /// Unipile account performing the request.
    pub account_id: String,
}

impl AccountParams {
    /// Create params for the given account.
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
        }
    }

    /// Check the account ID.
    pub fn validate(&self) -> ValidationResult {
        validate::required("account_id", &self.account_id)
    }
}

/// Query parameters for listing a user's or company's posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListUserPostsParams {
    /// Unipile account performing the request.
    pub account_id: String,

    /// Pagination cursor.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,

    /// Page size (1-100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Whether the identifier refers to a company.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_company: Option<bool>,
}

impl ListUserPostsParams {
    /// Validate account and page size.
    pub fn validate(&self) -> ValidationResult {
        validate::required("account_id", &self.account_id)?;
        validate::limit("limit", self.limit, 1, MAX_POSTS_LIMIT)
    }
}

/// Query parameters for retrieving a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveProfileParams {
    /// Unipile account performing the request.
    pub account_id: String,

    /// Profile sections to include, e.g. `*` or `experience,skills`.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub linkedin_sections: Option<String>,

    /// LinkedIn API flavour used for the lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_api: Option<LinkedinApi>,

    /// Whether the profile owner is notified of the visit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify: Option<bool>,
}

/// Query parameters for listing comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListCommentsParams {
    /// Unipile account performing the request.
    pub account_id: String,

    /// List replies to this comment instead of top-level comments.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<String>,

    /// Pagination cursor.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,

    /// Page size (1-100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ListCommentsParams {
    /// Validate account and page size.
    pub fn validate(&self) -> ValidationResult {
        validate::required("account_id", &self.account_id)?;
        validate::limit("limit", self.limit, 1, MAX_POSTS_LIMIT)
    }
}

/// Query parameters for listing reactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListReactionsParams {
    /// Unipile account performing the request.
    pub account_id: String,

    /// List reactions on this comment instead of the post.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<String>,

    /// Pagination cursor.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,

    /// Page size (1-100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ListReactionsParams {
    /// Validate account and page size.
    pub fn validate(&self) -> ValidationResult {
        validate::required("account_id", &self.account_id)?;
        validate::limit("limit", self.limit, 1, MAX_POSTS_LIMIT)
    }
}

/// Body of a new post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostParams {
    /// Authoring Unipile account.
    pub account_id: String,

    /// Post text.
    pub text: String,

    /// Mention objects referenced from the text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentions: Option<Vec<serde_json::Value>>,

    /// URL rendered as a link card.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub external_link: Option<String>,
}

impl CreatePostParams {
    /// Validate required fields and mention shapes.
    pub fn validate(&self) -> ValidationResult {
        validate::required("account_id", &self.account_id)?;
        validate::required("text", &self.text)?;
        validate::objects("mentions", self.mentions.as_deref())
    }
}

/// Body of a new comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentParams {
    /// Commenting Unipile account.
    pub account_id: String,

    /// Comment text; may reference mentions as `{{0}}`, `{{1}}`, ...
    pub text: String,

    /// Reply to this comment instead of commenting on the post.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<String>,

    /// Mention objects referenced from the text.
    #[serde(default, alias = "mentions_body", skip_serializing_if = "Option::is_none")]
    pub mentions: Option<Vec<serde_json::Value>>,
}

impl CreateCommentParams {
    /// Validate required fields and mention shapes.
    pub fn validate(&self) -> ValidationResult {
        validate::required("account_id", &self.account_id)?;
        validate::required("text", &self.text)?;
        validate::objects("mentions", self.mentions.as_deref())
    }
}

/// LinkedIn reaction kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    Like,
    Celebrate,
    Love,
    Insightful,
    Funny,
    Support,
}

impl ReactionType {
    /// All reaction kinds, in schema order.
    pub const ALL: [ReactionType; 6] = [
        ReactionType::Like,
        ReactionType::Celebrate,
        ReactionType::Love,
        ReactionType::Insightful,
        ReactionType::Funny,
        ReactionType::Support,
    ];

    /// Wire name of the reaction.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionType::Like => "like",
            ReactionType::Celebrate => "celebrate",
            ReactionType::Love => "love",
            ReactionType::Insightful => "insightful",
            ReactionType::Funny => "funny",
            ReactionType::Support => "support",
        }
    }
}

impl std::fmt::Display for ReactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a reaction.
///
/// The post is named `post_social_id` in tool arguments and `post_id` on
/// the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddReactionParams {
    /// Reacting Unipile account.
    pub account_id: String,

    /// Social ID of the post.
    #[serde(rename(serialize = "post_id"), alias = "post_id")]
    pub post_social_id: String,

    /// Reaction kind.
    pub reaction_type: ReactionType,

    /// React to this comment instead of the post.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<String>,
}

impl AddReactionParams {
    /// Validate required identifiers.
    pub fn validate(&self) -> ValidationResult {
        validate::required("account_id", &self.account_id)?;
        validate::required("post_social_id", &self.post_social_id)
    }
}

/// LinkedIn API flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkedinApi {
    #[default]
    Classic,
    SalesNavigator,
    Recruiter,
}

impl LinkedinApi {
    /// Wire name of the API flavour.
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkedinApi::Classic => "classic",
            LinkedinApi::SalesNavigator => "sales_navigator",
            LinkedinApi::Recruiter => "recruiter",
        }
    }

    /// Largest page size the flavour accepts.
    pub fn max_limit(&self) -> u32 {
        match self {
            LinkedinApi::Classic => MAX_CLASSIC_SEARCH_LIMIT,
            LinkedinApi::SalesNavigator | LinkedinApi::Recruiter => MAX_PREMIUM_SEARCH_LIMIT,
        }
    }
}

impl std::fmt::Display for LinkedinApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a search looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchCategory {
    People,
    Companies,
    Posts,
    Jobs,
}

impl SearchCategory {
    /// Wire name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchCategory::People => "people",
            SearchCategory::Companies => "companies",
            SearchCategory::Posts => "posts",
            SearchCategory::Jobs => "jobs",
        }
    }
}

impl std::fmt::Display for SearchCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering of post search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    Relevance,
    Date,
}

/// Age filter for post search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePosted {
    PastDay,
    PastWeek,
    PastMonth,
}

/// Media filter for post search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostContentType {
    Videos,
    Images,
    LiveVideos,
    CollaborativeArticles,
    Documents,
}

/// Parameters of a LinkedIn search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Unipile account performing the search.
    pub account_id: String,

    /// Pagination cursor.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,

    /// Page size (1-50 classic, 1-100 otherwise).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// LinkedIn API flavour.
    #[serde(default)]
    pub api: LinkedinApi,

    /// What to search for.
    pub category: SearchCategory,

    /// Free-text keywords.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,

    /// Post ordering (posts only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,

    /// Post age (posts only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_posted: Option<DatePosted>,

    /// Post media type (posts only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<PostContentType>,

    /// Who posted, e.g. `{"me": true}` (posts only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_by: Option<serde_json::Value>,

    /// Who is mentioned, e.g. `{"company": ["1441"]}` (posts only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentioning: Option<serde_json::Value>,

    /// Author attributes, e.g. `{"industry": ["4"]}` (posts only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<serde_json::Value>,

    /// Additional body filters passed through as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Query string of a search request.
#[derive(Debug, Serialize)]
pub struct SearchQuery<'a> {
    account_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
}

impl SearchParams {
    /// Create a search of the given category with default settings.
    pub fn new(account_id: impl Into<String>, category: SearchCategory) -> Self {
        Self {
            account_id: account_id.into(),
            cursor: None,
            limit: None,
            api: LinkedinApi::default(),
            category,
            keywords: None,
            sort_by: None,
            date_posted: None,
            content_type: None,
            posted_by: None,
            mentioning: None,
            author: None,
            filters: None,
        }
    }

    /// Validate the combination of category, API and filters.
    pub fn validate(&self) -> ValidationResult {
        validate::required("account_id", &self.account_id)?;
        validate::limit("limit", self.limit, 1, self.api.max_limit())?;

        if self.category != SearchCategory::Posts {
            let post_only = [
                ("sort_by", self.sort_by.is_some()),
                ("date_posted", self.date_posted.is_some()),
                ("content_type", self.content_type.is_some()),
                ("posted_by", self.posted_by.is_some()),
                ("mentioning", self.mentioning.is_some()),
                ("author", self.author.is_some()),
            ];
            if let Some((field, _)) = post_only.iter().find(|(_, set)| *set) {
                return Err(ValidationError::new(
                    *field,
                    format!("only applies to category 'posts', not '{}'", self.category),
                ));
            }
        }

        for (field, value) in [
            ("posted_by", &self.posted_by),
            ("mentioning", &self.mentioning),
            ("author", &self.author),
        ] {
            if matches!(value, Some(v) if !v.is_object()) {
                return Err(ValidationError::new(field, "must be an object"));
            }
        }

        if let Some(filters) = &self.filters {
            for reserved in ["api", "category"] {
                if filters.contains_key(reserved) {
                    return Err(ValidationError::new(
                        "filters",
                        format!("'{}' must be given as a top-level argument", reserved),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Query string part of the request.
    pub fn query(&self) -> SearchQuery<'_> {
        SearchQuery {
            account_id: &self.account_id,
            cursor: self.cursor.as_deref(),
            limit: self.limit,
        }
    }

    /// JSON body of the request.
    ///
    /// Extra `filters` go in first so the modeled fields take precedence.
    pub fn body(&self) -> serde_json::Value {
        let mut body = self.filters.clone().unwrap_or_default();

        body.insert("api".to_string(), self.api.as_str().into());
        body.insert("category".to_string(), self.category.as_str().into());

        let mut put = |key: &str, value: Option<serde_json::Value>| {
            if let Some(value) = value {
                body.insert(key.to_string(), value);
            }
        };
        put("keywords", self.keywords.clone().map(Into::into));
        put("sort_by", self.sort_by.map(to_json));
        put("date_posted", self.date_posted.map(to_json));
        put("content_type", self.content_type.map(to_json));
        put("posted_by", self.posted_by.clone());
        put("mentioning", self.mentioning.clone());
        put("author", self.author.clone());

        serde_json::Value::Object(body)
    }
}

fn to_json<T: Serialize>(value: T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}
