//! Pure Threads REST API client.
//!
//! A minimal typed client for the Threads graph API. Supports profile and
//! post retrieval, the two-step publish flow (media container creation and
//! publishing), interactions (likes, reposts, replies), search, webhook
//! subscription, and access-token management.
//!
//! # Example
//!
//! ```rust,ignore
//! use threads_client::ThreadsClient;
//!
//! let client = ThreadsClient::new(access_token, user_id)?;
//!
//! let published = client
//!     .post()
//!     .text("Hello Threads!")
//!     .build()?
//!     .publish()
//!     .await?;
//!
//! published.like().await?;
//! ```

pub mod draft;
pub mod error;
pub mod published;
pub mod types;

pub use draft::{CarouselDraft, CarouselDraftBuilder, PostDraft, PostDraftBuilder};
pub use error::{Result, ThreadsError};
pub use published::{PostsPage, PublishedPost};
pub use types::*;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

use types::{join_comma, ContainerResponse, PagedPostsRaw, Payload, SearchRaw, TokenResponse};

const DEFAULT_BASE_URL: &str = "https://graph.threads.net";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Typed client for the Threads graph API.
///
/// Holds the bearer token and the HTTP connection pool. Cloning is cheap and
/// clones share both, so a token refresh through any handle is visible to
/// all of them.
#[derive(Debug, Clone)]
pub struct ThreadsClient {
    http_client: reqwest::Client,
    access_token: Arc<RwLock<String>>,
    user_id: String,
    base_url: String,
}

impl ThreadsClient {
    /// Create a client for the default API host with the default 10 s
    /// per-request timeout.
    pub fn new(access_token: impl Into<String>, user_id: impl Into<String>) -> Result<Self> {
        Self::with_config(access_token, user_id, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom base URL and per-request timeout.
    pub fn with_config(
        access_token: impl Into<String>,
        user_id: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ThreadsError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            access_token: Arc::new(RwLock::new(access_token.into())),
            user_id: user_id.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create from environment variables `THREADS_ACCESS_TOKEN` and
    /// `THREADS_USER_ID`.
    pub fn from_env() -> Result<Self> {
        let access_token = std::env::var("THREADS_ACCESS_TOKEN")
            .map_err(|_| ThreadsError::Config("THREADS_ACCESS_TOKEN not set".into()))?;
        let user_id = std::env::var("THREADS_USER_ID")
            .map_err(|_| ThreadsError::Config("THREADS_USER_ID not set".into()))?;
        Self::new(access_token, user_id)
    }

    /// Get the current access token.
    pub fn access_token(&self) -> String {
        self.access_token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Get the default user id.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a draft post. Chain setters, then `build()` and `publish()`.
    pub fn post(&self) -> PostDraftBuilder {
        PostDraftBuilder::new(self.clone())
    }

    /// Start a draft carousel post.
    pub fn carousel(&self) -> CarouselDraftBuilder {
        CarouselDraftBuilder::new(self.clone())
    }

    // =========================================================================
    // Request core
    // =========================================================================

    /// Issue a request and decode the JSON response.
    ///
    /// The token is read at call time, so a refresh that lands mid-workflow
    /// applies to every subsequent request (last writer wins).
    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let token = self.access_token();

        debug!(method = %method, url = %url, "Threads API request");

        let mut request = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(token);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(ref body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Threads request failed to send");
            ThreadsError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&error_text)
                .ok()
                .and_then(|v| {
                    v.get("error").map(|e| match e {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                });
            warn!(method = %method, url = %url, status = %status, "Threads API error");
            return Err(ThreadsError::RequestFailed {
                method: method.to_string(),
                url,
                status: status.as_u16(),
                message,
            });
        }

        response.json::<T>().await.map_err(|e| ThreadsError::Decode {
            url,
            message: e.to_string(),
        })
    }

    fn resolve_user_id(&self, user_id: Option<&str>) -> Result<String> {
        let id = user_id.unwrap_or(&self.user_id);
        if id.is_empty() {
            return Err(ThreadsError::Validation(
                "user_id must be provided or set on client".into(),
            ));
        }
        Ok(id.to_string())
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    /// Exchange a short-lived token for a long-lived one. Does not change
    /// the client's stored token.
    pub async fn get_long_lived_access_token(
        &self,
        access_token: Option<&str>,
        client_secret: &str,
    ) -> Result<String> {
        let token = self.token_or_stored(access_token)?;
        let query = [
            ("grant_type", "th_extend_token".to_string()),
            ("access_token", token),
            ("client_secret", client_secret.to_string()),
        ];
        let data: TokenResponse = self
            .request_json(Method::GET, "access_token", &query, None)
            .await?;

        data.access_token.ok_or_else(|| ThreadsError::Decode {
            url: format!("{}/access_token", self.base_url),
            message: "no access_token in extend response".into(),
        })
    }

    /// Refresh a long-lived token. On success the client's stored token is
    /// replaced and used for all subsequent requests.
    pub async fn refresh_access_token(&self, access_token: Option<&str>) -> Result<String> {
        let token = self.token_or_stored(access_token)?;
        let query = [
            ("grant_type", "th_refresh_token".to_string()),
            ("access_token", token),
        ];
        let data: TokenResponse = self
            .request_json(Method::GET, "refresh_access_token", &query, None)
            .await?;

        let new_token = data.access_token.ok_or_else(|| ThreadsError::Decode {
            url: format!("{}/refresh_access_token", self.base_url),
            message: "no access_token in refresh response".into(),
        })?;

        *self.access_token.write().unwrap_or_else(|e| e.into_inner()) = new_token.clone();
        Ok(new_token)
    }

    fn token_or_stored(&self, access_token: Option<&str>) -> Result<String> {
        let token = match access_token {
            Some(t) => t.to_string(),
            None => self.access_token(),
        };
        if token.is_empty() {
            return Err(ThreadsError::Validation(
                "access_token must be provided or set on client".into(),
            ));
        }
        Ok(token)
    }

    // =========================================================================
    // Profiles and posts
    // =========================================================================

    /// Get a user's profile. `fields` narrows the returned field set; pass
    /// an empty slice for the server default.
    pub async fn get_user_profile(&self, user_id: &str, fields: &[&str]) -> Result<UserProfile> {
        let query = Self::fields_query(fields);
        self.request_json(Method::GET, user_id, &query, None).await
    }

    /// List a user's posts. `user_id` falls back to the client default.
    pub async fn list_user_posts(
        &self,
        user_id: Option<&str>,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<PostsPage> {
        let user_id = self.resolve_user_id(user_id)?;
        let mut query = vec![("limit", limit.to_string())];
        if let Some(cursor) = cursor {
            if !cursor.is_empty() {
                query.push(("cursor", cursor.to_string()));
            }
        }
        let raw: PagedPostsRaw = self
            .request_json(Method::GET, &format!("{user_id}/threads"), &query, None)
            .await?;

        let posts = raw
            .data
            .into_iter()
            .map(|data| PublishedPost::new(self.clone(), data))
            .collect();
        Ok(PostsPage {
            posts,
            paging: raw.paging,
        })
    }

    /// Fetch a published post by id.
    pub async fn get_post(&self, post_id: &str, fields: &[&str]) -> Result<PublishedPost> {
        let query = Self::fields_query(fields);
        let data: ThreadPost = self.request_json(Method::GET, post_id, &query, None).await?;
        Ok(PublishedPost::new(self.clone(), data))
    }

    fn fields_query(fields: &[&str]) -> Vec<(&'static str, String)> {
        if fields.is_empty() {
            Vec::new()
        } else {
            vec![("fields", join_comma(fields))]
        }
    }

    pub(crate) async fn get_post_resource(&self, post_id: &str) -> Result<ThreadPost> {
        self.request_json(Method::GET, post_id, &[], None).await
    }

    // =========================================================================
    // Containers
    // =========================================================================

    /// Step 1 of the publish flow: create a media container. Returns the
    /// container id.
    pub(crate) async fn create_media_container(
        &self,
        user_id: &str,
        payload: Value,
    ) -> Result<String> {
        let response: ContainerResponse = self
            .request_json(
                Method::POST,
                &format!("{user_id}/threads"),
                &[],
                Some(payload),
            )
            .await?;
        Ok(response.id)
    }

    /// Step 2 of the publish flow: publish a media container, then fetch the
    /// resulting post.
    pub(crate) async fn publish_media_container(
        &self,
        user_id: &str,
        container_id: &str,
    ) -> Result<PublishedPost> {
        let payload = Payload::new().set("creation_id", container_id).into_value();
        let response: ContainerResponse = self
            .request_json(
                Method::POST,
                &format!("{user_id}/threads_publish"),
                &[],
                Some(payload),
            )
            .await?;
        let data = self.get_post_resource(&response.id).await?;
        Ok(PublishedPost::new(self.clone(), data))
    }

    // =========================================================================
    // Post mutations and interactions
    // =========================================================================

    pub(crate) async fn edit_post_resource(
        &self,
        post_id: &str,
        text: Option<&str>,
        media_ids: Option<&[String]>,
    ) -> Result<ThreadPost> {
        let payload = Payload::new()
            .set_if_some("text", text)
            .set_if_some("media_ids", media_ids.map(join_comma).as_deref())
            .into_value();
        self.request_json(
            Method::PATCH,
            &format!("threads/{post_id}"),
            &[],
            Some(payload),
        )
        .await
    }

    pub(crate) async fn delete_post_resource(&self, post_id: &str) -> Result<PostActionResult> {
        self.request_json(Method::DELETE, &format!("threads/{post_id}"), &[], None)
            .await
    }

    pub(crate) async fn like_post_resource(&self, post_id: &str) -> Result<PostActionResult> {
        self.request_json(Method::POST, &format!("threads/{post_id}/likes"), &[], None)
            .await
    }

    pub(crate) async fn unlike_post_resource(&self, post_id: &str) -> Result<PostActionResult> {
        self.request_json(
            Method::DELETE,
            &format!("threads/{post_id}/likes"),
            &[],
            None,
        )
        .await
    }

    pub(crate) async fn repost_post_resource(
        &self,
        post_id: &str,
        comment: Option<&str>,
    ) -> Result<PostActionResult> {
        let payload = Payload::new()
            .set("post_id", post_id)
            .set_opt("comment", comment)
            .into_value();
        self.request_json(
            Method::POST,
            &format!("threads/{post_id}/reposts"),
            &[],
            Some(payload),
        )
        .await
    }

    // =========================================================================
    // Relationships
    // =========================================================================

    /// Follow a user.
    pub async fn follow_user(&self, target_user_id: &str) -> Result<RelationshipResult> {
        self.request_json(Method::POST, &format!("{target_user_id}/follow"), &[], None)
            .await
    }

    /// Unfollow a user.
    pub async fn unfollow_user(&self, target_user_id: &str) -> Result<RelationshipResult> {
        self.request_json(
            Method::DELETE,
            &format!("{target_user_id}/follow"),
            &[],
            None,
        )
        .await
    }

    // =========================================================================
    // Search and webhooks
    // =========================================================================

    /// Search for posts or users.
    pub async fn search(
        &self,
        query: &str,
        kind: SearchKind,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<SearchPage> {
        let mut params = vec![
            ("q", query.to_string()),
            ("type", kind.as_str().to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(cursor) = cursor {
            if !cursor.is_empty() {
                params.push(("cursor", cursor.to_string()));
            }
        }
        let raw: SearchRaw = self.request_json(Method::GET, "search", &params, None).await?;
        Ok(SearchPage {
            results: raw.data,
            paging: raw.paging,
        })
    }

    /// Subscribe to webhook events. `fields` selects the event fields to
    /// subscribe to; pass an empty slice for the server default.
    pub async fn subscribe_webhook(
        &self,
        callback_url: &str,
        verify_token: &str,
        fields: &[&str],
    ) -> Result<SubscriptionResult> {
        let fields_joined = join_comma(fields);
        let payload = Payload::new()
            .set("callback_url", callback_url)
            .set("verify_token", verify_token)
            .set_opt("fields", Some(fields_joined.as_str()))
            .into_value();
        self.request_json(Method::POST, "webhooks", &[], Some(payload))
            .await
    }
}
