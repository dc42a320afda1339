//! Threads API request and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Media
// =============================================================================

/// Media type of a simple (non-carousel) post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaType {
    /// Text-only post
    #[default]
    Text,
    /// Single image post
    Image,
    /// Single video post
    Video,
}

impl MediaType {
    /// Wire representation expected by the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Text => "TEXT",
            MediaType::Image => "IMAGE",
            MediaType::Video => "VIDEO",
        }
    }

    /// Whether the spoiler flag may be set for this media type.
    pub fn supports_spoiler(&self) -> bool {
        matches!(self, MediaType::Image | MediaType::Video)
    }
}

/// Media type of a single carousel child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselItemKind {
    Image,
    Video,
}

impl CarouselItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarouselItemKind::Image => "IMAGE",
            CarouselItemKind::Video => "VIDEO",
        }
    }
}

/// One ordered child of a carousel post.
#[derive(Debug, Clone)]
pub struct CarouselItem {
    pub kind: CarouselItemKind,
    pub url: String,
}

impl CarouselItem {
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            kind: CarouselItemKind::Image,
            url: url.into(),
        }
    }

    pub fn video(url: impl Into<String>) -> Self {
        Self {
            kind: CarouselItemKind::Video,
            url: url.into(),
        }
    }
}

/// Restriction on who may reply to a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyControl {
    Everyone,
    MentionedUsers,
    Followers,
}

impl ReplyControl {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyControl::Everyone => "everyone",
            ReplyControl::MentionedUsers => "mentioned_users",
            ReplyControl::Followers => "followers",
        }
    }
}

/// A GIF attachment for a post. Tenor is the only supported provider.
#[derive(Debug, Clone, Serialize)]
pub struct GifAttachment {
    pub gif_id: String,
    pub provider: String,
}

impl GifAttachment {
    /// Create a Tenor GIF attachment.
    pub fn tenor(gif_id: impl Into<String>) -> Self {
        Self {
            gif_id: gif_id.into(),
            provider: "TENOR".to_string(),
        }
    }
}

// =============================================================================
// Responses
// =============================================================================

/// A published post snapshot as returned by the API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadPost {
    #[serde(default)]
    pub id: String,
    pub text: Option<String>,
    pub author_id: Option<String>,
    pub created_time: Option<String>,
    pub reply_to_id: Option<String>,
    #[serde(default)]
    pub media: Vec<PostMedia>,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub repost_count: u64,
    #[serde(default)]
    pub quote_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    pub visibility: Option<String>,
    pub link_attachment_url: Option<String>,
}

/// Media attached to a published post (image, video, or gif).
#[derive(Debug, Clone, Deserialize)]
pub struct PostMedia {
    #[serde(default)]
    pub id: String,
    pub media_type: Option<String>,
    #[serde(default)]
    pub url: String,
    pub thumbnail_url: Option<String>,
}

/// User profile information.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
    pub created_time: Option<String>,
}

/// Result of a post action (like, unlike, repost, delete).
#[derive(Debug, Clone, Deserialize)]
pub struct PostActionResult {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub success: bool,
}

/// Result of a follow/unfollow action.
#[derive(Debug, Clone, Deserialize)]
pub struct RelationshipResult {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub following: bool,
}

/// Result of a webhook subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionResult {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub callback_url: String,
    #[serde(default)]
    pub verify_token: String,
    pub status: Option<String>,
}

/// A single search hit (user or post).
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub text: Option<String>,
    pub username: Option<String>,
    pub name: Option<String>,
}

/// Pagination cursor pair. Either token may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Paging {
    pub previous: Option<String>,
    pub next: Option<String>,
}

/// A page of search results with pagination metadata.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub results: Vec<SearchResult>,
    pub paging: Paging,
}

/// What to search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchKind {
    #[default]
    Posts,
    Users,
}

impl SearchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Posts => "posts",
            SearchKind::Users => "users",
        }
    }
}

/// Raw page of posts from the API (for internal parsing).
#[derive(Debug, Deserialize)]
pub(crate) struct PagedPostsRaw {
    #[serde(default)]
    pub data: Vec<ThreadPost>,
    #[serde(default)]
    pub paging: Paging,
}

/// Raw search response from the API (for internal parsing).
#[derive(Debug, Deserialize)]
pub(crate) struct SearchRaw {
    #[serde(default)]
    pub data: Vec<SearchResult>,
    #[serde(default)]
    pub paging: Paging,
}

/// Response from creating or publishing a media container.
#[derive(Debug, Deserialize)]
pub(crate) struct ContainerResponse {
    pub id: String,
}

/// Response from the token endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
}

// =============================================================================
// Payload builder
// =============================================================================

/// Dynamic request payload. Optional fields are inserted only when present
/// and non-empty, so absent keys fall through to server-side defaults.
#[derive(Debug, Default)]
pub(crate) struct Payload(serde_json::Map<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a required string field unconditionally.
    pub fn set(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.insert(key.to_string(), Value::String(value.into()));
        self
    }

    /// Insert a string field only when it is `Some` and non-empty.
    pub fn set_opt(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(v) = value {
            if !v.is_empty() {
                self.0.insert(key.to_string(), Value::String(v.to_string()));
            }
        }
        self
    }

    /// Insert a string field whenever it is `Some`, even when empty. Used by
    /// edit, where an explicitly supplied empty value must still be sent.
    pub fn set_if_some(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(v) = value {
            self.0.insert(key.to_string(), Value::String(v.to_string()));
        }
        self
    }

    /// Insert the string `"true"` only when the flag is set.
    pub fn set_flag(mut self, key: &str, value: bool) -> Self {
        if value {
            self.0
                .insert(key.to_string(), Value::String("true".to_string()));
        }
        self
    }

    /// Insert a pre-serialized JSON value only when present.
    pub fn set_json(mut self, key: &str, value: Option<Value>) -> Self {
        if let Some(v) = value {
            self.0.insert(key.to_string(), v);
        }
        self
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

// =============================================================================
// Utilities
// =============================================================================

/// Normalize a topic tag: strip `.` and `&`, then truncate to 50 characters.
pub(crate) fn normalize_topic_tag(tag: &str) -> String {
    tag.chars()
        .filter(|c| *c != '.' && *c != '&')
        .take(50)
        .collect()
}

/// Join a list-valued parameter into the single comma-separated field the
/// API expects.
pub(crate) fn join_comma<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|v| v.as_ref())
        .collect::<Vec<_>>()
        .join(",")
}
