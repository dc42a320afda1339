//! Draft posts and the two-step publish workflow.
//!
//! A draft accumulates parameters through chained setters, validates them at
//! `build()`, and `publish()` drives the container-create / container-publish
//! flow with a fixed retry budget per phase.
//!
//! # Example
//!
//! ```rust,ignore
//! let published = client
//!     .post()
//!     .text("Hello Threads!")
//!     .topic_tag("rustlang")
//!     .build()?
//!     .publish()
//!     .await?;
//! ```

use crate::error::{Result, ThreadsError};
use crate::published::PublishedPost;
use crate::types::{
    join_comma, normalize_topic_tag, CarouselItem, CarouselItemKind, GifAttachment, MediaType,
    Payload, ReplyControl,
};
use crate::ThreadsClient;
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

/// Attempts per publish phase.
const PUBLISH_ATTEMPTS: usize = 3;

/// Fixed wait between attempts.
const RETRY_DELAY: Duration = Duration::from_secs(3);

// =============================================================================
// Simple posts
// =============================================================================

/// Builder for a draft post.
pub struct PostDraftBuilder {
    client: ThreadsClient,
    user_id: Option<String>,
    media_type: MediaType,
    text: Option<String>,
    image_url: Option<String>,
    video_url: Option<String>,
    reply_to_id: Option<String>,
    reply_control: Option<ReplyControl>,
    topic_tag: Option<String>,
    link_attachment: Option<String>,
    gif_attachment: Option<GifAttachment>,
    is_spoiler_media: bool,
}

impl PostDraftBuilder {
    pub(crate) fn new(client: ThreadsClient) -> Self {
        Self {
            client,
            user_id: None,
            media_type: MediaType::Text,
            text: None,
            image_url: None,
            video_url: None,
            reply_to_id: None,
            reply_control: None,
            topic_tag: None,
            link_attachment: None,
            gif_attachment: None,
            is_spoiler_media: false,
        }
    }

    /// Override the client's default user id for this draft.
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Set the media type. Defaults to TEXT.
    pub fn media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = media_type;
        self
    }

    /// Set the post text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the image URL (required for IMAGE posts).
    pub fn image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Set the video URL (required for VIDEO posts).
    pub fn video_url(mut self, url: impl Into<String>) -> Self {
        self.video_url = Some(url.into());
        self
    }

    /// Publish as a reply to the given post id.
    pub fn reply_to(mut self, post_id: impl Into<String>) -> Self {
        self.reply_to_id = Some(post_id.into());
        self
    }

    /// Restrict who may reply.
    pub fn reply_control(mut self, control: ReplyControl) -> Self {
        self.reply_control = Some(control);
        self
    }

    /// Set the topic tag. Normalized at build: `.` and `&` stripped, at most
    /// 50 characters.
    pub fn topic_tag(mut self, tag: impl Into<String>) -> Self {
        self.topic_tag = Some(tag.into());
        self
    }

    /// Attach a link preview (TEXT posts only).
    pub fn link_attachment(mut self, url: impl Into<String>) -> Self {
        self.link_attachment = Some(url.into());
        self
    }

    /// Attach a GIF.
    pub fn gif(mut self, gif: GifAttachment) -> Self {
        self.gif_attachment = Some(gif);
        self
    }

    /// Mark the media as a spoiler. Only valid for IMAGE and VIDEO posts.
    pub fn spoiler(mut self, is_spoiler: bool) -> Self {
        self.is_spoiler_media = is_spoiler;
        self
    }

    /// Validate the draft. Fails without any network activity when the
    /// parameters are inconsistent.
    pub fn build(self) -> Result<PostDraft> {
        if self.is_spoiler_media && !self.media_type.supports_spoiler() {
            return Err(ThreadsError::Validation(
                "is_spoiler_media can only be set for IMAGE or VIDEO media types".into(),
            ));
        }

        let user_id = match self.user_id {
            Some(id) => id,
            None => self.client.user_id().to_string(),
        };
        if user_id.is_empty() {
            return Err(ThreadsError::Validation(
                "user_id must be provided or set on client".into(),
            ));
        }

        Ok(PostDraft {
            client: self.client,
            user_id,
            media_type: self.media_type,
            text: self.text,
            image_url: self.image_url,
            video_url: self.video_url,
            reply_to_id: self.reply_to_id,
            reply_control: self.reply_control,
            topic_tag: self.topic_tag.as_deref().map(normalize_topic_tag),
            link_attachment: self.link_attachment,
            gif_attachment: self.gif_attachment,
            is_spoiler_media: self.is_spoiler_media,
        })
    }
}

/// A validated draft post, ready to publish. Consumed by `publish`.
pub struct PostDraft {
    client: ThreadsClient,
    user_id: String,
    media_type: MediaType,
    text: Option<String>,
    image_url: Option<String>,
    video_url: Option<String>,
    pub(crate) reply_to_id: Option<String>,
    reply_control: Option<ReplyControl>,
    topic_tag: Option<String>,
    link_attachment: Option<String>,
    gif_attachment: Option<GifAttachment>,
    is_spoiler_media: bool,
}

impl PostDraft {
    /// Publish this draft: create the media container, then publish it, with
    /// a fixed retry budget per phase.
    pub async fn publish(self) -> Result<PublishedPost> {
        let payload = self.container_payload();
        let container_id = create_container_with_retry(&self.client, &self.user_id, payload).await;
        publish_container_with_retry(&self.client, &self.user_id, &container_id).await
    }

    fn container_payload(&self) -> Value {
        Payload::new()
            .set("media_type", self.media_type.as_str())
            .set_opt("text", self.text.as_deref())
            .set_opt("image_url", self.image_url.as_deref())
            .set_opt("video_url", self.video_url.as_deref())
            .set_opt("reply_to_id", self.reply_to_id.as_deref())
            .set_opt("reply_control", self.reply_control.map(|c| c.as_str()))
            .set_opt("topic_tag", self.topic_tag.as_deref())
            .set_opt("link_attachment", self.link_attachment.as_deref())
            .set_json(
                "gif_attachment",
                self.gif_attachment
                    .as_ref()
                    .and_then(|g| serde_json::to_value(g).ok()),
            )
            .set_flag("is_spoiler_media", self.is_spoiler_media)
            .into_value()
    }
}

// =============================================================================
// Carousel posts
// =============================================================================

/// Builder for a draft carousel post.
pub struct CarouselDraftBuilder {
    client: ThreadsClient,
    user_id: Option<String>,
    items: Vec<CarouselItem>,
    text: Option<String>,
    reply_to_id: Option<String>,
    topic_tag: Option<String>,
}

impl CarouselDraftBuilder {
    pub(crate) fn new(client: ThreadsClient) -> Self {
        Self {
            client,
            user_id: None,
            items: Vec::new(),
            text: None,
            reply_to_id: None,
            topic_tag: None,
        }
    }

    /// Override the client's default user id for this draft.
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Append one carousel child. Children are submitted in insertion order.
    pub fn item(mut self, item: CarouselItem) -> Self {
        self.items.push(item);
        self
    }

    /// Append several carousel children, preserving order.
    pub fn items(mut self, items: impl IntoIterator<Item = CarouselItem>) -> Self {
        self.items.extend(items);
        self
    }

    /// Set the post text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Publish as a reply to the given post id.
    pub fn reply_to(mut self, post_id: impl Into<String>) -> Self {
        self.reply_to_id = Some(post_id.into());
        self
    }

    /// Set the topic tag. Normalized at build like simple posts.
    pub fn topic_tag(mut self, tag: impl Into<String>) -> Self {
        self.topic_tag = Some(tag.into());
        self
    }

    /// Validate the draft.
    pub fn build(self) -> Result<CarouselDraft> {
        let user_id = match self.user_id {
            Some(id) => id,
            None => self.client.user_id().to_string(),
        };
        if user_id.is_empty() {
            return Err(ThreadsError::Validation(
                "user_id must be provided or set on client".into(),
            ));
        }

        Ok(CarouselDraft {
            client: self.client,
            user_id,
            items: self.items,
            text: self.text,
            reply_to_id: self.reply_to_id,
            topic_tag: self.topic_tag.as_deref().map(normalize_topic_tag),
        })
    }
}

/// A validated draft carousel post. Consumed by `publish`.
pub struct CarouselDraft {
    client: ThreadsClient,
    user_id: String,
    items: Vec<CarouselItem>,
    text: Option<String>,
    reply_to_id: Option<String>,
    topic_tag: Option<String>,
}

impl CarouselDraft {
    /// Publish this carousel: create one container per child (a single call
    /// each, no retry), then the parent container with the child ids joined
    /// in order, then publish the parent.
    pub async fn publish(self) -> Result<PublishedPost> {
        let mut child_ids = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let payload = Payload::new()
                .set("media_type", item.kind.as_str())
                .set_flag("is_carousel_item", true);
            let payload = match item.kind {
                CarouselItemKind::Image => payload.set("image_url", item.url.clone()),
                CarouselItemKind::Video => payload.set("video_url", item.url.clone()),
            };
            let id = self
                .client
                .create_media_container(&self.user_id, payload.into_value())
                .await?;
            child_ids.push(id);
        }

        let payload = Payload::new()
            .set("media_type", "CAROUSEL")
            .set("children", join_comma(&child_ids))
            .set_opt("reply_to_id", self.reply_to_id.as_deref())
            .set_opt("text", self.text.as_deref())
            .set_opt("topic_tag", self.topic_tag.as_deref())
            .into_value();
        let container_id = create_container_with_retry(&self.client, &self.user_id, payload).await;
        publish_container_with_retry(&self.client, &self.user_id, &container_id).await
    }
}

// =============================================================================
// Retry loop
// =============================================================================

/// Phase 1: container creation with retry. When every attempt fails the id
/// stays empty and the caller proceeds to the publish phase regardless, where
/// the empty id fails downstream.
async fn create_container_with_retry(
    client: &ThreadsClient,
    user_id: &str,
    payload: Value,
) -> String {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match client.create_media_container(user_id, payload.clone()).await {
            Ok(id) => return id,
            Err(e) => {
                warn!(attempt, error = %e, "failed to create media container");
                tokio::time::sleep(RETRY_DELAY).await;
                if attempt >= PUBLISH_ATTEMPTS {
                    return String::new();
                }
            }
        }
    }
}

/// Phase 2: container publishing with retry. Exhaustion fails the workflow
/// with the last underlying error as the cause.
async fn publish_container_with_retry(
    client: &ThreadsClient,
    user_id: &str,
    container_id: &str,
) -> Result<PublishedPost> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match client.publish_media_container(user_id, container_id).await {
            Ok(post) => return Ok(post),
            Err(e) => {
                warn!(attempt, error = %e, "failed to publish media container");
                tokio::time::sleep(RETRY_DELAY).await;
                if attempt >= PUBLISH_ATTEMPTS {
                    return Err(ThreadsError::PublishExhausted {
                        attempts: PUBLISH_ATTEMPTS,
                        source: Box::new(e),
                    });
                }
            }
        }
    }
}
