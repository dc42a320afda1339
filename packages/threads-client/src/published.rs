//! Wrapper around a post that exists server-side.

use crate::draft::PostDraft;
use crate::error::Result;
use crate::types::{Paging, PostActionResult, ThreadPost};
use crate::ThreadsClient;

/// A page of published posts with pagination metadata.
#[derive(Clone)]
pub struct PostsPage {
    pub posts: Vec<PublishedPost>,
    pub paging: Paging,
}

/// A published post: an immutable snapshot plus the client used for further
/// operations. The snapshot is only ever replaced whole, by `refresh` or
/// `edit`.
#[derive(Debug, Clone)]
pub struct PublishedPost {
    client: ThreadsClient,
    data: ThreadPost,
    parent: Option<Box<PublishedPost>>,
}

impl PublishedPost {
    pub(crate) fn new(client: ThreadsClient, data: ThreadPost) -> Self {
        Self {
            client,
            data,
            parent: None,
        }
    }

    /// The unique post id.
    pub fn id(&self) -> &str {
        &self.data.id
    }

    /// The raw post snapshot.
    pub fn data(&self) -> &ThreadPost {
        &self.data
    }

    /// The post this one replies to. Set only when this post was created via
    /// `reply`; a plain back-reference, never re-fetched.
    pub fn parent(&self) -> Option<&PublishedPost> {
        self.parent.as_deref()
    }

    /// Re-fetch the post and replace the local snapshot. Returns self for
    /// chaining.
    pub async fn refresh(&mut self) -> Result<&mut Self> {
        let id = self.data.id.clone();
        self.data = self.client.get_post_resource(&id).await?;
        Ok(self)
    }

    /// Edit the post. Only the supplied fields are sent; the local snapshot
    /// is replaced with the server's response.
    pub async fn edit(
        &mut self,
        text: Option<&str>,
        media_ids: Option<&[String]>,
    ) -> Result<&mut Self> {
        let id = self.data.id.clone();
        self.data = self.client.edit_post_resource(&id, text, media_ids).await?;
        Ok(self)
    }

    /// Delete this post.
    pub async fn delete(&self) -> Result<PostActionResult> {
        self.client.delete_post_resource(&self.data.id).await
    }

    /// Like this post.
    pub async fn like(&self) -> Result<PostActionResult> {
        self.client.like_post_resource(&self.data.id).await
    }

    /// Remove a like from this post.
    pub async fn unlike(&self) -> Result<PostActionResult> {
        self.client.unlike_post_resource(&self.data.id).await
    }

    /// Repost this post, optionally with a comment.
    pub async fn repost(&self, comment: Option<&str>) -> Result<PostActionResult> {
        self.client.repost_post_resource(&self.data.id, comment).await
    }

    /// Publish the given draft as a reply to this post. The draft's reply
    /// target is overridden with this post's id, and the returned wrapper's
    /// `parent` points back at this one.
    pub async fn reply(&self, mut draft: PostDraft) -> Result<PublishedPost> {
        draft.reply_to_id = Some(self.data.id.clone());
        let mut published = draft.publish().await?;
        published.parent = Some(Box::new(self.clone()));
        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapper(id: &str) -> PublishedPost {
        let client = ThreadsClient::new("token", "42").expect("client builds");
        let data = ThreadPost {
            id: id.to_string(),
            ..Default::default()
        };
        PublishedPost::new(client, data)
    }

    #[test]
    fn test_id_and_data_accessors() {
        let post = wrapper("123");
        assert_eq!(post.id(), "123");
        assert_eq!(post.data().id, "123");
    }

    #[test]
    fn test_parent_unset_by_default() {
        assert!(wrapper("123").parent().is_none());
    }
}
