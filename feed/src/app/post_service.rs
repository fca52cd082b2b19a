//! Post service
//!
//! Create, edit and delete posts on behalf of the signed-in user. Only the
//! owner of a post may change it.

use std::sync::Arc;

use crate::app::feed_loader::ItemProps;
use crate::domain::entities::{
    normalize_tags, CurrentUser, FeedItem, FeedItemId, NewPost, OrderKey, PostUpdate,
};
use crate::domain::ports::{FeedRepository, IdentityProvider};
use crate::error::DomainError;

/// What the compose form submits
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    /// Falls back to the user's display name when blank
    pub author: String,
    pub title: Option<String>,
    pub body: String,
    pub tags: Vec<String>,
    pub media_url: Option<String>,
}

/// What the edit form submits. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct PostEdit {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
}

pub struct PostService<R, I>
where
    R: FeedRepository,
    I: IdentityProvider,
{
    posts: Arc<R>,
    identity: Arc<I>,
}

impl<R, I> PostService<R, I>
where
    R: FeedRepository,
    I: IdentityProvider,
{
    pub fn new(posts: Arc<R>, identity: Arc<I>) -> Self {
        Self { posts, identity }
    }

    pub async fn create(&self, draft: PostDraft) -> Result<FeedItem, DomainError> {
        let user = self.signed_in()?;

        let body = draft.body.trim().to_string();
        if body.is_empty() {
            return Err(DomainError::Validation("Post body is required".to_string()));
        }
        let author = match draft.author.trim() {
            "" => user.display_name.trim().to_string(),
            name => name.to_string(),
        };
        if author.is_empty() {
            return Err(DomainError::Validation("Author name is required".to_string()));
        }

        let post = NewPost {
            author,
            title: non_blank(draft.title),
            body,
            tags: normalize_tags(&draft.tags),
            media_url: non_blank(draft.media_url),
            owner: user.id.clone(),
            order_key: OrderKey::now(),
        };

        let created = self.posts.create(&post, user.id_token.as_deref()).await?;
        tracing::info!(id = %created.id, owner = %user.id, "Post created");
        Ok(created)
    }

    /// Edit a post the current user owns. An edit bumps the post to the top.
    pub async fn update(&self, id: &FeedItemId, edit: PostEdit) -> Result<FeedItem, DomainError> {
        let user = self.signed_in()?;
        self.owned_post(id, &user).await?;

        let body = edit.body.map(|b| b.trim().to_string());
        if matches!(body.as_deref(), Some("")) {
            return Err(DomainError::Validation("Post body cannot be empty".to_string()));
        }
        let update = PostUpdate {
            title: edit.title.map(|t| t.trim().to_string()),
            body,
            tags: edit.tags.map(|tags| normalize_tags(&tags)),
            order_key: Some(OrderKey::now()),
        };
        if update.is_empty() {
            return Err(DomainError::Validation("Nothing to update".to_string()));
        }

        let updated = self
            .posts
            .update(id, &update, user.id_token.as_deref())
            .await?;
        tracing::info!(id = %id, "Post updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &FeedItemId) -> Result<(), DomainError> {
        let user = self.signed_in()?;
        self.owned_post(id, &user).await?;

        self.posts.delete(id, user.id_token.as_deref()).await?;
        tracing::info!(id = %id, "Post deleted");
        Ok(())
    }

    /// Delete the post behind `props` and tell its feed on success.
    ///
    /// On failure the feed is left untouched and the error goes back to the caller.
    pub async fn delete_from_feed(&self, props: &ItemProps) -> Result<(), DomainError> {
        self.delete(props.id()).await?;
        props.on_deleted();
        Ok(())
    }

    fn signed_in(&self) -> Result<CurrentUser, DomainError> {
        self.identity
            .current_user()
            .ok_or_else(|| DomainError::Unauthorized("Sign in to manage posts".to_string()))
    }

    async fn owned_post(
        &self,
        id: &FeedItemId,
        user: &CurrentUser,
    ) -> Result<FeedItem, DomainError> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Post {} not found", id)))?;
        if !post.is_owned_by(&user.id) {
            tracing::warn!(id = %id, user = %user.id, "Refused change to a post owned by someone else");
            return Err(DomainError::Forbidden(
                "You do not have permission to change this post".to_string(),
            ));
        }
        Ok(post)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
