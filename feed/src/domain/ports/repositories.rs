//! Repository port traits
//!
//! These traits define the interface to the remote document store.
//! Implementations are provided by adapters (e.g., Firestore REST).

use async_trait::async_trait;

use crate::domain::entities::{FeedItem, FeedItemId, NewPost, PageCursor, PostUpdate};
use crate::error::DomainError;

/// Remote collection of posts, ordered newest first
#[async_trait]
pub trait FeedRepository: Send + Sync {
    /// Fetch up to `limit` items ordered by descending order key.
    ///
    /// With a cursor, the page starts strictly after the cursor position.
    /// A page shorter than `limit` means the collection is exhausted.
    async fn fetch_page(
        &self,
        cursor: Option<&PageCursor>,
        limit: usize,
    ) -> Result<Vec<FeedItem>, DomainError>;

    /// Find a single post
    async fn find_by_id(&self, id: &FeedItemId) -> Result<Option<FeedItem>, DomainError>;

    /// Create a post (requires a user token for attribution)
    async fn create(&self, post: &NewPost, id_token: Option<&str>)
        -> Result<FeedItem, DomainError>;

    /// Apply a partial update to a post
    async fn update(
        &self,
        id: &FeedItemId,
        update: &PostUpdate,
        id_token: Option<&str>,
    ) -> Result<FeedItem, DomainError>;

    /// Delete a post
    async fn delete(&self, id: &FeedItemId, id_token: Option<&str>) -> Result<(), DomainError>;
}
