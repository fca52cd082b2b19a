//! Domain entities
//!
//! Pure domain models for the feed.

pub mod feed_item;
pub mod user;

pub use feed_item::{
    normalize_tags, FeedItem, FeedItemId, NewPost, OrderKey, PageCursor, PostUpdate,
};
pub use user::{CurrentUser, OwnerId};
