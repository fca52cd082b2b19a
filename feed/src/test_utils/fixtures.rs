//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.

use std::collections::BTreeSet;

use crate::domain::entities::{CurrentUser, FeedItem, FeedItemId, OrderKey, OwnerId};

/// Create a test post with the given id and order key
pub fn test_item(id: &str, order_key: i64) -> FeedItem {
    FeedItem {
        id: FeedItemId::new(id),
        author: format!("author-{}", id.to_lowercase()),
        body: format!("Body of post {}", id),
        title: None,
        media_url: None,
        avatar_url: None,
        tags: BTreeSet::new(),
        like_count: 0,
        comment_count: 0,
        order_key: OrderKey(order_key),
        owner: None,
    }
}

/// Create a test post owned by `owner`
pub fn test_item_owned(id: &str, order_key: i64, owner: &OwnerId) -> FeedItem {
    FeedItem {
        owner: Some(owner.clone()),
        ..test_item(id, order_key)
    }
}

/// Create posts newest first, in the order given
pub fn test_items(ids: &[&str]) -> Vec<FeedItem> {
    let count = ids.len() as i64;
    ids.iter()
        .enumerate()
        .map(|(i, id)| test_item(id, (count - i as i64) * 10))
        .collect()
}

/// Create a signed-in user
pub fn test_user(id: &str) -> CurrentUser {
    CurrentUser {
        id: OwnerId::new(id),
        display_name: format!("User {}", id),
        id_token: Some(format!("token-{}", id)),
    }
}
