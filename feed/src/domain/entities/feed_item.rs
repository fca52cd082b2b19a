//! Feed item domain entity
//!
//! A single post as the feed sees it. Identifiers and order keys are assigned
//! by the remote store and treated as opaque by the client.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::user::OwnerId;

/// Stable identifier of a feed item, assigned by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeedItemId(pub String);

impl FeedItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FeedItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for FeedItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Creation order key. Larger means newer; only compared, never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderKey(pub i64);

impl OrderKey {
    /// Order key for a post created right now (milliseconds since the epoch)
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }
}

impl std::fmt::Display for OrderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A post in the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: FeedItemId,
    pub author: String,
    pub body: String,
    pub title: Option<String>,
    /// Attached image, if any
    pub media_url: Option<String>,
    pub avatar_url: Option<String>,
    pub tags: BTreeSet<String>,
    pub like_count: u64,
    pub comment_count: u64,
    pub order_key: OrderKey,
    /// Posts written before ownership was recorded have no owner and are read-only
    pub owner: Option<OwnerId>,
}

impl FeedItem {
    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        self.owner.as_ref() == Some(owner)
    }
}

/// Continuation point for the next page: the last item of the previous page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    pub order_key: OrderKey,
    pub id: FeedItemId,
}

impl From<&FeedItem> for PageCursor {
    fn from(item: &FeedItem) -> Self {
        Self {
            order_key: item.order_key,
            id: item.id.clone(),
        }
    }
}

/// Data for creating a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub author: String,
    pub title: Option<String>,
    pub body: String,
    pub tags: BTreeSet<String>,
    pub media_url: Option<String>,
    pub owner: OwnerId,
    pub order_key: OrderKey,
}

/// Partial update of a post. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tags: Option<BTreeSet<String>>,
    pub order_key: Option<OrderKey>,
}

impl PostUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.tags.is_none()
    }
}

/// Normalize user-entered tags: trim, strip a leading `#`, drop blanks.
pub fn normalize_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
