//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use std::cmp::Reverse;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::Semaphore;

use crate::domain::entities::{FeedItem, FeedItemId, NewPost, PageCursor, PostUpdate};
use crate::domain::ports::{FeedRepository, ViewportSensor, VisibilityCallback};
use crate::error::DomainError;

// ============================================================================
// In-Memory Feed Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryFeedRepository {
    /// Kept sorted newest first, ties broken by id descending
    items: Arc<RwLock<Vec<FeedItem>>>,
    fetch_calls: Arc<RwLock<Vec<(Option<PageCursor>, usize)>>>,
    calls_seen: AtomicUsize,
    fail_on_call: Option<usize>,
    gate: Option<Arc<Semaphore>>,
    ignore_cursor: bool,
}

impl InMemoryFeedRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with posts for testing
    pub fn with_items(self, items: Vec<FeedItem>) -> Self {
        {
            let mut stored = self.items.write().unwrap();
            stored.extend(items);
            sort_newest_first(&mut stored);
        }
        self
    }

    /// Make the nth `fetch_page` call (1-based) fail with a remote error
    pub fn failing_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    /// Hold every `fetch_page` until a permit is added to the returned semaphore
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    /// Serve the first page for every cursor, as a store with a broken index would
    pub fn ignoring_cursor(mut self) -> Self {
        self.ignore_cursor = true;
        self
    }

    /// Cursor and limit of every `fetch_page` call, in order
    pub fn fetch_calls(&self) -> Vec<(Option<PageCursor>, usize)> {
        self.fetch_calls.read().unwrap().clone()
    }

    pub fn insert_newest(&self, item: FeedItem) {
        let mut stored = self.items.write().unwrap();
        stored.push(item);
        sort_newest_first(&mut stored);
    }

    pub fn get(&self, id: &FeedItemId) -> Option<FeedItem> {
        self.items
            .read()
            .unwrap()
            .iter()
            .find(|item| &item.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap().len()
    }
}

fn sort_newest_first(items: &mut [FeedItem]) {
    items.sort_by_key(|item| Reverse((item.order_key, item.id.clone())));
}

#[async_trait]
impl FeedRepository for InMemoryFeedRepository {
    async fn fetch_page(
        &self,
        cursor: Option<&PageCursor>,
        limit: usize,
    ) -> Result<Vec<FeedItem>, DomainError> {
        self.fetch_calls
            .write()
            .unwrap()
            .push((cursor.cloned(), limit));
        let call = self.calls_seen.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| DomainError::Internal(e.to_string()))?
                .forget();
        }
        if self.fail_on_call == Some(call) {
            return Err(DomainError::Remote("simulated outage".to_string()));
        }

        let items = self.items.read().unwrap();
        Ok(items
            .iter()
            .filter(|item| match cursor.filter(|_| !self.ignore_cursor) {
                Some(c) => (item.order_key, &item.id) < (c.order_key, &c.id),
                None => true,
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &FeedItemId) -> Result<Option<FeedItem>, DomainError> {
        Ok(self.get(id))
    }

    async fn create(
        &self,
        post: &NewPost,
        _id_token: Option<&str>,
    ) -> Result<FeedItem, DomainError> {
        let item = FeedItem {
            id: FeedItemId::new(uuid::Uuid::new_v4().to_string()),
            author: post.author.clone(),
            body: post.body.clone(),
            title: post.title.clone(),
            media_url: post.media_url.clone(),
            avatar_url: None,
            tags: post.tags.clone(),
            like_count: 0,
            comment_count: 0,
            order_key: post.order_key,
            owner: Some(post.owner.clone()),
        };
        self.insert_newest(item.clone());
        Ok(item)
    }

    async fn update(
        &self,
        id: &FeedItemId,
        update: &PostUpdate,
        _id_token: Option<&str>,
    ) -> Result<FeedItem, DomainError> {
        let mut items = self.items.write().unwrap();
        let item = items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("Post {} not found", id)))?;

        if let Some(title) = &update.title {
            item.title = Some(title.clone()).filter(|t| !t.is_empty());
        }
        if let Some(body) = &update.body {
            item.body = body.clone();
        }
        if let Some(tags) = &update.tags {
            item.tags = tags.clone();
        }
        if let Some(key) = update.order_key {
            item.order_key = key;
        }
        let updated = item.clone();
        sort_newest_first(&mut items);
        Ok(updated)
    }

    async fn delete(&self, id: &FeedItemId, _id_token: Option<&str>) -> Result<(), DomainError> {
        let mut items = self.items.write().unwrap();
        let before = items.len();
        items.retain(|item| &item.id != id);
        if items.len() == before {
            return Err(DomainError::NotFound(format!("Post {} not found", id)));
        }
        Ok(())
    }
}

// ============================================================================
// Recording Viewport Sensor
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorCall {
    Observe(FeedItemId),
    Disconnect,
}

/// Records observe/disconnect calls and lets tests fire visibility signals
#[derive(Default)]
pub struct RecordingViewportSensor {
    calls: Mutex<Vec<SensorCall>>,
    current: Mutex<Option<(FeedItemId, Arc<VisibilityCallback>)>>,
    last_callback: Mutex<Option<Arc<VisibilityCallback>>>,
}

impl RecordingViewportSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SensorCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Element currently observed
    pub fn observed(&self) -> Option<FeedItemId> {
        self.current.lock().unwrap().as_ref().map(|(id, _)| id.clone())
    }

    /// Fire the current callback, if something is observed
    pub fn fire(&self, visible: bool) {
        let callback = self.current.lock().unwrap().as_ref().map(|(_, cb)| Arc::clone(cb));
        if let Some(callback) = callback {
            callback(visible);
        }
    }

    /// Fire the most recent callback even after it was disconnected
    pub fn fire_last_callback(&self, visible: bool) {
        let callback = self.last_callback.lock().unwrap().clone();
        if let Some(callback) = callback {
            callback(visible);
        }
    }
}

impl ViewportSensor for RecordingViewportSensor {
    fn observe(&self, target: &FeedItemId, on_visibility: VisibilityCallback) {
        let callback = Arc::new(on_visibility);
        self.calls
            .lock()
            .unwrap()
            .push(SensorCall::Observe(target.clone()));
        *self.last_callback.lock().unwrap() = Some(Arc::clone(&callback));
        *self.current.lock().unwrap() = Some((target.clone(), callback));
    }

    fn disconnect(&self) {
        self.calls.lock().unwrap().push(SensorCall::Disconnect);
        *self.current.lock().unwrap() = None;
    }
}
