//! Feed pagination state machine
//!
//! Owns the in-memory list, the pagination cursor and the loading flags of one
//! mounted feed. Every transition is a synchronous method; network I/O happens
//! outside and comes back through [`FeedState::apply`].
//!
//! ```text
//! Idle ──mount──▶ Loading(Initial) ──▶ Ready | Exhausted | Error
//! Ready ──sentinel visible──▶ Loading(Next) ──▶ Ready | Exhausted | Error
//! Error ──retry──▶ Loading(same kind) ──▶ Ready | Exhausted | Error
//! ```

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::{FeedItem, FeedItemId, PageCursor};
use crate::error::DomainError;

/// Initialization token owned by one feed instance.
///
/// Mounting twice with the same token is a no-op, so lifecycles that run
/// setup twice still issue a single initial request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MountToken(Uuid);

impl MountToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MountToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Which request a load belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Initial,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "kind", rename_all = "lowercase")]
pub enum FeedStatus {
    Idle,
    Loading(PageKind),
    Ready,
    /// No further pages exist. Deletions are still accepted.
    Exhausted,
    Error(PageKind),
}

impl std::fmt::Display for FeedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedStatus::Idle => write!(f, "idle"),
            FeedStatus::Loading(PageKind::Initial) => write!(f, "loading"),
            FeedStatus::Loading(PageKind::Next) => write!(f, "loading more"),
            FeedStatus::Ready => write!(f, "ready"),
            FeedStatus::Exhausted => write!(f, "exhausted"),
            FeedStatus::Error(_) => write!(f, "error"),
        }
    }
}

/// A page query to run against the remote collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Sequence number; only the in-flight sequence is accepted back
    pub seq: u64,
    pub kind: PageKind,
    pub cursor: Option<PageCursor>,
    pub limit: usize,
}

/// Snapshot of the feed for renderers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedView {
    pub items: Vec<FeedItem>,
    pub status: FeedStatus,
    /// Item that carries the viewport sensor
    pub sentinel: Option<FeedItemId>,
    pub show_empty_state: bool,
    pub show_retry: bool,
    pub error: Option<String>,
}

impl FeedView {
    pub fn is_loading(&self) -> bool {
        matches!(self.status, FeedStatus::Loading(_))
    }

    /// Loaded items were all deleted but more pages may exist
    pub fn is_drained(&self) -> bool {
        self.status == FeedStatus::Ready && self.items.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.id.as_str()).collect()
    }
}

impl Default for FeedView {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            status: FeedStatus::Idle,
            sentinel: None,
            show_empty_state: false,
            show_retry: false,
            error: None,
        }
    }
}

pub struct FeedState {
    page_size: usize,
    items: Vec<FeedItem>,
    ids: HashSet<FeedItemId>,
    cursor: Option<PageCursor>,
    status: FeedStatus,
    mount_token: Option<MountToken>,
    mounted: bool,
    in_flight: Option<u64>,
    next_seq: u64,
    failed: Option<PageRequest>,
    last_error: Option<String>,
}

impl FeedState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            items: Vec::new(),
            ids: HashSet::new(),
            cursor: None,
            status: FeedStatus::Idle,
            mount_token: None,
            mounted: false,
            in_flight: None,
            next_seq: 0,
            failed: None,
            last_error: None,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    pub fn status(&self) -> FeedStatus {
        self.status
    }

    pub fn cursor(&self) -> Option<&PageCursor> {
        self.cursor.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_exhausted(&self) -> bool {
        self.status == FeedStatus::Exhausted
    }

    /// The last rendered item, if any
    pub fn sentinel(&self) -> Option<&FeedItemId> {
        self.items.last().map(|item| &item.id)
    }

    /// Mount the feed and produce the initial request.
    ///
    /// Only the first call issues a request; later calls return `None`.
    pub fn mount(&mut self, token: MountToken) -> Option<PageRequest> {
        match self.mount_token {
            Some(existing) if existing == token => {
                tracing::debug!("Duplicate mount ignored");
                None
            }
            Some(_) => {
                tracing::warn!("Mount with a foreign token ignored");
                None
            }
            None => {
                self.mount_token = Some(token);
                self.mounted = true;
                Some(self.issue(PageKind::Initial, None))
            }
        }
    }

    /// Visibility signal from the sensor on `id`.
    ///
    /// Returns the next-page request when the sentinel became visible and the
    /// feed can take another page.
    pub fn sentinel_visible(&mut self, id: &FeedItemId, visible: bool) -> Option<PageRequest> {
        if !visible || !self.mounted {
            return None;
        }
        match self.status {
            FeedStatus::Ready => {}
            FeedStatus::Loading(_) => {
                tracing::debug!(sentinel = %id, "Page already in flight, signal ignored");
                return None;
            }
            status => {
                tracing::debug!(sentinel = %id, %status, "Signal ignored");
                return None;
            }
        }
        if self.sentinel() != Some(id) {
            tracing::debug!(sentinel = %id, "Signal from a stale sentinel ignored");
            return None;
        }
        let cursor = self.cursor.clone();
        Some(self.issue(PageKind::Next, cursor))
    }

    /// Explicit request for the next page, for when no sentinel is left to
    /// observe because deletions emptied the list.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if !self.mounted || self.status != FeedStatus::Ready || !self.items.is_empty() {
            return None;
        }
        let cursor = self.cursor.clone();
        tracing::debug!("List drained by deletions, loading next page");
        Some(self.issue(PageKind::Next, cursor))
    }

    /// Re-issue the request that failed, with the cursor it failed with
    pub fn retry(&mut self) -> Option<PageRequest> {
        if !self.mounted || !matches!(self.status, FeedStatus::Error(_)) {
            return None;
        }
        let failed = self.failed.take()?;
        tracing::info!(kind = ?failed.kind, "Retrying failed page");
        Some(self.issue(failed.kind, failed.cursor))
    }

    /// Discard the list and cursor and start over from the newest item.
    ///
    /// Refused while a request is in flight; requests are never cancelled.
    pub fn reset(&mut self) -> Option<PageRequest> {
        if !self.mounted || matches!(self.status, FeedStatus::Loading(_)) {
            return None;
        }
        self.items.clear();
        self.ids.clear();
        self.cursor = None;
        self.failed = None;
        self.last_error = None;
        Some(self.issue(PageKind::Initial, None))
    }

    /// Apply the outcome of `request`.
    ///
    /// Results for anything but the in-flight request, or arriving after
    /// unmount, are dropped. Returns whether the state changed.
    pub fn apply(
        &mut self,
        request: &PageRequest,
        result: Result<Vec<FeedItem>, DomainError>,
    ) -> bool {
        if !self.mounted || self.in_flight != Some(request.seq) {
            tracing::debug!(seq = request.seq, "Stale page result dropped");
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                let fetched = page.len();
                if let Some(last) = page.last() {
                    self.cursor = Some(PageCursor::from(last));
                }
                let appended = self.append(page);
                self.failed = None;
                self.last_error = None;
                self.status = if fetched < request.limit {
                    FeedStatus::Exhausted
                } else {
                    FeedStatus::Ready
                };
                tracing::debug!(
                    kind = ?request.kind,
                    fetched,
                    appended,
                    total = self.items.len(),
                    status = %self.status,
                    "Page applied"
                );
            }
            Err(e) => {
                tracing::warn!(kind = ?request.kind, error = %e, "Page fetch failed");
                self.status = FeedStatus::Error(request.kind);
                self.last_error = Some(e.to_string());
                self.failed = Some(request.clone());
            }
        }
        true
    }

    /// Remove a deleted item. The cursor is left where it is.
    pub fn remove(&mut self, id: &FeedItemId) -> bool {
        if !self.mounted {
            return false;
        }
        match self.items.iter().position(|item| &item.id == id) {
            Some(index) => {
                self.items.remove(index);
                self.ids.remove(id);
                true
            }
            None => false,
        }
    }

    /// Stop accepting results and signals. The list is kept only for a final view.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.in_flight = None;
    }

    pub fn view(&self) -> FeedView {
        FeedView {
            items: self.items.clone(),
            status: self.status,
            sentinel: self.sentinel().cloned(),
            show_empty_state: self.status == FeedStatus::Exhausted && self.items.is_empty(),
            show_retry: matches!(self.status, FeedStatus::Error(_)),
            error: self.last_error.clone(),
        }
    }

    fn issue(&mut self, kind: PageKind, cursor: Option<PageCursor>) -> PageRequest {
        self.next_seq += 1;
        self.in_flight = Some(self.next_seq);
        self.status = FeedStatus::Loading(kind);
        PageRequest {
            seq: self.next_seq,
            kind,
            cursor,
            limit: self.page_size,
        }
    }

    /// Append a page, keeping ids unique and order keys non-increasing
    fn append(&mut self, page: Vec<FeedItem>) -> usize {
        let mut appended = 0;
        for item in page {
            if self.ids.contains(&item.id) {
                tracing::debug!(id = %item.id, "Duplicate item skipped");
                continue;
            }
            if let Some(tail) = self.items.last() {
                if item.order_key > tail.order_key {
                    tracing::warn!(
                        id = %item.id,
                        key = %item.order_key,
                        tail_key = %tail.order_key,
                        "Out-of-order item skipped"
                    );
                    continue;
                }
            }
            self.ids.insert(item.id.clone());
            self.items.push(item);
            appended += 1;
        }
        appended
    }
}
