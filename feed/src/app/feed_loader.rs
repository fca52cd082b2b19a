//! Feed loader
//!
//! Drives a [`FeedState`] from a single task: UI events arrive on a channel,
//! at most one page fetch is polled next to them, and every change is
//! published as a [`FeedView`] on a watch channel.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::app::feed_state::{FeedState, FeedStatus, FeedView, MountToken, PageRequest};
use crate::domain::entities::{FeedItem, FeedItemId};
use crate::domain::ports::{FeedRepository, ViewportSensor, VisibilityCallback};
use crate::error::DomainError;

type PageFuture =
    Pin<Box<dyn Future<Output = (PageRequest, Result<Vec<FeedItem>, DomainError>)> + Send>>;

/// Something that happened to the feed component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    Mounted(MountToken),
    SentinelVisibility { id: FeedItemId, visible: bool },
    RetryRequested,
    LoadMoreRequested,
    RefreshRequested,
    ItemDeleted(FeedItemId),
    Unmounted,
}

/// Cloneable handle used by the view layer to talk to a running loader
#[derive(Clone)]
pub struct FeedHandle {
    events: mpsc::UnboundedSender<FeedEvent>,
    view: watch::Receiver<FeedView>,
    token: MountToken,
}

impl FeedHandle {
    /// Mount the feed. Safe to call more than once.
    pub fn mount(&self) {
        self.send(FeedEvent::Mounted(self.token));
    }

    pub fn sentinel_visibility(&self, id: FeedItemId, visible: bool) {
        self.send(FeedEvent::SentinelVisibility { id, visible });
    }

    pub fn retry(&self) {
        self.send(FeedEvent::RetryRequested);
    }

    /// Ask for the next page directly, used when deletions left no sentinel
    pub fn load_more(&self) {
        self.send(FeedEvent::LoadMoreRequested);
    }

    pub fn refresh(&self) {
        self.send(FeedEvent::RefreshRequested);
    }

    /// Deletion callback for item renderers, called once the remote delete succeeded
    pub fn item_deleted(&self, id: FeedItemId) {
        self.send(FeedEvent::ItemDeleted(id));
    }

    pub fn unmount(&self) {
        self.send(FeedEvent::Unmounted);
    }

    /// Latest published view
    pub fn view(&self) -> FeedView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedView> {
        self.view.clone()
    }

    /// Props for every item currently in the feed
    pub fn item_props(&self) -> Vec<ItemProps> {
        self.view
            .borrow()
            .items
            .iter()
            .map(|item| ItemProps {
                item: item.clone(),
                feed: self.clone(),
            })
            .collect()
    }

    fn send(&self, event: FeedEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Feed loader stopped, event dropped");
        }
    }
}

/// What an item renderer receives: the item plus its deletion callback
#[derive(Clone)]
pub struct ItemProps {
    pub item: FeedItem,
    feed: FeedHandle,
}

impl ItemProps {
    pub fn id(&self) -> &FeedItemId {
        &self.item.id
    }

    /// Report that this item was deleted remotely
    pub fn on_deleted(&self) {
        self.feed.item_deleted(self.item.id.clone());
    }
}

impl std::fmt::Debug for ItemProps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemProps").field("item", &self.item).finish()
    }
}

/// Single-task owner of one feed's state
pub struct FeedLoader<R, S>
where
    R: FeedRepository + 'static,
    S: ViewportSensor + 'static,
{
    repo: Arc<R>,
    sensor: Arc<S>,
    state: FeedState,
    events: mpsc::UnboundedReceiver<FeedEvent>,
    signals: mpsc::WeakUnboundedSender<FeedEvent>,
    view: watch::Sender<FeedView>,
    observed: Option<FeedItemId>,
}

impl<R, S> FeedLoader<R, S>
where
    R: FeedRepository + 'static,
    S: ViewportSensor + 'static,
{
    pub fn new(repo: Arc<R>, sensor: Arc<S>, page_size: usize) -> (Self, FeedHandle) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let state = FeedState::new(page_size);
        let (view_tx, view_rx) = watch::channel(state.view());

        let loader = Self {
            repo,
            sensor,
            state,
            events: events_rx,
            signals: events_tx.downgrade(),
            view: view_tx,
            observed: None,
        };
        let handle = FeedHandle {
            events: events_tx,
            view: view_rx,
            token: MountToken::new(),
        };
        (loader, handle)
    }

    /// Run until unmounted or until every handle is dropped
    pub async fn run(mut self) {
        let mut in_flight: Option<PageFuture> = None;

        loop {
            let mut rearm = false;
            tokio::select! {
                event = self.events.recv() => {
                    match event {
                        Some(FeedEvent::Unmounted) | None => break,
                        Some(event) => {
                            if let Some(request) = self.handle_event(event) {
                                in_flight = Some(self.fetch(request));
                            }
                        }
                    }
                }
                (request, result) = poll_page(&mut in_flight), if in_flight.is_some() => {
                    in_flight = None;
                    self.state.apply(&request, result);
                    rearm = true;
                }
            }
            self.sync_sensor(rearm);
            self.publish();
        }

        self.shutdown(in_flight.is_some());
    }

    fn handle_event(&mut self, event: FeedEvent) -> Option<PageRequest> {
        match event {
            FeedEvent::Mounted(token) => self.state.mount(token),
            FeedEvent::SentinelVisibility { id, visible } => {
                self.state.sentinel_visible(&id, visible)
            }
            FeedEvent::RetryRequested => self.state.retry(),
            FeedEvent::LoadMoreRequested => self.state.load_more(),
            FeedEvent::RefreshRequested => self.state.reset(),
            FeedEvent::ItemDeleted(id) => {
                if !self.state.remove(&id) {
                    tracing::debug!(id = %id, "Deleted item not in feed");
                }
                None
            }
            FeedEvent::Unmounted => None,
        }
    }

    fn fetch(&self, request: PageRequest) -> PageFuture {
        tracing::debug!(
            seq = request.seq,
            kind = ?request.kind,
            cursor = ?request.cursor.as_ref().map(|c| c.id.as_str()),
            limit = request.limit,
            "Fetching page"
        );
        let repo = Arc::clone(&self.repo);
        Box::pin(async move {
            let result = repo.fetch_page(request.cursor.as_ref(), request.limit).await;
            (request, result)
        })
    }

    /// Keep the sensor on the current sentinel while more pages may exist.
    /// With `rearm`, an unchanged sentinel is observed afresh so a sensor that
    /// only reports transitions fires again after a page added nothing.
    fn sync_sensor(&mut self, rearm: bool) {
        let wanted = if self.state.is_mounted() && self.state.status() != FeedStatus::Exhausted {
            self.state.sentinel().cloned()
        } else {
            None
        };
        if wanted == self.observed && !(rearm && wanted.is_some()) {
            return;
        }

        if self.observed.take().is_some() {
            self.sensor.disconnect();
        }
        if let Some(id) = wanted {
            tracing::debug!(sentinel = %id, "Observing sentinel");
            self.sensor.observe(&id, self.visibility_callback(id.clone()));
            self.observed = Some(id);
        }
    }

    fn visibility_callback(&self, id: FeedItemId) -> VisibilityCallback {
        let signals = self.signals.clone();
        Box::new(move |visible| {
            if let Some(tx) = signals.upgrade() {
                let _ = tx.send(FeedEvent::SentinelVisibility {
                    id: id.clone(),
                    visible,
                });
            }
        })
    }

    fn publish(&self) {
        self.view.send_replace(self.state.view());
    }

    fn shutdown(&mut self, request_outstanding: bool) {
        if request_outstanding {
            tracing::debug!("Unmounted with a page in flight, result will be discarded");
        }
        self.state.unmount();
        if self.observed.take().is_some() {
            self.sensor.disconnect();
        }
        self.publish();
        tracing::debug!("Feed loader stopped");
    }
}

async fn poll_page(
    in_flight: &mut Option<PageFuture>,
) -> (PageRequest, Result<Vec<FeedItem>, DomainError>) {
    match in_flight {
        Some(fut) => fut.await,
        None => std::future::pending().await,
    }
}
