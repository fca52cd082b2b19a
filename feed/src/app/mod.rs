//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities, ports, and external systems.

pub mod feed_loader;
pub mod feed_state;
pub mod post_service;

pub use feed_loader::{FeedEvent, FeedHandle, FeedLoader, ItemProps};
pub use feed_state::{FeedState, FeedStatus, FeedView, MountToken, PageKind, PageRequest};
pub use post_service::{PostDraft, PostEdit, PostService};
