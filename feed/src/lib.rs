//! postwall feed
//!
//! Cursor-paginated, infinitely scrolling post feed over a managed document
//! store. Uses hexagonal (ports & adapters) architecture:
//! - `domain`: feed items and the ports the feed needs
//! - `app`: the feed state machine, its async loader and the post service
//! - `adapters`: Firestore REST and identity implementations

pub mod adapters;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;

#[cfg(test)]
mod test_utils;

pub use app::{FeedHandle, FeedLoader, FeedStatus, FeedView, ItemProps, PostService};
pub use config::Config;
pub use error::{ConfigError, DomainError};
