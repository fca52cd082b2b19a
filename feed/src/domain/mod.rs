//! Domain layer
//!
//! Contains pure business logic with no external dependencies.
//! - `entities`: feed items, cursors and users
//! - `ports`: trait definitions for the remote store, viewport and identity

pub mod entities;
pub mod ports;
