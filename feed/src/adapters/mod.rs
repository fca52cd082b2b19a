//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod firestore;
pub mod identity;

pub use firestore::FirestoreFeedRepository;
pub use identity::StaticIdentity;
