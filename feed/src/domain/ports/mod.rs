//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod identity;
pub mod repositories;
pub mod viewport;

pub use identity::IdentityProvider;
pub use repositories::FeedRepository;
pub use viewport::{ViewportSensor, VisibilityCallback};
