//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! Why manual mocks instead of a mocking framework?
//! - The loader tests need mocks with real behaviour: cursor paging, gated
//!   fetches, captured visibility callbacks
//! - Manual mocks are more explicit and easier to debug

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
