//! Firestore adapter
//!
//! Posts live in a Firestore collection - this adapter calls its REST API.

pub mod client;
pub mod value;

pub use client::FirestoreFeedRepository;
