//! Identity port
//!
//! Who is signed in is passed into services explicitly rather than read from
//! ambient global state.

use crate::domain::entities::CurrentUser;

pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, or `None` when signed out
    fn current_user(&self) -> Option<CurrentUser>;
}
