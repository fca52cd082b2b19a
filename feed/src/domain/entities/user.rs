//! Signed-in user, as handed out by an `IdentityProvider`

use serde::{Deserialize, Serialize};

/// Identifier of the account that owns a post
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: OwnerId,
    pub display_name: String,
    /// Bearer token for write requests against the document store
    pub id_token: Option<String>,
}
