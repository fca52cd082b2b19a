//! Identity adapter backed by a fixed user

use crate::config::Config;
use crate::domain::entities::CurrentUser;
use crate::domain::ports::IdentityProvider;

/// Identity resolved once, at startup
pub struct StaticIdentity {
    user: Option<CurrentUser>,
}

impl StaticIdentity {
    pub fn signed_in(user: CurrentUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn signed_out() -> Self {
        Self { user: None }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            user: config.user.clone(),
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<CurrentUser> {
        self.user.clone()
    }
}
