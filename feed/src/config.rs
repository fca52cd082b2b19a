use std::env;

use crate::domain::entities::{CurrentUser, OwnerId};
use crate::error::ConfigError;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Clone)]
pub struct Config {
    pub firestore_base_url: String,
    pub firestore_project_id: String,
    pub firestore_database: String,
    /// Web API key, sent as the `key` query parameter when set
    pub firebase_api_key: Option<String>,
    /// Collection holding the posts
    pub collection: String,
    pub page_size: usize,
    /// Signed-in user, when POSTWALL_USER_ID is set
    pub user: Option<CurrentUser>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let page_size = match var("POSTWALL_PAGE_SIZE") {
            Some(raw) => parse_page_size(&raw)?,
            None => DEFAULT_PAGE_SIZE,
        };

        let user = var("POSTWALL_USER_ID").map(|id| CurrentUser {
            display_name: var("POSTWALL_USER_NAME").unwrap_or_else(|| id.clone()),
            id: OwnerId(id),
            id_token: var("POSTWALL_ID_TOKEN"),
        });

        Ok(Self {
            firestore_base_url: var("FIRESTORE_BASE_URL")
                .unwrap_or_else(|| "https://firestore.googleapis.com/v1".to_string()),
            firestore_project_id: var("FIRESTORE_PROJECT_ID")
                .ok_or(ConfigError::Missing("FIRESTORE_PROJECT_ID"))?,
            firestore_database: var("FIRESTORE_DATABASE")
                .unwrap_or_else(|| "(default)".to_string()),
            firebase_api_key: var("FIREBASE_API_KEY"),
            collection: var("POSTWALL_COLLECTION").unwrap_or_else(|| "posts".to_string()),
            page_size,
            user,
        })
    }
}

fn parse_page_size(raw: &str) -> Result<usize, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: "POSTWALL_PAGE_SIZE",
        reason,
    };
    let size: usize = raw.trim().parse().map_err(|e| invalid(format!("{}", e)))?;
    if size == 0 {
        return Err(invalid("must be at least 1".to_string()));
    }
    Ok(size)
}
