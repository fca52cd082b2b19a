//! Unified error types for postwall
//!
//! This module defines error types for each layer:
//! - `DomainError`: errors surfaced by ports and services
//! - `FirestoreError`: document store REST client errors
//! - `ConfigError`: environment configuration errors

use thiserror::Error;

/// Domain layer errors - what services and the feed loader see
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Remote service error: {0}")]
    Remote(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Document store REST client errors
#[derive(Debug, Error)]
pub enum FirestoreError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Unauthorized - missing or expired credentials")]
    Unauthorized,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<FirestoreError> for DomainError {
    fn from(e: FirestoreError) -> Self {
        match e {
            FirestoreError::DocumentNotFound(name) => DomainError::NotFound(name),
            FirestoreError::Unauthorized => {
                DomainError::Unauthorized("missing or expired credentials".to_string())
            }
            FirestoreError::PermissionDenied(msg) => DomainError::Forbidden(msg),
            other => DomainError::Remote(other.to_string()),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
