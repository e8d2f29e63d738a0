//! Core error types for memstream-core.
//!
//! Every fallible operation in the library returns one of these thiserror
//! enums. The nag timers never let them escape: capability and posting
//! failures become fallback decisions, storage failures fail open.

use std::path::PathBuf;
use thiserror::Error;

use crate::social::SocialPlatform;

/// Core error type for memstream-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persistence-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// OAuth-related errors
    #[error("OAuth error: {0}")]
    OAuth(#[from] OAuthError),

    /// Posting to a social platform failed
    #[error("Post error: {0}")]
    Post(#[from] PostError),

    /// A platform capability could not be used
    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),
}

/// Key/value persistence errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A stored value could not be decoded
    #[error("Corrupt value for key '{key}': {message}")]
    Corrupt { key: String, message: String },

    /// The store's internal lock was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// OAuth-specific errors.
#[derive(Error, Debug)]
pub enum OAuthError {
    /// No token stored for the platform
    #[error("No token for {platform}")]
    NoToken { platform: SocialPlatform },

    /// Access token expired
    #[error("Access token for {platform} expired")]
    TokenExpired { platform: SocialPlatform },

    /// The (simulated) authorization was refused
    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    /// Callback URL could not be understood
    #[error("Invalid OAuth callback: {0}")]
    InvalidCallback(String),

    /// Callback `state` does not match the pending request
    #[error("OAuth state mismatch: expected {expected}, got {actual}")]
    StateMismatch { expected: String, actual: String },

    /// Platform id not in the platform table
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),
}

/// Per-platform posting failures.
#[derive(Error, Debug)]
pub enum PostError {
    /// Authentication problem (missing or expired token)
    #[error(transparent)]
    Auth(#[from] OAuthError),

    /// The (mock) platform API rejected the post
    #[error("{platform} rejected the post: {reason}")]
    Rejected {
        platform: SocialPlatform,
        reason: String,
    },

    /// The caller went away before the post completed
    #[error("Post cancelled")]
    Cancelled,
}

/// A capability of the host platform is missing, denied or broken.
#[derive(Error, Debug)]
pub enum CapabilityError {
    /// The capability is not present on this host
    #[error("{0} is not available on this platform")]
    Unavailable(&'static str),

    /// The user or OS refused the capability
    #[error("{0} permission denied")]
    Denied(&'static str),

    /// The capability was present but the call failed
    #[error("{capability} failed: {message}")]
    Failed {
        capability: &'static str,
        message: String,
    },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseBusy
                    || inner.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for StorageError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StorageError::Poisoned
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_token_message_names_platform() {
        let err = OAuthError::NoToken {
            platform: SocialPlatform::Instagram,
        };
        assert_eq!(err.to_string(), "No token for instagram");
    }

    #[test]
    fn post_error_is_transparent_over_auth() {
        let err: PostError = OAuthError::TokenExpired {
            platform: SocialPlatform::Twitter,
        }
        .into();
        assert_eq!(err.to_string(), "Access token for twitter expired");
    }

    #[test]
    fn denied_capability_names_what_was_refused() {
        let err: CoreError = CapabilityError::Denied("overlay").into();
        assert_eq!(
            err.to_string(),
            "Capability error: overlay permission denied"
        );
    }

    #[test]
    fn storage_error_lifts_into_core_error() {
        let err: CoreError = StorageError::Locked.into();
        assert!(matches!(err, CoreError::Storage(StorageError::Locked)));
    }
}
