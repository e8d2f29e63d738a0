mod config;
pub mod database;
pub mod memory;

pub use config::{Config, EscalationConfig, OAuthConfig, SharePromptConfig, SocialConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ConfigError, StorageError};

/// Well-known keys in the key/value store.
pub mod keys {
    pub const SNOOZE_UNTIL: &str = "annoy_snooze_until";
    pub const ESCALATION_STEP: &str = "annoy_escalation_step";
    pub const SOCIAL_TOKENS: &str = "social_tokens";
    pub const PHOTO_CONTACTS: &str = "photo_contacts";
    pub const CHAT_ACTIVITIES: &str = "chat_activities";
    pub const CURRENT_CHAT: &str = "current_chat";
}

/// String key/value persistence used for every piece of nag state.
///
/// Implementations must be safe to share between the escalation timer and the
/// share prompt timer.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Read a JSON value. A missing key is `Ok(None)`; an undecodable one is an error.
pub fn get_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}

pub fn set_json<T: Serialize + ?Sized>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|e| StorageError::Corrupt {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.set(key, &raw)
}

/// Returns the data directory, creating it if needed.
///
/// `MEMSTREAM_DATA_DIR` wins when set. Otherwise `~/.config/memstream`, or
/// `~/.config/memstream-dev` when `MEMSTREAM_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("MEMSTREAM_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env =
                std::env::var("MEMSTREAM_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("memstream-dev")
            } else {
                base_dir.join("memstream")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_helpers_round_trip_through_store() {
        let store = MemoryStore::new();
        set_json(&store, "k", &vec![1, 2, 3]).unwrap();
        let back: Option<Vec<i32>> = get_json(&store, "k").unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));
    }

    #[test]
    fn missing_key_reads_as_none() {
        let store = MemoryStore::new();
        let back: Option<Vec<i32>> = get_json(&store, "missing").unwrap();
        assert!(back.is_none());
    }

    #[test]
    fn undecodable_value_is_corrupt() {
        let store = MemoryStore::new();
        store.set("k", "{not json").unwrap();
        let err = get_json::<Vec<i32>>(&store, "k").unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }
}
