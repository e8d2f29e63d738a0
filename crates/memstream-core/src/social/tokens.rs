//! Persisted (mock) OAuth tokens, one per platform.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::SocialPlatform;
use crate::error::StorageError;
use crate::storage::{get_json, keys, set_json, KvStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub platform: SocialPlatform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl OAuthToken {
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

type TokenMap = BTreeMap<SocialPlatform, OAuthToken>;

/// Token storage over the shared key/value store.
///
/// Reads fail open: an unreadable map behaves as "no tokens".
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KvStore>,
}

impl TokenStore {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// All stored tokens, valid or not.
    pub fn all(&self) -> TokenMap {
        match get_json::<TokenMap>(self.store.as_ref(), keys::SOCIAL_TOKENS) {
            Ok(map) => map.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "social tokens unreadable, treating as disconnected");
                TokenMap::new()
            }
        }
    }

    pub fn get(&self, platform: SocialPlatform) -> Option<OAuthToken> {
        self.all().remove(&platform)
    }

    pub fn save(&self, token: OAuthToken) -> Result<(), StorageError> {
        let mut map = self.all();
        map.insert(token.platform, token);
        set_json(self.store.as_ref(), keys::SOCIAL_TOKENS, &map)
    }

    /// Disconnect a platform. Returns whether a token was present.
    pub fn remove(&self, platform: SocialPlatform) -> Result<bool, StorageError> {
        let mut map = self.all();
        let existed = map.remove(&platform).is_some();
        if existed {
            set_json(self.store.as_ref(), keys::SOCIAL_TOKENS, &map)?;
        }
        Ok(existed)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.delete(keys::SOCIAL_TOKENS)
    }

    pub fn is_authenticated(&self, platform: SocialPlatform, now: DateTime<Utc>) -> bool {
        self.get(platform).is_some_and(|t| t.is_valid(now))
    }

    /// Platforms holding a valid token, in ranking precedence order.
    pub fn connected(&self, now: DateTime<Utc>) -> Vec<SocialPlatform> {
        let mut platforms: Vec<SocialPlatform> = self
            .all()
            .into_values()
            .filter(|t| t.is_valid(now))
            .map(|t| t.platform)
            .collect();
        platforms.sort_by_key(|p| p.precedence());
        platforms
    }
}
