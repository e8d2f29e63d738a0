//! Direct posting to connected platforms.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{SocialPlatform, TokenStore};
use crate::clock::Clock;
use crate::error::{OAuthError, PostError};
use crate::random::RandomSource;
use crate::storage::SocialConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostContent {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostReceipt {
    pub platform: SocialPlatform,
    pub post_id: String,
    pub url: String,
}

/// Anything that can post on the user's behalf without showing a share UI.
#[async_trait]
pub trait SocialPoster: Send + Sync {
    /// Platforms that currently hold a usable token.
    fn connected_platforms(&self) -> Vec<SocialPlatform>;

    /// Post to one platform. A missing token is an `OAuthError::NoToken` value,
    /// never a panic.
    async fn post(
        &self,
        platform: SocialPlatform,
        content: &PostContent,
    ) -> Result<PostReceipt, PostError>;
}

/// Fake platform APIs backed by the token store.
pub struct MockSocialClient {
    tokens: TokenStore,
    config: SocialConfig,
    random: Arc<dyn RandomSource>,
    clock: Arc<dyn Clock>,
}

impl MockSocialClient {
    pub fn new(
        tokens: TokenStore,
        config: SocialConfig,
        random: Arc<dyn RandomSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tokens,
            config,
            random,
            clock,
        }
    }
}

#[async_trait]
impl SocialPoster for MockSocialClient {
    fn connected_platforms(&self) -> Vec<SocialPlatform> {
        self.tokens.connected(self.clock.now())
    }

    async fn post(
        &self,
        platform: SocialPlatform,
        content: &PostContent,
    ) -> Result<PostReceipt, PostError> {
        let token = self
            .tokens
            .get(platform)
            .ok_or(OAuthError::NoToken { platform })?;
        if !token.is_valid(self.clock.now()) {
            return Err(OAuthError::TokenExpired { platform }.into());
        }

        let latency = self
            .random
            .between_ms(self.config.post_latency_min_ms..self.config.post_latency_max_ms);
        tokio::time::sleep(Duration::from_millis(latency)).await;

        if !self.random.chance(self.config.post_success_rate) {
            return Err(PostError::Rejected {
                platform,
                reason: "simulated API failure".into(),
            });
        }

        let post_id = format!("post_{}", uuid::Uuid::new_v4().simple());
        let url = format!("https://{}/post/{}", platform.info().host, post_id);
        debug!(
            %platform,
            endpoint = platform.info().post_endpoint,
            chars = content.text.chars().count(),
            "mock post accepted"
        );
        Ok(PostReceipt {
            platform,
            post_id,
            url,
        })
    }
}
