//! Mock OAuth2 authorization-code flow.
//!
//! 1. Build the platform's authorization URL (opened by the host's browser)
//! 2. Parse the redirect back to `redirect_uri?code=..&state=..`
//! 3. "Exchange" the code: after a simulated delay, mint a fake token
//! 4. Store the token in the [`TokenStore`]
//!
//! No network traffic happens here; the token endpoints in the platform
//! table are informational only.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::{OAuthToken, SocialPlatform, TokenStore};
use crate::clock::{offset_secs, Clock};
use crate::error::{CoreError, OAuthError, StorageError};
use crate::random::RandomSource;
use crate::storage::OAuthConfig;

const USERNAME_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// A pending authorization, created when the user starts connecting a platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub platform: SocialPlatform,
    pub state: String,
    pub redirect_uri: String,
    pub url: String,
}

impl AuthorizationRequest {
    pub fn new(platform: SocialPlatform, config: &OAuthConfig, nonce: &str) -> Self {
        let info = platform.info();
        let state = format!("{}.{}", platform.id(), nonce);
        let scopes = info.scopes.join(" ");
        let url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            info.authorize_url,
            urlencoding::encode(&config.client_id),
            urlencoding::encode(&config.redirect_uri),
            urlencoding::encode(&scopes),
            urlencoding::encode(&state),
        );
        Self {
            platform,
            state,
            redirect_uri: config.redirect_uri.clone(),
            url,
        }
    }
}

/// The query of a redirect back from the authorization page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCallback {
    pub code: String,
    pub state: String,
}

impl OAuthCallback {
    /// Platform encoded in the `state` prefix.
    pub fn platform(&self) -> Result<SocialPlatform, OAuthError> {
        let id = self.state.split('.').next().unwrap_or_default();
        id.parse()
    }
}

/// Parse `...?code=XXX&state=YYY`. An `error` parameter means the user refused.
pub fn parse_callback(callback_url: &str) -> Result<OAuthCallback, OAuthError> {
    let url = url::Url::parse(callback_url)
        .map_err(|e| OAuthError::InvalidCallback(format!("{callback_url}: {e}")))?;

    let mut code = None;
    let mut state = None;
    for (k, v) in url.query_pairs() {
        match k.as_ref() {
            "code" => code = Some(v.into_owned()),
            "state" => state = Some(v.into_owned()),
            "error" => return Err(OAuthError::AuthorizationFailed(v.into_owned())),
            _ => {}
        }
    }

    Ok(OAuthCallback {
        code: code.ok_or_else(|| OAuthError::InvalidCallback("no code in callback".into()))?,
        state: state.ok_or_else(|| OAuthError::InvalidCallback("no state in callback".into()))?,
    })
}

/// Simulated OAuth flow writing into a [`TokenStore`].
pub struct MockOAuthFlow {
    tokens: TokenStore,
    config: OAuthConfig,
    random: Arc<dyn RandomSource>,
    clock: Arc<dyn Clock>,
}

impl MockOAuthFlow {
    pub fn new(
        tokens: TokenStore,
        config: OAuthConfig,
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

    pub fn begin(&self, platform: SocialPlatform) -> AuthorizationRequest {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        AuthorizationRequest::new(platform, &self.config, &nonce)
    }

    /// Finish a flow from its redirect. Validates `state`, simulates the code
    /// exchange and stores the resulting token.
    pub async fn complete(
        &self,
        request: &AuthorizationRequest,
        callback: &OAuthCallback,
    ) -> Result<OAuthToken, CoreError> {
        if callback.state != request.state {
            return Err(OAuthError::StateMismatch {
                expected: request.state.clone(),
                actual: callback.state.clone(),
            }
            .into());
        }
        if callback.code.trim().is_empty() {
            return Err(OAuthError::InvalidCallback("empty code".into()).into());
        }

        let latency = self
            .random
            .between_ms(self.config.latency_min_ms..self.config.latency_max_ms);
        tokio::time::sleep(Duration::from_millis(latency)).await;

        if !self.random.chance(self.config.success_rate) {
            warn!(platform = %request.platform, "simulated authorization refused");
            return Err(OAuthError::AuthorizationFailed(format!(
                "{} declined the authorization",
                request.platform.display_name()
            ))
            .into());
        }

        let token = self.mint_token(request.platform, self.clock.now());
        self.tokens.save(token.clone())?;
        info!(platform = %request.platform, username = ?token.username, "platform connected");
        Ok(token)
    }

    /// Run the whole flow without a browser round-trip by faking the redirect.
    pub async fn authorize(&self, platform: SocialPlatform) -> Result<OAuthToken, CoreError> {
        let request = self.begin(platform);
        let callback = OAuthCallback {
            code: format!("mock_code_{}", self.clock.now().timestamp_millis()),
            state: request.state.clone(),
        };
        self.complete(&request, &callback).await
    }

    pub fn disconnect(&self, platform: SocialPlatform) -> Result<bool, StorageError> {
        let removed = self.tokens.remove(platform)?;
        if removed {
            info!(%platform, "platform disconnected");
        }
        Ok(removed)
    }

    fn mint_token(&self, platform: SocialPlatform, now: DateTime<Utc>) -> OAuthToken {
        let suffix: String = (0..9)
            .map(|_| USERNAME_ALPHABET[self.random.index(USERNAME_ALPHABET.len())] as char)
            .collect();
        OAuthToken {
            access_token: format!("mock_token_{}", uuid::Uuid::new_v4().simple()),
            refresh_token: Some(format!("refresh_{}", uuid::Uuid::new_v4().simple())),
            expires_at: offset_secs(now, self.config.token_ttl_secs),
            platform,
            username: Some(format!("user_{}_{}", platform.id(), suffix)),
        }
    }
}
