//! The closed set of social platforms and their static metadata.
//!
//! Icons, colors, OAuth endpoints and ranking text live in one exhaustive
//! table keyed by the enum.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OAuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Instagram,
    Facebook,
    Twitter,
    Discord,
    LinkedIn,
    TikTok,
}

/// Static description of one platform.
#[derive(Debug, Clone, Copy)]
pub struct PlatformInfo {
    pub id: &'static str,
    pub display_name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub host: &'static str,
    pub authorize_url: &'static str,
    pub token_url: &'static str,
    pub post_endpoint: &'static str,
    pub scopes: &'static [&'static str],
    /// Ranking label used when the platform is connected (1 = most preferred).
    pub rank: u8,
    pub rank_reason: &'static str,
}

impl SocialPlatform {
    pub const ALL: [SocialPlatform; 6] = [
        SocialPlatform::Instagram,
        SocialPlatform::Facebook,
        SocialPlatform::Twitter,
        SocialPlatform::Discord,
        SocialPlatform::LinkedIn,
        SocialPlatform::TikTok,
    ];

    /// Ranking order: Instagram > Facebook > Twitter/X > LinkedIn > Discord > TikTok.
    pub const PRECEDENCE: [SocialPlatform; 6] = [
        SocialPlatform::Instagram,
        SocialPlatform::Facebook,
        SocialPlatform::Twitter,
        SocialPlatform::LinkedIn,
        SocialPlatform::Discord,
        SocialPlatform::TikTok,
    ];

    pub fn info(self) -> &'static PlatformInfo {
        match self {
            SocialPlatform::Instagram => &INSTAGRAM,
            SocialPlatform::Facebook => &FACEBOOK,
            SocialPlatform::Twitter => &TWITTER,
            SocialPlatform::Discord => &DISCORD,
            SocialPlatform::LinkedIn => &LINKEDIN,
            SocialPlatform::TikTok => &TIKTOK,
        }
    }

    pub fn id(self) -> &'static str {
        self.info().id
    }

    pub fn display_name(self) -> &'static str {
        self.info().display_name
    }

    /// Position in [`Self::PRECEDENCE`].
    pub fn precedence(self) -> usize {
        Self::PRECEDENCE
            .iter()
            .position(|p| *p == self)
            .unwrap_or(Self::PRECEDENCE.len())
    }
}

impl fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SocialPlatform {
    type Err = OAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        let needle = if needle == "x" { "twitter".to_string() } else { needle };
        SocialPlatform::ALL
            .into_iter()
            .find(|p| p.id() == needle)
            .ok_or(OAuthError::UnsupportedPlatform(s.to_string()))
    }
}

static INSTAGRAM: PlatformInfo = PlatformInfo {
    id: "instagram",
    display_name: "Instagram",
    icon: "📷",
    color: "#E1306C",
    host: "instagram.com",
    authorize_url: "https://api.instagram.com/oauth/authorize",
    token_url: "https://api.instagram.com/oauth/access_token",
    post_endpoint: "https://graph.instagram.com/me/media",
    scopes: &["user_profile", "user_media"],
    rank: 1,
    rank_reason: "Instagram - where your aesthetic meets vulnerability",
};

static FACEBOOK: PlatformInfo = PlatformInfo {
    id: "facebook",
    display_name: "Facebook",
    icon: "👥",
    color: "#1877F2",
    host: "facebook.com",
    authorize_url: "https://www.facebook.com/v18.0/dialog/oauth",
    token_url: "https://graph.facebook.com/v18.0/oauth/access_token",
    post_endpoint: "https://graph.facebook.com/me/feed",
    scopes: &["public_profile", "user_photos", "publish_to_groups"],
    rank: 2,
    rank_reason: "Facebook - your family and old friends will witness this",
};

static TWITTER: PlatformInfo = PlatformInfo {
    id: "twitter",
    display_name: "Twitter/X",
    icon: "🐦",
    color: "#000000",
    host: "twitter.com",
    authorize_url: "https://twitter.com/i/oauth2/authorize",
    token_url: "https://api.twitter.com/2/oauth2/token",
    post_endpoint: "https://api.twitter.com/2/tweets",
    scopes: &["tweet.read", "users.read", "tweet.write", "offline.access"],
    rank: 3,
    rank_reason: "Twitter/X - public humiliation at its finest",
};

static DISCORD: PlatformInfo = PlatformInfo {
    id: "discord",
    display_name: "Discord",
    icon: "🎮",
    color: "#5865F2",
    host: "discord.com",
    authorize_url: "https://discord.com/api/oauth2/authorize",
    token_url: "https://discord.com/api/oauth2/token",
    post_endpoint: "https://discord.com/api/channels/{channel_id}/messages",
    scopes: &["identify", "guilds", "messages.read", "webhook.incoming"],
    rank: 5,
    rank_reason: "Anonymous strangers who shouldn't know this much about you",
};

static LINKEDIN: PlatformInfo = PlatformInfo {
    id: "linkedin",
    display_name: "LinkedIn",
    icon: "💼",
    color: "#0A66C2",
    host: "linkedin.com",
    authorize_url: "https://www.linkedin.com/oauth/v2/authorization",
    token_url: "https://www.linkedin.com/oauth/v2/accessToken",
    post_endpoint: "https://api.linkedin.com/v2/ugcPosts",
    scopes: &["r_liteprofile", "w_member_social"],
    rank: 4,
    rank_reason: "LinkedIn - your colleagues need to see the real you",
};

static TIKTOK: PlatformInfo = PlatformInfo {
    id: "tiktok",
    display_name: "TikTok",
    icon: "🎵",
    color: "#FE2C55",
    host: "tiktok.com",
    authorize_url: "https://www.tiktok.com/auth/authorize/",
    token_url: "https://open-api.tiktok.com/oauth/access_token/",
    post_endpoint: "https://open-api.tiktok.com/share/video/upload/",
    scopes: &["user.info.basic", "video.list", "video.upload"],
    rank: 5,
    rank_reason: "Anonymous strangers who shouldn't know this much about you",
};
