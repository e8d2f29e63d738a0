//! Mock social platforms: the platform table, OAuth tokens, the simulated
//! authorization flow and direct posting.

pub mod oauth;
mod platform;
pub mod poster;
mod tokens;

pub use oauth::{parse_callback, AuthorizationRequest, MockOAuthFlow, OAuthCallback};
pub use platform::{PlatformInfo, SocialPlatform};
pub use poster::{MockSocialClient, PostContent, PostReceipt, SocialPoster};
pub use tokens::{OAuthToken, TokenStore};
