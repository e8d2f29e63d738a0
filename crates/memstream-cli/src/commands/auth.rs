use clap::Subcommand;
use memstream_core::social::{parse_callback, OAuthCallback};
use memstream_core::{Clock, Config, MockOAuthFlow, SocialPlatform};

use crate::common::{clock, open_store, random, runtime, token_store, CliResult};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Instagram: login / logout / status
    Instagram {
        #[command(subcommand)]
        action: AuthOp,
    },
    /// Facebook: login / logout / status
    Facebook {
        #[command(subcommand)]
        action: AuthOp,
    },
    /// Twitter/X: login / logout / status
    Twitter {
        #[command(subcommand)]
        action: AuthOp,
    },
    /// Discord: login / logout / status
    Discord {
        #[command(subcommand)]
        action: AuthOp,
    },
    /// LinkedIn: login / logout / status
    Linkedin {
        #[command(subcommand)]
        action: AuthOp,
    },
    /// TikTok: login / logout / status
    Tiktok {
        #[command(subcommand)]
        action: AuthOp,
    },
    /// Show every platform and whether it is connected
    List,
}

#[derive(Subcommand)]
pub enum AuthOp {
    /// Run the (mock) OAuth flow
    Login {
        /// Open the authorization page in the browser
        #[arg(long)]
        open: bool,
        /// Redirect URL to complete the flow with, instead of simulating one
        #[arg(long)]
        callback: Option<String>,
    },
    /// Remove the stored token
    Logout,
    /// Check authentication status
    Status,
}

pub fn run(action: AuthAction) -> CliResult {
    let (platform, op) = match action {
        AuthAction::Instagram { action } => (SocialPlatform::Instagram, action),
        AuthAction::Facebook { action } => (SocialPlatform::Facebook, action),
        AuthAction::Twitter { action } => (SocialPlatform::Twitter, action),
        AuthAction::Discord { action } => (SocialPlatform::Discord, action),
        AuthAction::Linkedin { action } => (SocialPlatform::LinkedIn, action),
        AuthAction::Tiktok { action } => (SocialPlatform::TikTok, action),
        AuthAction::List => return list(),
    };
    handle(platform, op)
}

fn handle(platform: SocialPlatform, op: AuthOp) -> CliResult {
    let store = open_store()?;
    let config = Config::load_or_default();
    let flow = MockOAuthFlow::new(token_store(&store), config.oauth, random(), clock());
    let name = platform.display_name();

    match op {
        AuthOp::Login { open, callback } => {
            let request = flow.begin(platform);
            println!("authorize at: {}", request.url);
            if open {
                open::that(&request.url)?;
            }

            let callback = match callback {
                Some(url) => parse_callback(&url)?,
                None => OAuthCallback {
                    code: format!("mock_code_{}", clock().now().timestamp_millis()),
                    state: request.state.clone(),
                },
            };
            let token = runtime()?.block_on(flow.complete(&request, &callback))?;
            println!(
                "{name} connected as {} (expires {})",
                token.username.as_deref().unwrap_or("unknown"),
                token.expires_at.to_rfc3339()
            );
        }
        AuthOp::Logout => {
            if flow.disconnect(platform)? {
                println!("{name} disconnected");
            } else {
                println!("{name} was not connected");
            }
        }
        AuthOp::Status => {
            let tokens = token_store(&store);
            println!(
                "{}",
                if tokens.is_authenticated(platform, clock().now()) {
                    "authenticated"
                } else {
                    "not authenticated"
                }
            );
        }
    }
    Ok(())
}

fn list() -> CliResult {
    let store = open_store()?;
    let tokens = token_store(&store);
    let now = clock().now();
    for platform in SocialPlatform::ALL {
        let state = match tokens.get(platform) {
            Some(token) if token.is_valid(now) => "connected",
            Some(_) => "expired",
            None => "not connected",
        };
        println!("{:<10} {state}", platform.id());
    }
    Ok(())
}
