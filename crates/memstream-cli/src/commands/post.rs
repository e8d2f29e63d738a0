use clap::Args;
use memstream_core::{Config, PostContent, SocialPlatform, SocialPoster};

use crate::common::{open_store, runtime, social_client, CliResult};

#[derive(Args)]
pub struct PostArgs {
    /// Platform id (instagram, facebook, twitter, discord, linkedin, tiktok)
    platform: SocialPlatform,
    /// Post text (defaults to the configured post text)
    #[arg(long)]
    text: Option<String>,
    /// Image to attach
    #[arg(long)]
    image_url: Option<String>,
}

pub fn run(args: PostArgs) -> CliResult {
    let store = open_store()?;
    let config = Config::load_or_default();
    let content = PostContent {
        text: args.text.unwrap_or_else(|| config.social.post_text.clone()),
        image_url: args.image_url,
    };
    let client = social_client(&store, config.social);

    let receipt = runtime()?.block_on(client.post(args.platform, &content))?;
    println!("posted to {}: {}", receipt.platform.display_name(), receipt.url);
    Ok(())
}
