use clap::Args;
use memstream_core::{rank_recipients, Clock, ContactBook};

use crate::common::{clock, open_store, token_store, CliResult};

#[derive(Args)]
pub struct RankArgs {
    /// Photo id
    photo_id: String,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: RankArgs) -> CliResult {
    let store = open_store()?;
    let book = ContactBook::load(store.as_ref());
    let connected = token_store(&store).connected(clock().now());
    let ranking = rank_recipients(&args.photo_id, &book, &connected);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ranking)?);
        return Ok(());
    }
    for entry in &ranking {
        println!(
            "{}  {:<24} {}",
            entry.priority,
            entry.recipient.display_name(),
            entry.reason
        );
    }
    Ok(())
}
